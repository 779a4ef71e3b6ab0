use leadkeep_core::domain::{CustomerStatus, EntityType, LeadSource, LeadStatus, Owner};
use leadkeep_core::CoreError;
use leadkeep_store::error::{StoreError, StoreErrorKind};
use leadkeep_store::repo::{
    ContactDeleteOptions, ContactPersonNew, ContactPersonUpdate, CustomerNew, CustomerUpdate,
    LeadNew, LeadUpdate,
};
use leadkeep_store::Store;

const NOW: i64 = 1_700_000_000;

fn open_store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

fn lead(store: &Store, entity_type: EntityType) -> Owner {
    let lead = store
        .leads()
        .create(
            NOW,
            LeadNew {
                name: "Acme Corp".to_string(),
                entity_type,
                email: None,
                phone: None,
                company: Some("Acme".to_string()),
                source: LeadSource::Website,
                status: LeadStatus::New,
                notes: None,
                assigned_to: None,
                business_id: None,
                service_id: None,
            },
        )
        .expect("create lead");
    Owner::Lead(lead.id)
}

fn contact(name: &str, is_primary: bool) -> ContactPersonNew {
    ContactPersonNew {
        name: name.to_string(),
        is_primary,
        ..Default::default()
    }
}

fn primary_names(store: &Store, owner: Owner) -> Vec<String> {
    store
        .contact_persons()
        .list_for_owner(owner)
        .expect("list contacts")
        .into_iter()
        .filter(|c| c.is_primary)
        .map(|c| c.name)
        .collect()
}

#[test]
fn individual_owner_rejects_contacts() {
    let store = open_store();
    let owner = lead(&store, EntityType::Individual);

    let err = store
        .contact_persons()
        .add(NOW, owner, contact("A", true))
        .unwrap_err();
    assert_eq!(
        err.core_error(),
        Some(&CoreError::InvalidOwnerType(EntityType::Individual))
    );

    let contacts = store.contact_persons().list_for_owner(owner).expect("list");
    assert!(contacts.is_empty());
}

#[test]
fn adding_new_primary_demotes_previous() {
    let store = open_store();
    let owner = lead(&store, EntityType::Business);

    let a = store
        .contact_persons()
        .add(NOW, owner, contact("A", true))
        .expect("add A");
    assert!(a.is_primary);

    let b = store
        .contact_persons()
        .add(NOW + 1, owner, contact("B", true))
        .expect("add B");
    assert!(b.is_primary);

    let a = store.contact_persons().get(a.id).expect("get").expect("A");
    assert!(!a.is_primary);
    assert_eq!(primary_names(&store, owner), vec!["B"]);
}

#[test]
fn non_primary_add_keeps_existing_primary() {
    let store = open_store();
    let owner = lead(&store, EntityType::Business);

    store
        .contact_persons()
        .add(NOW, owner, contact("A", true))
        .expect("add A");
    let b = store
        .contact_persons()
        .add(NOW, owner, contact("B", false))
        .expect("add B");
    assert!(!b.is_primary);
    assert_eq!(primary_names(&store, owner), vec!["A"]);
}

#[test]
fn set_primary_swaps_only_the_previous_primary() {
    let store = open_store();
    let owner = lead(&store, EntityType::Business);
    let repo = store.contact_persons();

    let c = repo.add(NOW, owner, contact("C", false)).expect("add C");
    let d = repo.add(NOW, owner, contact("D", true)).expect("add D");
    let e = repo.add(NOW, owner, contact("E", false)).expect("add E");

    let updated = repo.set_primary(NOW + 5, c.id).expect("set primary");
    assert!(updated.is_primary);

    let d = repo.get(d.id).expect("get").expect("D");
    let e_after = repo.get(e.id).expect("get").expect("E");
    assert!(!d.is_primary);
    assert_eq!(d.updated_at, NOW + 5);
    assert_eq!(e_after, e);
}

#[test]
fn primary_is_scoped_per_owner() {
    let store = open_store();
    let first = lead(&store, EntityType::Business);
    let second = lead(&store, EntityType::Business);

    store
        .contact_persons()
        .add(NOW, first, contact("A", true))
        .expect("add A");
    store
        .contact_persons()
        .add(NOW, second, contact("B", true))
        .expect("add B");

    assert_eq!(primary_names(&store, first), vec!["A"]);
    assert_eq!(primary_names(&store, second), vec!["B"]);
}

#[test]
fn update_merges_fields_and_reassigns_primary() {
    let store = open_store();
    let owner = lead(&store, EntityType::Business);
    let repo = store.contact_persons();

    let a = repo
        .add(
            NOW,
            owner,
            ContactPersonNew {
                name: "A".to_string(),
                email: Some("a@example.com".to_string()),
                mobile: Some("555-0100".to_string()),
                designation: Some("CTO".to_string()),
                is_primary: true,
            },
        )
        .expect("add A");
    let b = repo.add(NOW, owner, contact("B", false)).expect("add B");

    let updated = repo
        .update(
            NOW + 10,
            b.id,
            ContactPersonUpdate {
                designation: Some(Some("CEO".to_string())),
                is_primary: Some(true),
                ..Default::default()
            },
        )
        .expect("update B");
    assert_eq!(updated.designation.as_deref(), Some("CEO"));
    assert!(updated.is_primary);
    assert_eq!(primary_names(&store, owner), vec!["B"]);

    let cleared = repo
        .update(
            NOW + 20,
            a.id,
            ContactPersonUpdate {
                email: Some(None),
                ..Default::default()
            },
        )
        .expect("update A");
    assert!(cleared.email.is_none());
    assert_eq!(cleared.mobile.as_deref(), Some("555-0100"));
    assert_eq!(cleared.designation.as_deref(), Some("CTO"));
}

#[test]
fn updating_current_primary_keeps_it() {
    let store = open_store();
    let owner = lead(&store, EntityType::Business);
    let repo = store.contact_persons();

    let a = repo.add(NOW, owner, contact("A", true)).expect("add A");
    let again = repo
        .update(
            NOW + 1,
            a.id,
            ContactPersonUpdate {
                name: Some("Alice".to_string()),
                is_primary: Some(true),
                ..Default::default()
            },
        )
        .expect("update");
    assert!(again.is_primary);
    assert_eq!(primary_names(&store, owner), vec!["Alice"]);
}

#[test]
fn verbatim_insert_refuses_second_primary() {
    let store = open_store();
    let owner = lead(&store, EntityType::Business);
    let repo = store.contact_persons();

    repo.add(NOW, owner, contact("A", true)).expect("add A");
    let err = repo
        .insert_verbatim(NOW, owner, contact("B", true))
        .unwrap_err();
    assert_eq!(err.core_error(), Some(&CoreError::MultiplePrimaryContacts));
    assert_eq!(repo.list_for_owner(owner).expect("list").len(), 1);

    let c = repo
        .insert_verbatim(NOW, owner, contact("C", false))
        .expect("non-primary verbatim insert");
    assert!(!c.is_primary);
}

#[test]
fn delete_is_unconditional_by_default() {
    let store = open_store();
    let owner = lead(&store, EntityType::Business);
    let repo = store.contact_persons();

    let only = repo.add(NOW, owner, contact("A", true)).expect("add");
    repo.delete(only.id, ContactDeleteOptions::default())
        .expect("delete");
    assert!(repo.get(only.id).expect("get").is_none());
    assert!(repo.primary_for_owner(owner).expect("primary").is_none());
}

#[test]
fn keep_last_contact_blocks_deleting_the_only_one() {
    let store = open_store();
    let owner = lead(&store, EntityType::Business);
    let repo = store.contact_persons();
    let options = ContactDeleteOptions {
        keep_last_contact: true,
    };

    let a = repo.add(NOW, owner, contact("A", true)).expect("add A");
    let err = repo.delete(a.id, options).unwrap_err();
    assert_eq!(err.core_error(), Some(&CoreError::CannotDeleteOnlyContact));

    let b = repo.add(NOW, owner, contact("B", false)).expect("add B");
    repo.delete(a.id, options).expect("delete A with B present");
    assert!(repo.delete(b.id, options).is_err());
}

#[test]
fn missing_or_deleted_owner_is_not_found() {
    let store = open_store();
    let owner = lead(&store, EntityType::Business);
    let Owner::Lead(lead_id) = owner else {
        unreachable!()
    };
    store.leads().delete(NOW, lead_id).expect("delete lead");

    let err = store
        .contact_persons()
        .add(NOW, owner, contact("A", false))
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn blank_name_is_rejected() {
    let store = open_store();
    let owner = lead(&store, EntityType::Business);
    let err = store
        .contact_persons()
        .add(NOW, owner, contact("   ", false))
        .unwrap_err();
    assert_eq!(err.core_error(), Some(&CoreError::EmptyName));
}

#[test]
fn business_lead_with_contacts_stays_business() {
    let store = open_store();
    let owner = lead(&store, EntityType::Business);
    let Owner::Lead(lead_id) = owner else {
        unreachable!()
    };
    let repo = store.contact_persons();
    let a = repo.add(NOW, owner, contact("A", true)).expect("add A");

    let to_individual = LeadUpdate {
        entity_type: Some(EntityType::Individual),
        ..Default::default()
    };
    let err = store
        .leads()
        .update(NOW + 1, lead_id, to_individual.clone())
        .unwrap_err();
    assert_eq!(
        err.core_error(),
        Some(&CoreError::InvalidOwnerType(EntityType::Individual))
    );
    let kept = store.leads().get(lead_id).expect("get").expect("lead");
    assert_eq!(kept.entity_type, EntityType::Business);
    assert_eq!(repo.list_for_owner(owner).expect("list").len(), 1);

    repo.delete(a.id, ContactDeleteOptions::default())
        .expect("delete A");
    let switched = store
        .leads()
        .update(NOW + 2, lead_id, to_individual)
        .expect("switch without contacts");
    assert_eq!(switched.entity_type, EntityType::Individual);
}

#[test]
fn business_customer_with_contacts_stays_business() {
    let store = open_store();
    let customer = store
        .customers()
        .create(
            NOW,
            CustomerNew {
                name: "Initech".to_string(),
                entity_type: EntityType::Business,
                email: None,
                phone: None,
                company: None,
                status: CustomerStatus::Active,
                notes: None,
                assigned_to: None,
                business_id: None,
                service_id: None,
                converted_from_lead_id: None,
            },
        )
        .expect("create customer");
    let owner = Owner::Customer(customer.id);
    store
        .contact_persons()
        .add(NOW, owner, contact("A", false))
        .expect("add A");

    let err = store
        .customers()
        .update(
            NOW + 1,
            customer.id,
            CustomerUpdate {
                entity_type: Some(EntityType::Individual),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(
        err.core_error(),
        Some(&CoreError::InvalidOwnerType(EntityType::Individual))
    );
    let kept = store
        .customers()
        .get(customer.id)
        .expect("get")
        .expect("customer");
    assert_eq!(kept.entity_type, EntityType::Business);
}

#[test]
fn promoting_requires_business_owner() {
    let store = open_store();
    let owner = lead(&store, EntityType::Business);
    let repo = store.contact_persons();
    let a = repo.add(NOW, owner, contact("A", false)).expect("add A");

    // Bypass the repos to leave an individual owner with a contact.
    store
        .connection()
        .execute(
            "UPDATE leads SET entity_type = 'individual' WHERE id = ?1;",
            [owner.id_string()],
        )
        .expect("force individual");

    let err = repo.set_primary(NOW + 1, a.id).unwrap_err();
    assert_eq!(
        err.core_error(),
        Some(&CoreError::InvalidOwnerType(EntityType::Individual))
    );
    assert!(primary_names(&store, owner).is_empty());
}
