use leadkeep_core::domain::{
    EntityType, FollowUpStatus, LeadSource, LeadStatus, Owner, UserId,
};
use leadkeep_store::error::StoreErrorKind;
use leadkeep_store::repo::{FollowUpNew, FollowUpUpdate, LeadNew};
use leadkeep_store::Store;

const NOW: i64 = 1_700_000_000;

fn open_store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

fn lead(store: &Store, name: &str, entity_type: EntityType) -> Owner {
    let lead = store
        .leads()
        .create(
            NOW,
            LeadNew {
                name: name.to_string(),
                entity_type,
                email: None,
                phone: None,
                company: None,
                source: LeadSource::Referral,
                status: LeadStatus::Contacted,
                notes: None,
                assigned_to: None,
                business_id: None,
                service_id: None,
            },
        )
        .expect("create lead");
    Owner::Lead(lead.id)
}

fn due(at: i64) -> FollowUpNew {
    FollowUpNew {
        due_at: at,
        notes: Some("call back".to_string()),
        status: None,
    }
}

#[test]
fn new_follow_up_is_pending_with_creator() {
    let store = open_store();
    let owner = lead(&store, "Ada", EntityType::Individual);
    let actor = UserId::new();

    let follow_up = store
        .follow_ups()
        .add(NOW, owner, due(NOW + 3600), actor)
        .expect("add");
    assert_eq!(follow_up.status, FollowUpStatus::Pending);
    assert_eq!(follow_up.created_by, actor);
    assert!(follow_up.completed_at.is_none());
    assert!(follow_up.completed_by.is_none());

    let stored = store
        .follow_ups()
        .get(follow_up.id)
        .expect("get")
        .expect("follow-up");
    assert_eq!(stored, follow_up);
}

#[test]
fn mark_completed_stamps_actor_and_time() {
    let store = open_store();
    let owner = lead(&store, "Ada", EntityType::Business);
    let creator = UserId::new();
    let closer = UserId::new();

    let follow_up = store
        .follow_ups()
        .add(NOW, owner, due(NOW + 60), creator)
        .expect("add");
    let done = store
        .follow_ups()
        .mark_completed(NOW + 120, follow_up.id, closer)
        .expect("complete");

    assert_eq!(done.status, FollowUpStatus::Completed);
    assert_eq!(done.completed_by, Some(closer));
    assert!(done.completed_at.expect("completed_at") >= NOW + 120);
    assert_eq!(done.created_by, creator);

    let stored = store.follow_ups().get(done.id).expect("get").expect("row");
    assert_eq!(stored.completed_by, Some(closer));
}

#[test]
fn mark_cancelled_keeps_completion_fields() {
    let store = open_store();
    let owner = lead(&store, "Ada", EntityType::Business);
    let actor = UserId::new();

    let follow_up = store
        .follow_ups()
        .add(NOW, owner, due(NOW), actor)
        .expect("add");
    store
        .follow_ups()
        .mark_completed(NOW + 1, follow_up.id, actor)
        .expect("complete");
    let cancelled = store
        .follow_ups()
        .mark_cancelled(NOW + 2, follow_up.id)
        .expect("cancel");

    assert_eq!(cancelled.status, FollowUpStatus::Cancelled);
    assert_eq!(cancelled.completed_by, Some(actor));
    assert_eq!(cancelled.completed_at, Some(NOW + 1));
    assert_eq!(cancelled.updated_at, NOW + 2);
}

#[test]
fn transitions_are_not_restricted() {
    let store = open_store();
    let owner = lead(&store, "Ada", EntityType::Business);
    let actor = UserId::new();
    let repo = store.follow_ups();

    let follow_up = repo.add(NOW, owner, due(NOW), actor).expect("add");
    repo.mark_cancelled(NOW + 1, follow_up.id).expect("cancel");
    let done = repo
        .mark_completed(NOW + 2, follow_up.id, actor)
        .expect("complete after cancel");
    assert_eq!(done.status, FollowUpStatus::Completed);

    let reopened = repo
        .update(
            NOW + 3,
            follow_up.id,
            FollowUpUpdate {
                status: Some(FollowUpStatus::Pending),
                ..Default::default()
            },
        )
        .expect("reopen");
    assert_eq!(reopened.status, FollowUpStatus::Pending);
}

#[test]
fn update_status_does_not_stamp_completion() {
    let store = open_store();
    let owner = lead(&store, "Ada", EntityType::Business);
    let repo = store.follow_ups();

    let follow_up = repo
        .add(NOW, owner, due(NOW), UserId::new())
        .expect("add");
    let updated = repo
        .update(
            NOW + 5,
            follow_up.id,
            FollowUpUpdate {
                status: Some(FollowUpStatus::Completed),
                notes: Some(None),
                ..Default::default()
            },
        )
        .expect("update");

    assert_eq!(updated.status, FollowUpStatus::Completed);
    assert!(updated.completed_at.is_none());
    assert!(updated.completed_by.is_none());
    assert!(updated.notes.is_none());
    assert_eq!(updated.due_at, NOW);
}

#[test]
fn overdue_lists_only_pending_past_due() {
    let store = open_store();
    let ada = lead(&store, "Ada", EntityType::Individual);
    let bob = lead(&store, "Bob", EntityType::Business);
    let actor = UserId::new();
    let repo = store.follow_ups();

    let late = repo.add(NOW, bob, due(NOW - 7200), actor).expect("late");
    let later = repo.add(NOW, ada, due(NOW - 3600), actor).expect("later");
    let future = repo.add(NOW, ada, due(NOW + 3600), actor).expect("future");
    let closed = repo.add(NOW, ada, due(NOW - 100), actor).expect("closed");
    repo.mark_completed(NOW, closed.id, actor).expect("complete");

    let overdue = repo.list_overdue(NOW).expect("overdue");
    let ids: Vec<_> = overdue.iter().map(|item| item.follow_up.id).collect();
    assert_eq!(ids, vec![late.id, later.id]);
    assert_eq!(overdue[0].owner_name, "Bob");
    assert_eq!(overdue[1].owner_name, "Ada");
    assert!(!ids.contains(&future.id));
}

#[test]
fn list_for_owner_orders_by_due_date() {
    let store = open_store();
    let owner = lead(&store, "Ada", EntityType::Business);
    let actor = UserId::new();
    let repo = store.follow_ups();

    let second = repo.add(NOW, owner, due(NOW + 200), actor).expect("second");
    let first = repo.add(NOW, owner, due(NOW + 100), actor).expect("first");

    let listed = repo.list_for_owner(owner).expect("list");
    let ids: Vec<_> = listed.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn deleted_owner_and_missing_rows_are_not_found() {
    let store = open_store();
    let owner = lead(&store, "Ada", EntityType::Business);
    let Owner::Lead(lead_id) = owner else {
        unreachable!()
    };
    let repo = store.follow_ups();

    let follow_up = repo.add(NOW, owner, due(NOW), UserId::new()).expect("add");
    repo.delete(follow_up.id).expect("delete");
    let err = repo.delete(follow_up.id).unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);

    store.leads().delete(NOW, lead_id).expect("delete lead");
    let err = repo
        .add(NOW, owner, due(NOW), UserId::new())
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
}
