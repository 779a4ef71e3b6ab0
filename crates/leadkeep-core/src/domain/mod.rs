pub mod contact_person;
pub mod customer;
pub mod entity_type;
pub mod follow_up;
pub mod ids;
pub mod lead;
pub mod owner;
pub mod project;

pub use contact_person::ContactPerson;
pub use customer::{Customer, CustomerStatus};
pub use entity_type::EntityType;
pub use follow_up::{FollowUp, FollowUpStatus};
pub use ids::{BusinessId, ContactPersonId, CustomerId, FollowUpId, LeadId, ProjectId, ServiceId, UserId};
pub use lead::{Lead, LeadSource, LeadStatus};
pub use owner::{Owner, OwnerKind};
pub use project::Project;
