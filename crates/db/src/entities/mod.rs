//! Database entities.

#![allow(missing_docs)]

pub mod invite;
pub mod org_shared_focus;
pub mod organization;
pub mod profile;
pub mod transfer_request;

pub use invite::Entity as Invite;
pub use org_shared_focus::Entity as OrgSharedFocus;
pub use organization::Entity as Organization;
pub use profile::Entity as Profile;
pub use transfer_request::Entity as TransferRequest;
