//! Repository layer for database operations.

mod invite;
mod org_shared_focus;
mod organization;
mod profile;
mod transfer_request;

pub use invite::InviteRepository;
pub use org_shared_focus::SharedFocusRepository;
pub use organization::OrganizationRepository;
pub use profile::ProfileRepository;
pub use transfer_request::{TransferDecision, TransferRequestRepository};
