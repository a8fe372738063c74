//! Business logic services.

#![allow(missing_docs)]

pub mod organization;
pub mod organization_deletion;
pub mod transfer_request;

pub use organization::{
    AssignLeaderInput, CreateChildOrganizationInput, CreateOrganizationInput,
    OrganizationDetail, OrganizationService, OrganizationTreeRow, TreeInput,
    UpdateOrganizationInput,
};
pub use organization_deletion::{
    CascadeStep, DeleteOrganizationInput, DeletionReport, OrganizationDeletionService,
};
pub use transfer_request::{
    CreateTransferRequestInput, ProcessTransferInput, TransferRequestService,
    TransferRequestView,
};
