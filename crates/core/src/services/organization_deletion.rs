//! Organization deletion with best-effort cleanup of dependent rows.

use std::fmt;

use lessonspark_common::{AppError, AppResult};
use lessonspark_db::repositories::{
    InviteRepository, OrganizationRepository, ProfileRepository, SharedFocusRepository,
    TransferRequestRepository,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for deleting an organization.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOrganizationInput {
    pub organization_id: String,
    /// Must repeat the organization's name exactly.
    #[validate(length(min = 1))]
    pub confirmation_name: String,
}

/// Cleanup steps run before the organization row is removed, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStep {
    Invites,
    SharedFocus,
    TransfersFrom,
    TransfersTo,
    DetachChildren,
}

impl CascadeStep {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Invites => "invites",
            Self::SharedFocus => "shared_focus",
            Self::TransfersFrom => "transfers_from",
            Self::TransfersTo => "transfers_to",
            Self::DetachChildren => "detach_children",
        }
    }
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a deletion did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReport {
    pub organization_id: String,
    pub invites_deleted: u64,
    pub shared_focus_deleted: u64,
    pub transfers_from_deleted: u64,
    pub transfers_to_deleted: u64,
    pub children_detached: u64,
    /// Cleanup steps that errored; rows they covered may still reference the id.
    pub failed_steps: Vec<CascadeStep>,
}

impl DeletionReport {
    /// Whether every cleanup step succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_steps.is_empty()
    }
}

/// Service that removes organizations.
#[derive(Clone)]
pub struct OrganizationDeletionService {
    organization_repo: OrganizationRepository,
    profile_repo: ProfileRepository,
    invite_repo: InviteRepository,
    shared_focus_repo: SharedFocusRepository,
    transfer_repo: TransferRequestRepository,
}

impl OrganizationDeletionService {
    /// Create a new organization deletion service.
    #[must_use]
    pub const fn new(
        organization_repo: OrganizationRepository,
        profile_repo: ProfileRepository,
        invite_repo: InviteRepository,
        shared_focus_repo: SharedFocusRepository,
        transfer_repo: TransferRequestRepository,
    ) -> Self {
        Self {
            organization_repo,
            profile_repo,
            invite_repo,
            shared_focus_repo,
            transfer_repo,
        }
    }

    /// Delete an organization that has no members.
    ///
    /// The confirmation must equal the organization name. Members are counted
    /// again right before anything is written. Each cleanup step is attempted
    /// even if an earlier one failed; failures are logged and listed in the
    /// report. Only a failure to delete the organization row itself is
    /// returned as an error.
    pub async fn delete(&self, input: DeleteOrganizationInput) -> AppResult<DeletionReport> {
        input.validate()?;
        let org = self
            .organization_repo
            .get_by_id(&input.organization_id)
            .await?;

        if input.confirmation_name != org.name {
            return Err(AppError::Validation(
                "Confirmation does not match the organization name".to_string(),
            ));
        }

        let member_count = self.profile_repo.count_by_organization(&org.id).await?;
        if member_count > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete organization with {member_count} member(s); transfer or remove them first"
            )));
        }

        let id = org.id.as_str();
        let mut report = DeletionReport {
            organization_id: org.id.clone(),
            ..DeletionReport::default()
        };

        report.invites_deleted = record(
            &mut report.failed_steps,
            id,
            CascadeStep::Invites,
            self.invite_repo.delete_by_organization(id).await,
        );
        report.shared_focus_deleted = record(
            &mut report.failed_steps,
            id,
            CascadeStep::SharedFocus,
            self.shared_focus_repo.delete_by_organization(id).await,
        );
        report.transfers_from_deleted = record(
            &mut report.failed_steps,
            id,
            CascadeStep::TransfersFrom,
            self.transfer_repo.delete_by_from_organization(id).await,
        );
        report.transfers_to_deleted = record(
            &mut report.failed_steps,
            id,
            CascadeStep::TransfersTo,
            self.transfer_repo.delete_by_to_organization(id).await,
        );
        report.children_detached = record(
            &mut report.failed_steps,
            id,
            CascadeStep::DetachChildren,
            self.organization_repo.detach_children(id).await,
        );

        let removed = self.organization_repo.delete(id).await.inspect_err(|e| {
            tracing::error!(organization_id = %id, error = %e, "Failed to delete organization");
        })?;
        if removed == 0 {
            return Err(AppError::OrganizationNotFound(id.to_string()));
        }

        if report.is_complete() {
            tracing::info!(organization_id = %id, "Organization deleted");
        } else {
            tracing::warn!(
                organization_id = %id,
                failed_steps = ?report.failed_steps,
                "Organization deleted with incomplete cleanup"
            );
        }

        Ok(report)
    }
}

fn record(
    failed_steps: &mut Vec<CascadeStep>,
    organization_id: &str,
    step: CascadeStep,
    result: AppResult<u64>,
) -> u64 {
    match result {
        Ok(rows) => {
            tracing::debug!(organization_id = %organization_id, step = %step, rows, "Cascade step done");
            rows
        }
        Err(e) => {
            tracing::error!(organization_id = %organization_id, step = %step, error = %e, "Cascade step failed, continuing");
            failed_steps.push(step);
            0
        }
    }
}
