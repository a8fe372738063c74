//! Transfer request workflow.
//!
//! Org managers submit requests to move a member to another organization or
//! out of organizations entirely; platform admins approve or deny them.
//! Managers may cancel while a request is still pending.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lessonspark_common::{AppError, AppResult, id::IdGenerator};
use lessonspark_db::entities::organization::OrgStatus;
use lessonspark_db::entities::transfer_request::{TransferStatus, TransferType};
use lessonspark_db::entities::{organization, profile, transfer_request};
use lessonspark_db::repositories::{
    OrganizationRepository, ProfileRepository, TransferDecision, TransferRequestRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::context::OrgContext;

const REASON_MIN_LENGTH: usize = 10;
const REASON_MAX_LENGTH: usize = 500;
const ADMIN_NOTES_MAX_LENGTH: usize = 500;
const UNKNOWN: &str = "Unknown";

/// Input for submitting a transfer request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequestInput {
    pub user_id: String,
    pub transfer_type: TransferType,
    pub to_organization_id: Option<String>,
    #[validate(length(max = 500))]
    pub reason: String,
    #[serde(default)]
    pub teacher_agreement_confirmed: bool,
    pub teacher_agreement_date: Option<DateTime<Utc>>,
}

/// Input for an admin decision.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProcessTransferInput {
    pub request_id: String,
    #[validate(length(max = 500))]
    pub admin_notes: Option<String>,
}

/// A transfer request decorated with display names.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequestView {
    pub request: transfer_request::Model,
    pub status_label: &'static str,
    pub user_name: String,
    pub user_email: Option<String>,
    pub requested_by_name: String,
    pub from_organization_name: String,
    /// `None` when the member is leaving to become an individual user.
    pub to_organization_name: Option<String>,
}

/// Service for transfer requests.
#[derive(Clone)]
pub struct TransferRequestService {
    transfer_repo: TransferRequestRepository,
    profile_repo: ProfileRepository,
    organization_repo: OrganizationRepository,
    id_gen: IdGenerator,
}

impl TransferRequestService {
    /// Create a new transfer request service.
    #[must_use]
    pub const fn new(
        transfer_repo: TransferRequestRepository,
        profile_repo: ProfileRepository,
        organization_repo: OrganizationRepository,
    ) -> Self {
        Self {
            transfer_repo,
            profile_repo,
            organization_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a request to move a member out of the manager's organization.
    pub async fn create(
        &self,
        ctx: &OrgContext,
        input: CreateTransferRequestInput,
    ) -> AppResult<transfer_request::Model> {
        input.validate()?;
        let from_org_id = ctx.managed_organization()?.to_string();

        if !input.teacher_agreement_confirmed {
            return Err(AppError::Validation(
                "The teacher must agree to the transfer".to_string(),
            ));
        }
        let Some(agreement_date) = input.teacher_agreement_date else {
            return Err(AppError::Validation(
                "Teacher agreement date is required".to_string(),
            ));
        };

        let reason = input.reason.trim().to_string();
        let reason_length = reason.chars().count();
        if !(REASON_MIN_LENGTH..=REASON_MAX_LENGTH).contains(&reason_length) {
            return Err(AppError::Validation(format!(
                "Reason must be between {REASON_MIN_LENGTH} and {REASON_MAX_LENGTH} characters"
            )));
        }

        let to_org_id = match input.transfer_type {
            TransferType::LeaveOrg => None,
            TransferType::ToAnotherOrg => {
                let Some(to_org_id) = input.to_organization_id.filter(|id| !id.is_empty()) else {
                    return Err(AppError::Validation(
                        "Destination organization is required".to_string(),
                    ));
                };
                if to_org_id == from_org_id {
                    return Err(AppError::Validation(
                        "Destination must differ from the current organization".to_string(),
                    ));
                }
                let destination = self.organization_repo.get_by_id(&to_org_id).await?;
                if destination.status != OrgStatus::Approved {
                    return Err(AppError::Validation(format!(
                        "Destination organization {to_org_id} is not active"
                    )));
                }
                Some(to_org_id)
            }
        };

        let member = self.profile_repo.get_by_id(&input.user_id).await?;
        if member.organization_id.as_deref() != Some(from_org_id.as_str()) {
            return Err(AppError::Forbidden(format!(
                "User {} is not a member of your organization",
                member.id
            )));
        }

        if self
            .transfer_repo
            .find_pending_for_user(&member.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "User {} already has a pending transfer request",
                member.id
            )));
        }

        let model = transfer_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(member.id),
            from_organization_id: Set(from_org_id),
            to_organization_id: Set(to_org_id),
            transfer_type: Set(input.transfer_type),
            status: Set(TransferStatus::PendingAdmin),
            reason: Set(reason),
            teacher_agreement_confirmed: Set(true),
            teacher_agreement_date: Set(Some(agreement_date.into())),
            admin_notes: Set(None),
            requested_by: Set(ctx.user_id.clone()),
            processed_at: Set(None),
            processed_by: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let created = self.transfer_repo.create(model).await?;
        tracing::info!(
            request_id = %created.id,
            user_id = %created.user_id,
            from_organization_id = %created.from_organization_id,
            "Transfer request submitted"
        );
        Ok(created)
    }

    /// Withdraw a pending request from the manager's own organization.
    pub async fn cancel(
        &self,
        ctx: &OrgContext,
        request_id: &str,
    ) -> AppResult<transfer_request::Model> {
        let request = self.transfer_repo.get_by_id(request_id).await?;
        ctx.require_manager_of(&request.from_organization_id)?;

        if !request.status.can_org_manager_cancel() {
            return Err(already_processed(&request));
        }

        let cancelled = self
            .transfer_repo
            .decide(
                &request,
                TransferDecision {
                    status: TransferStatus::Cancelled,
                    processed_by: ctx.user_id.clone(),
                    admin_notes: None,
                },
            )
            .await?;
        tracing::info!(request_id = %request_id, "Transfer request cancelled");
        Ok(cancelled)
    }

    /// Approve a pending request and move the member.
    ///
    /// The member's organization becomes the destination (none for a leave
    /// request) with the `member` role, in the same transaction that marks
    /// the request approved.
    pub async fn approve(
        &self,
        admin_id: &str,
        input: ProcessTransferInput,
    ) -> AppResult<transfer_request::Model> {
        self.process(admin_id, input, TransferStatus::Approved).await
    }

    /// Deny a pending request. The member stays where they are.
    pub async fn deny(
        &self,
        admin_id: &str,
        input: ProcessTransferInput,
    ) -> AppResult<transfer_request::Model> {
        self.process(admin_id, input, TransferStatus::Denied).await
    }

    async fn process(
        &self,
        admin_id: &str,
        input: ProcessTransferInput,
        status: TransferStatus,
    ) -> AppResult<transfer_request::Model> {
        input.validate()?;
        let admin_notes = input.admin_notes.filter(|notes| !notes.trim().is_empty());
        if admin_notes
            .as_ref()
            .is_some_and(|notes| notes.chars().count() > ADMIN_NOTES_MAX_LENGTH)
        {
            return Err(AppError::Validation(format!(
                "Admin notes cannot exceed {ADMIN_NOTES_MAX_LENGTH} characters"
            )));
        }

        let request = self.transfer_repo.get_by_id(&input.request_id).await?;
        if !request.status.can_admin_process() {
            return Err(already_processed(&request));
        }

        let processed = self
            .transfer_repo
            .decide(
                &request,
                TransferDecision {
                    status,
                    processed_by: admin_id.to_string(),
                    admin_notes,
                },
            )
            .await?;

        tracing::info!(
            request_id = %processed.id,
            user_id = %processed.user_id,
            status = processed.status.label(),
            admin_id = %admin_id,
            "Transfer request processed"
        );
        Ok(processed)
    }

    /// All requests for the admin queue, newest first.
    pub async fn list_for_admin(
        &self,
        status: Option<TransferStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<TransferRequestView>> {
        let requests = self.transfer_repo.find_all(status, limit, offset).await?;
        self.enrich(requests).await
    }

    /// Requests leaving or entering the manager's organization.
    pub async fn list_for_organization(
        &self,
        ctx: &OrgContext,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<TransferRequestView>> {
        let org_id = ctx.managed_organization()?;
        let requests = self
            .transfer_repo
            .find_by_organization(org_id, limit, offset)
            .await?;
        self.enrich(requests).await
    }

    /// Attach names with one batched lookup per table.
    async fn enrich(
        &self,
        requests: Vec<transfer_request::Model>,
    ) -> AppResult<Vec<TransferRequestView>> {
        if requests.is_empty() {
            return Ok(vec![]);
        }

        let mut profile_ids: Vec<String> = requests
            .iter()
            .flat_map(|r| [r.user_id.clone(), r.requested_by.clone()])
            .collect();
        profile_ids.sort_unstable();
        profile_ids.dedup();

        let mut org_ids: Vec<String> = requests
            .iter()
            .flat_map(|r| {
                std::iter::once(r.from_organization_id.clone()).chain(r.to_organization_id.clone())
            })
            .collect();
        org_ids.sort_unstable();
        org_ids.dedup();

        let profiles: HashMap<String, profile::Model> = self
            .profile_repo
            .find_by_ids(&profile_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        let organizations: HashMap<String, organization::Model> = self
            .organization_repo
            .find_by_ids(&org_ids)
            .await?
            .into_iter()
            .map(|o| (o.id.clone(), o))
            .collect();

        let display_name = |id: &str| {
            profiles
                .get(id)
                .and_then(|p| p.full_name.clone())
                .unwrap_or_else(|| UNKNOWN.to_string())
        };
        let org_name = |id: &str| {
            organizations
                .get(id)
                .map_or_else(|| UNKNOWN.to_string(), |o| o.name.clone())
        };

        Ok(requests
            .into_iter()
            .map(|request| TransferRequestView {
                status_label: request.status.label(),
                user_name: display_name(&request.user_id),
                user_email: profiles.get(&request.user_id).and_then(|p| p.email.clone()),
                requested_by_name: display_name(&request.requested_by),
                from_organization_name: org_name(&request.from_organization_id),
                to_organization_name: request.to_organization_id.as_deref().map(org_name),
                request,
            })
            .collect())
    }
}

fn already_processed(request: &transfer_request::Model) -> AppError {
    AppError::Conflict(format!(
        "Transfer request {} is already {}",
        request.id,
        request.status.label().to_lowercase()
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use lessonspark_db::entities::organization::OrgType;
    use lessonspark_db::entities::profile::OrgRole;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn request(
        id: &str,
        status: TransferStatus,
        to: Option<&str>,
    ) -> transfer_request::Model {
        transfer_request::Model {
            id: id.to_string(),
            user_id: "teacher".to_string(),
            from_organization_id: "org-a".to_string(),
            to_organization_id: to.map(ToString::to_string),
            transfer_type: if to.is_some() {
                TransferType::ToAnotherOrg
            } else {
                TransferType::LeaveOrg
            },
            status,
            reason: "Moving across the state".to_string(),
            teacher_agreement_confirmed: true,
            teacher_agreement_date: Some(Utc::now().into()),
            admin_notes: None,
            requested_by: "leader".to_string(),
            processed_at: None,
            processed_by: None,
            created_at: Utc::now().into(),
        }
    }

    fn person(id: &str, name: Option<&str>, org: Option<&str>) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            full_name: name.map(ToString::to_string),
            email: Some(format!("{id}@example.com")),
            organization_id: org.map(ToString::to_string),
            organization_role: org.map(|_| OrgRole::Member),
            is_platform_admin: false,
            created_at: Utc::now().into(),
        }
    }

    fn org(id: &str, name: &str) -> organization::Model {
        organization::Model {
            id: id.to_string(),
            name: name.to_string(),
            denomination: None,
            description: None,
            org_type: OrgType::Church,
            status: OrgStatus::Approved,
            org_level: 1,
            parent_org_id: None,
            beta_mode: false,
            beta_start_date: None,
            beta_end_date: None,
            beta_activated_by: None,
            created_at: Utc::now().into(),
            created_by: "admin".to_string(),
            approved_by: None,
            approved_at: None,
            updated_at: None,
        }
    }

    fn leader_ctx() -> OrgContext {
        OrgContext {
            user_id: "leader".to_string(),
            organization_id: Some("org-a".to_string()),
            role: Some(OrgRole::Leader),
            is_platform_admin: false,
        }
    }

    const fn rows(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(db: DatabaseConnection) -> TransferRequestService {
        service_on(&Arc::new(db))
    }

    fn service_on(db: &Arc<DatabaseConnection>) -> TransferRequestService {
        TransferRequestService::new(
            TransferRequestRepository::new(Arc::clone(db)),
            ProfileRepository::new(Arc::clone(db)),
            OrganizationRepository::new(Arc::clone(db)),
        )
    }

    fn create_input(transfer_type: TransferType, to: Option<&str>) -> CreateTransferRequestInput {
        CreateTransferRequestInput {
            user_id: "teacher".to_string(),
            transfer_type,
            to_organization_id: to.map(ToString::to_string),
            reason: "Family is relocating to Hope Church".to_string(),
            teacher_agreement_confirmed: true,
            teacher_agreement_date: Some(Utc::now()),
        }
    }

    /// The `UPDATE "profile"` statement the mock connection received, without spaces.
    fn profile_update(db: Arc<DatabaseConnection>) -> Option<String> {
        let db = Arc::try_unwrap(db).ok().unwrap();
        db.into_transaction_log()
            .into_iter()
            .flat_map(|txn| {
                txn.statements()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
            })
            .find(|sql| sql.starts_with(r#"UPDATE "profile""#))
            .map(|sql| sql.replace(' ', ""))
    }

    fn approve_input() -> ProcessTransferInput {
        ProcessTransferInput {
            request_id: "tr1".to_string(),
            admin_notes: None,
        }
    }

    #[tokio::test]
    async fn test_approve_leave_clears_membership() {
        let pending = request("tr1", TransferStatus::PendingAdmin, None);
        let mut approved = pending.clone();
        approved.status = TransferStatus::Approved;
        approved.processed_by = Some("admin1".to_string());
        approved.processed_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending]])
                .append_exec_results([rows(1), rows(1)])
                .append_query_results([[approved]])
                .into_connection(),
        );

        let result = service_on(&db).approve("admin1", approve_input()).await.unwrap();

        assert_eq!(result.status, TransferStatus::Approved);
        assert!(result.processed_at.is_some());
        assert_eq!(result.processed_by.as_deref(), Some("admin1"));

        let update = profile_update(db).unwrap();
        assert!(update.contains(r#""organization_id"=NULL"#), "{update}");
        assert!(update.contains(r#""organization_role"=NULL"#), "{update}");
        assert!(update.contains("'teacher'"), "{update}");
    }

    #[tokio::test]
    async fn test_approve_moves_member_into_destination() {
        let pending = request("tr1", TransferStatus::PendingAdmin, Some("org-b"));
        let mut approved = pending.clone();
        approved.status = TransferStatus::Approved;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending]])
                .append_exec_results([rows(1), rows(1)])
                .append_query_results([[approved]])
                .into_connection(),
        );

        service_on(&db).approve("admin1", approve_input()).await.unwrap();

        let update = profile_update(db).unwrap();
        assert!(update.contains(r#""organization_id"='org-b'"#), "{update}");
        assert!(update.contains(r#""organization_role"='member'"#), "{update}");
    }

    #[tokio::test]
    async fn test_deny_keeps_notes_verbatim() {
        let pending = request("tr1", TransferStatus::PendingAdmin, Some("org-b"));
        let mut denied = pending.clone();
        denied.status = TransferStatus::Denied;
        denied.admin_notes = Some("Please talk to the pastor first.".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending]])
                .append_exec_results([rows(1)])
                .append_query_results([[denied]])
                .into_connection(),
        );

        let result = service_on(&db)
            .deny(
                "admin1",
                ProcessTransferInput {
                    request_id: "tr1".to_string(),
                    admin_notes: Some("Please talk to the pastor first.".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(result.status, TransferStatus::Denied);
        assert_eq!(
            result.admin_notes.as_deref(),
            Some("Please talk to the pastor first.")
        );
        assert_eq!(profile_update(db), None);
    }

    #[tokio::test]
    async fn test_terminal_requests_cannot_be_processed() {
        for status in [
            TransferStatus::Approved,
            TransferStatus::Denied,
            TransferStatus::Cancelled,
        ] {
            assert!(!status.can_admin_process());

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request("tr1", status, Some("org-b"))]])
                .into_connection();

            let result = service(db)
                .approve(
                    "admin1",
                    ProcessTransferInput {
                        request_id: "tr1".to_string(),
                        admin_notes: None,
                    },
                )
                .await;

            assert!(matches!(result, Err(AppError::Conflict(_))));
        }
    }

    #[tokio::test]
    async fn test_overlong_notes_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .deny(
                "admin1",
                ProcessTransferInput {
                    request_id: "tr1".to_string(),
                    admin_notes: Some("n".repeat(501)),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_to_another_org() {
        let created = request("tr1", TransferStatus::PendingAdmin, Some("org-b"));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[org("org-b", "Hope Church")]])
            .append_query_results([[person("teacher", Some("Ruth"), Some("org-a"))]])
            .append_query_results([Vec::<transfer_request::Model>::new()])
            .append_query_results([[created]])
            .into_connection();

        let result = service(db)
            .create(
                &leader_ctx(),
                create_input(TransferType::ToAnotherOrg, Some("org-b")),
            )
            .await
            .unwrap();

        assert_eq!(result.status, TransferStatus::PendingAdmin);
        assert_eq!(result.to_organization_id.as_deref(), Some("org-b"));
    }

    #[tokio::test]
    async fn test_create_rejects_inactive_destination() {
        for status in [OrgStatus::Rejected, OrgStatus::Pending] {
            let mut destination = org("org-b", "Hope Church");
            destination.status = status;
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[destination]])
                .into_connection();

            let result = service(db)
                .create(
                    &leader_ctx(),
                    create_input(TransferType::ToAnotherOrg, Some("org-b")),
                )
                .await;

            assert!(
                matches!(result, Err(AppError::Validation(ref msg)) if msg.contains("not active")),
                "{status:?}: {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_create_requires_destination() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .create(&leader_ctx(), create_input(TransferType::ToAnotherOrg, None))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_requires_agreement() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut input = create_input(TransferType::LeaveOrg, None);
        input.teacher_agreement_confirmed = false;

        let result = service(db).create(&leader_ctx(), input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_short_reason() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut input = create_input(TransferType::LeaveOrg, None);
        input.reason = "  too short ".to_string();

        let result = service(db).create(&leader_ctx(), input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_long_reason_before_querying() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut input = create_input(TransferType::LeaveOrg, None);
        input.reason = "r".repeat(501);

        let result = service(db).create(&leader_ctx(), input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_member_of_other_org() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[person("teacher", Some("Ruth"), Some("org-z"))]])
            .into_connection();

        let result = service(db)
            .create(&leader_ctx(), create_input(TransferType::LeaveOrg, None))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_second_pending_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[person("teacher", Some("Ruth"), Some("org-a"))]])
            .append_query_results([[request("tr0", TransferStatus::PendingAdmin, None)]])
            .into_connection();

        let result = service(db)
            .create(&leader_ctx(), create_input(TransferType::LeaveOrg, None))
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_cancel_pending() {
        let pending = request("tr1", TransferStatus::PendingAdmin, None);
        let mut cancelled = pending.clone();
        cancelled.status = TransferStatus::Cancelled;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[pending]])
            .append_exec_results([rows(1)])
            .append_query_results([[cancelled]])
            .into_connection();

        let result = service(db).cancel(&leader_ctx(), "tr1").await.unwrap();

        assert_eq!(result.status, TransferStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_list_enriches_names_with_unknown_fallback() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                request("tr1", TransferStatus::PendingAdmin, Some("org-b")),
                request("tr2", TransferStatus::Denied, None),
            ]])
            .append_query_results([[person("teacher", Some("Ruth"), Some("org-a"))]])
            .append_query_results([[org("org-a", "Grace Church")]])
            .into_connection();

        let views = service(db).list_for_admin(None, 10, 0).await.unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].user_name, "Ruth");
        assert_eq!(views[0].requested_by_name, "Unknown");
        assert_eq!(views[0].from_organization_name, "Grace Church");
        assert_eq!(views[0].to_organization_name.as_deref(), Some("Unknown"));
        assert_eq!(views[0].status_label, "Pending Approval");
        assert_eq!(views[1].to_organization_name, None);
    }
}
