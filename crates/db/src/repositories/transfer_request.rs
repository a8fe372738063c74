//! Transfer request repository.

use std::sync::Arc;

use chrono::Utc;
use lessonspark_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::profile::OrgRole;
use crate::entities::transfer_request::TransferStatus;
use crate::entities::{Profile, TransferRequest, profile, transfer_request};

/// Final outcome recorded on a pending transfer request.
#[derive(Debug, Clone)]
pub struct TransferDecision {
    /// Terminal status to record.
    pub status: TransferStatus,
    /// Who made the decision.
    pub processed_by: String,
    /// Notes shown to the requesting org manager.
    pub admin_notes: Option<String>,
}

/// Repository for transfer request operations.
#[derive(Clone)]
pub struct TransferRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl TransferRequestRepository {
    /// Create a new transfer request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find transfer request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<transfer_request::Model>> {
        TransferRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get transfer request by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<transfer_request::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::TransferRequestNotFound(id.to_string()))
    }

    /// List requests, newest first, optionally restricted to one status.
    pub async fn find_all(
        &self,
        status: Option<TransferStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<transfer_request::Model>> {
        let mut query = TransferRequest::find();

        if let Some(status) = status {
            query = query.filter(transfer_request::Column::Status.eq(status));
        }

        query
            .order_by(transfer_request::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests leaving or entering an organization, newest first.
    pub async fn find_by_organization(
        &self,
        organization_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<transfer_request::Model>> {
        TransferRequest::find()
            .filter(
                Condition::any()
                    .add(transfer_request::Column::FromOrganizationId.eq(organization_id))
                    .add(transfer_request::Column::ToOrganizationId.eq(organization_id)),
            )
            .order_by(transfer_request::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The open request for a member, if any.
    pub async fn find_pending_for_user(
        &self,
        user_id: &str,
    ) -> AppResult<Option<transfer_request::Model>> {
        TransferRequest::find()
            .filter(transfer_request::Column::UserId.eq(user_id))
            .filter(transfer_request::Column::Status.eq(TransferStatus::PendingAdmin))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new transfer request.
    pub async fn create(
        &self,
        model: transfer_request::ActiveModel,
    ) -> AppResult<transfer_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete requests whose source is the organization.
    pub async fn delete_by_from_organization(&self, organization_id: &str) -> AppResult<u64> {
        let result = TransferRequest::delete_many()
            .filter(transfer_request::Column::FromOrganizationId.eq(organization_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Delete requests whose destination is the organization.
    pub async fn delete_by_to_organization(&self, organization_id: &str) -> AppResult<u64> {
        let result = TransferRequest::delete_many()
            .filter(transfer_request::Column::ToOrganizationId.eq(organization_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Record a decision on a pending request in a single transaction.
    ///
    /// An approval first moves the member to the destination organization
    /// (or out of any organization for a leave request). The status change
    /// only applies while the request is still `pending_admin`; if another
    /// decision got there first the whole transaction rolls back with
    /// [`AppError::Conflict`].
    pub async fn decide(
        &self,
        request: &transfer_request::Model,
        decision: TransferDecision,
    ) -> AppResult<transfer_request::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if decision.status == TransferStatus::Approved {
            let role = request.to_organization_id.as_ref().map(|_| OrgRole::Member);
            let moved = Profile::update_many()
                .set(profile::ActiveModel {
                    organization_id: Set(request.to_organization_id.clone()),
                    organization_role: Set(role),
                    ..Default::default()
                })
                .filter(profile::Column::Id.eq(&request.user_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            if moved.rows_affected == 0 {
                txn.rollback()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                return Err(AppError::ProfileNotFound(request.user_id.clone()));
            }
        }

        let updated = TransferRequest::update_many()
            .set(transfer_request::ActiveModel {
                status: Set(decision.status),
                admin_notes: Set(decision.admin_notes),
                processed_at: Set(Some(Utc::now().into())),
                processed_by: Set(Some(decision.processed_by)),
                ..Default::default()
            })
            .filter(transfer_request::Column::Id.eq(&request.id))
            .filter(transfer_request::Column::Status.eq(TransferStatus::PendingAdmin))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if updated.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(AppError::Conflict(format!(
                "Transfer request {} has already been processed",
                request.id
            )));
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.get_by_id(&request.id).await
    }
}
