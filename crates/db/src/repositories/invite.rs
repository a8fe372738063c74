//! Invite repository.

use std::sync::Arc;

use lessonspark_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entities::{Invite, invite};

/// Repository for organization invites.
#[derive(Clone)]
pub struct InviteRepository {
    db: Arc<DatabaseConnection>,
}

impl InviteRepository {
    /// Create a new invite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Count outstanding and claimed invites of an organization.
    pub async fn count_by_organization(&self, organization_id: &str) -> AppResult<u64> {
        Invite::find()
            .filter(invite::Column::OrganizationId.eq(organization_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every invite of an organization.
    pub async fn delete_by_organization(&self, organization_id: &str) -> AppResult<u64> {
        let result = Invite::delete_many()
            .filter(invite::Column::OrganizationId.eq(organization_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
