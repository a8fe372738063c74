//! Shared focus repository.

use std::sync::Arc;

use lessonspark_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entities::{OrgSharedFocus, org_shared_focus};

/// Repository for organization shared-focus rows.
#[derive(Clone)]
pub struct SharedFocusRepository {
    db: Arc<DatabaseConnection>,
}

impl SharedFocusRepository {
    /// Create a new shared focus repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Delete every shared focus of an organization.
    pub async fn delete_by_organization(&self, organization_id: &str) -> AppResult<u64> {
        let result = OrgSharedFocus::delete_many()
            .filter(org_shared_focus::Column::OrganizationId.eq(organization_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
