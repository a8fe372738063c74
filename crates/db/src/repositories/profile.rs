//! Profile repository.

use std::sync::Arc;

use lessonspark_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use crate::entities::{Profile, profile};

/// Repository for profile operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find profile by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get profile by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<profile::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound(id.to_string()))
    }

    /// Find several profiles at once. Missing IDs are silently skipped.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<profile::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Profile::find()
            .filter(profile::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Members of an organization, ordered by name.
    pub async fn find_by_organization(&self, organization_id: &str) -> AppResult<Vec<profile::Model>> {
        Profile::find()
            .filter(profile::Column::OrganizationId.eq(organization_id))
            .order_by_asc(profile::Column::FullName)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count current members of an organization.
    pub async fn count_by_organization(&self, organization_id: &str) -> AppResult<u64> {
        Profile::find()
            .filter(profile::Column::OrganizationId.eq(organization_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Profiles that may be made leader of an organization: those without an
    /// organization and those already inside it.
    pub async fn find_leader_candidates(
        &self,
        organization_id: &str,
    ) -> AppResult<Vec<profile::Model>> {
        Profile::find()
            .filter(
                Condition::any()
                    .add(profile::Column::OrganizationId.is_null())
                    .add(profile::Column::OrganizationId.eq(organization_id)),
            )
            .order_by_asc(profile::Column::FullName)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a profile.
    pub async fn update(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn create_test_profile(id: &str, organization_id: Option<&str>) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            full_name: Some(format!("Teacher {id}")),
            email: None,
            organization_id: organization_id.map(ToString::to_string),
            organization_role: organization_id.map(|_| profile::OrgRole::Member),
            is_platform_admin: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile("u1", Some("org1"))]])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let found = repo.get_by_id("u1").await.unwrap();

        assert_eq!(found.organization_id.as_deref(), Some("org1"));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.get_by_id("ghost").await;

        assert!(matches!(result, Err(AppError::ProfileNotFound(_))));
    }

    #[tokio::test]
    async fn test_count_by_organization() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => Value::BigInt(Some(5)),
                }]])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        assert_eq!(repo.count_by_organization("org1").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_find_leader_candidates() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_profile("u1", None),
                    create_test_profile("u2", Some("org1")),
                ]])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let candidates = repo.find_leader_candidates("org1").await.unwrap();

        assert_eq!(candidates.len(), 2);
    }
}
