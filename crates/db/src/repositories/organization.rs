//! Organization repository.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use lessonspark_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{Organization, organization};

/// Repository for organization operations.
#[derive(Clone)]
pub struct OrganizationRepository {
    db: Arc<DatabaseConnection>,
}

impl OrganizationRepository {
    /// Create a new organization repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find organization by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<organization::Model>> {
        Organization::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get organization by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<organization::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::OrganizationNotFound(id.to_string()))
    }

    /// Find several organizations at once. Missing IDs are silently skipped.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<organization::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Organization::find()
            .filter(organization::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every organization, ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<organization::Model>> {
        Organization::find()
            .order_by_asc(organization::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Direct children of an organization, ordered by name.
    pub async fn find_children(&self, parent_id: &str) -> AppResult<Vec<organization::Model>> {
        Organization::find()
            .filter(organization::Column::ParentOrgId.eq(parent_id))
            .order_by_asc(organization::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new organization.
    pub async fn create(&self, model: organization::ActiveModel) -> AppResult<organization::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an organization.
    pub async fn update(&self, model: organization::ActiveModel) -> AppResult<organization::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Make an organization top-level and shift its descendants up to match.
    ///
    /// Runs in one transaction. Returns the number of descendants re-leveled.
    pub async fn make_top_level(&self, id: &str) -> AppResult<u64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let moved = Organization::update_many()
            .set(organization::ActiveModel {
                parent_org_id: Set(None),
                org_level: Set(TOP_LEVEL),
                updated_at: Set(Some(Utc::now().into())),
                ..Default::default()
            })
            .filter(organization::Column::Id.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if moved.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(AppError::OrganizationNotFound(id.to_string()));
        }

        let relevelled = relevel_descendants(&txn, vec![id.to_string()], TOP_LEVEL + 1)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(relevelled)
    }

    /// Turn every child of `parent_id` into a top-level organization.
    ///
    /// Grandchildren and below keep their parents and move up one level per
    /// generation. Returns the number of children detached.
    pub async fn detach_children(&self, parent_id: &str) -> AppResult<u64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let children: Vec<String> = Organization::find()
            .filter(organization::Column::ParentOrgId.eq(parent_id))
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .into_iter()
            .map(|child| child.id)
            .collect();

        let mut detached = 0;
        if !children.is_empty() {
            let result = Organization::update_many()
                .set(organization::ActiveModel {
                    parent_org_id: Set(None),
                    org_level: Set(TOP_LEVEL),
                    ..Default::default()
                })
                .filter(organization::Column::ParentOrgId.eq(parent_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            detached = result.rows_affected;

            relevel_descendants(&txn, children, TOP_LEVEL + 1)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(detached)
    }

    /// Delete an organization row. Returns the number of rows removed.
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        let result = Organization::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

/// Level of an organization with no parent.
const TOP_LEVEL: i32 = 1;

/// Walk down from `roots` one generation at a time, setting each generation's
/// level. Already visited organizations are skipped so parent cycles end the walk.
async fn relevel_descendants<C: ConnectionTrait>(
    conn: &C,
    roots: Vec<String>,
    first_level: i32,
) -> Result<u64, DbErr> {
    let mut visited: HashSet<String> = roots.iter().cloned().collect();
    let mut generation = roots;
    let mut level = first_level;
    let mut relevelled = 0;

    loop {
        let next: Vec<String> = Organization::find()
            .filter(organization::Column::ParentOrgId.is_in(generation))
            .all(conn)
            .await?
            .into_iter()
            .map(|org| org.id)
            .filter(|id| visited.insert(id.clone()))
            .collect();
        if next.is_empty() {
            break;
        }

        let result = Organization::update_many()
            .set(organization::ActiveModel {
                org_level: Set(level),
                ..Default::default()
            })
            .filter(organization::Column::Id.is_in(next.clone()))
            .exec(conn)
            .await?;
        relevelled += result.rows_affected;

        generation = next;
        level += 1;
    }

    Ok(relevelled)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::organization::{OrgStatus, OrgType};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_org(id: &str, name: &str, parent: Option<&str>) -> organization::Model {
        organization::Model {
            id: id.to_string(),
            name: name.to_string(),
            denomination: None,
            description: None,
            org_type: OrgType::Church,
            status: OrgStatus::Approved,
            org_level: if parent.is_some() { 2 } else { 1 },
            parent_org_id: parent.map(ToString::to_string),
            beta_mode: false,
            beta_start_date: None,
            beta_end_date: None,
            beta_activated_by: None,
            created_at: Utc::now().into(),
            created_by: "admin".to_string(),
            approved_by: Some("admin".to_string()),
            approved_at: Some(Utc::now().into()),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<organization::Model>::new()])
                .into_connection(),
        );

        let repo = OrganizationRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::OrganizationNotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_find_children() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_org("c1", "Youth", Some("p1")),
                    create_test_org("c2", "Women", Some("p1")),
                ]])
                .into_connection(),
        );

        let repo = OrganizationRepository::new(db);
        let children = repo.find_children("p1").await.unwrap();

        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.parent_org_id.as_deref() == Some("p1")));
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = OrganizationRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    const fn rows(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    /// Every statement the mock connection received, without spaces.
    fn statements(db: Arc<DatabaseConnection>) -> Vec<String> {
        let db = Arc::try_unwrap(db).ok().unwrap();
        db.into_transaction_log()
            .into_iter()
            .flat_map(|txn| {
                txn.statements()
                    .iter()
                    .map(|stmt| stmt.to_string().replace(' ', ""))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn level_of(org: organization::Model, level: i32) -> organization::Model {
        organization::Model {
            org_level: level,
            ..org
        }
    }

    #[tokio::test]
    async fn test_detach_children_reports_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_org("c1", "Youth", Some("p1")),
                    create_test_org("c2", "Women", Some("p1")),
                ]])
                .append_query_results([Vec::<organization::Model>::new()])
                .append_exec_results([rows(2)])
                .into_connection(),
        );

        let repo = OrganizationRepository::new(Arc::clone(&db));
        assert_eq!(repo.detach_children("p1").await.unwrap(), 2);
        drop(repo);

        let sql = statements(db);
        assert_eq!(sql.first().map(String::as_str), Some("BEGIN"));
        assert_eq!(sql.last().map(String::as_str), Some("COMMIT"));
    }

    #[tokio::test]
    async fn test_detach_children_without_children_writes_nothing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<organization::Model>::new()])
                .into_connection(),
        );

        let repo = OrganizationRepository::new(Arc::clone(&db));
        assert_eq!(repo.detach_children("p1").await.unwrap(), 0);
        drop(repo);

        assert!(!statements(db).iter().any(|sql| sql.starts_with("UPDATE")));
    }

    #[tokio::test]
    async fn test_detach_children_moves_grandchildren_up() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_org("c1", "Youth", Some("p1"))]])
                .append_query_results([[level_of(create_test_org("g1", "Youth Choir", Some("c1")), 3)]])
                .append_query_results([Vec::<organization::Model>::new()])
                .append_exec_results([rows(1), rows(1)])
                .into_connection(),
        );

        let repo = OrganizationRepository::new(Arc::clone(&db));
        assert_eq!(repo.detach_children("p1").await.unwrap(), 1);
        drop(repo);

        let sql = statements(db);
        let grandchild = sql
            .iter()
            .find(|s| s.starts_with(r#"UPDATE"organization""#) && s.contains("'g1'"))
            .unwrap();
        assert!(grandchild.contains(r#""org_level"=2"#), "{grandchild}");
    }

    #[tokio::test]
    async fn test_make_top_level_relevels_each_generation() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([rows(1), rows(2), rows(1)])
                .append_query_results([[
                    level_of(create_test_org("g1", "Youth Choir", Some("c1")), 3),
                    level_of(create_test_org("g2", "Youth Band", Some("c1")), 3),
                ]])
                .append_query_results([[level_of(create_test_org("gg1", "Choir Juniors", Some("g1")), 4)]])
                .append_query_results([Vec::<organization::Model>::new()])
                .into_connection(),
        );

        let repo = OrganizationRepository::new(Arc::clone(&db));
        assert_eq!(repo.make_top_level("c1").await.unwrap(), 3);
        drop(repo);

        let sql = statements(db);
        let updates: Vec<&String> = sql.iter().filter(|s| s.starts_with("UPDATE")).collect();
        assert_eq!(updates.len(), 3);
        assert!(updates[0].contains(r#""org_level"=1"#) && updates[0].contains("'c1'"));
        assert!(updates[1].contains(r#""org_level"=2"#) && updates[1].contains("'g2'"));
        assert!(updates[2].contains(r#""org_level"=3"#) && updates[2].contains("'gg1'"));
    }

    #[tokio::test]
    async fn test_make_top_level_stops_on_parent_cycle() {
        // c1 -> g1 -> c1: the walk must not revisit c1.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([rows(1), rows(1)])
                .append_query_results([[create_test_org("g1", "Youth Choir", Some("c1"))]])
                .append_query_results([[create_test_org("c1", "Youth", Some("g1"))]])
                .into_connection(),
        );

        let repo = OrganizationRepository::new(db);
        assert_eq!(repo.make_top_level("c1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_make_top_level_missing_org() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([rows(0)])
                .into_connection(),
        );

        let repo = OrganizationRepository::new(db);
        let result = repo.make_top_level("missing").await;

        assert!(matches!(result, Err(AppError::OrganizationNotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_delete_surfaces_database_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_errors([sea_orm::DbErr::Custom("fk violation".to_string())])
                .into_connection(),
        );

        let repo = OrganizationRepository::new(db);
        let result = repo.delete("p1").await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
