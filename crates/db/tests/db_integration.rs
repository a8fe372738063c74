//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `lessonspark_test`)
//!   `TEST_DB_PASSWORD` (default: `lessonspark_test`)
//!   `TEST_DB_NAME` (default: `lessonspark_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::Utc;
use lessonspark_common::AppError;
use lessonspark_db::entities::transfer_request::{TransferStatus, TransferType};
use lessonspark_db::entities::{invite, transfer_request};
use lessonspark_db::repositories::{
    InviteRepository, OrganizationRepository, ProfileRepository, TransferDecision,
    TransferRequestRepository,
};
use lessonspark_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::{ActiveModelTrait, Set};

async fn fresh_db() -> TestDatabase {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.expect("Failed to clean");
    db
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection_runs_migrations() {
    let result = TestDatabase::with_config(TestDbConfig::default()).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_detach_children_makes_them_top_level() {
    let db = fresh_db().await;
    db.insert_organization("parent", "First Baptist", None)
        .await
        .unwrap();
    db.insert_organization("child", "Youth Ministry", Some(("parent", 1)))
        .await
        .unwrap();
    db.insert_organization("grandchild", "Youth Choir", Some(("child", 2)))
        .await
        .unwrap();

    let repo = OrganizationRepository::new(Arc::new(db.conn.clone()));
    assert_eq!(repo.detach_children("parent").await.unwrap(), 1);

    let child = repo.get_by_id("child").await.unwrap();
    assert!(child.parent_org_id.is_none());
    assert_eq!(child.org_level, 1);

    let grandchild = repo.get_by_id("grandchild").await.unwrap();
    assert_eq!(grandchild.parent_org_id.as_deref(), Some("child"));
    assert_eq!(grandchild.org_level, 2);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_make_top_level_relevels_subtree() {
    let db = fresh_db().await;
    db.insert_organization("root", "First Baptist", None)
        .await
        .unwrap();
    db.insert_organization("mid", "Youth Ministry", Some(("root", 1)))
        .await
        .unwrap();
    db.insert_organization("leaf", "Youth Choir", Some(("mid", 2)))
        .await
        .unwrap();

    let repo = OrganizationRepository::new(Arc::new(db.conn.clone()));
    assert_eq!(repo.make_top_level("mid").await.unwrap(), 1);

    assert_eq!(repo.get_by_id("mid").await.unwrap().org_level, 1);
    assert_eq!(repo.get_by_id("leaf").await.unwrap().org_level, 2);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_organization_delete_blocked_by_leftover_invite() {
    let db = fresh_db().await;
    db.insert_organization("org1", "Grace Church", None)
        .await
        .unwrap();
    invite::ActiveModel {
        id: Set("inv1".to_string()),
        organization_id: Set("org1".to_string()),
        email: Set("new@example.com".to_string()),
        invited_by: Set("admin".to_string()),
        created_at: Set(Utc::now().into()),
        claimed_at: Set(None),
    }
    .insert(&db.conn)
    .await
    .unwrap();

    let conn = Arc::new(db.conn.clone());
    let orgs = OrganizationRepository::new(Arc::clone(&conn));
    assert!(matches!(orgs.delete("org1").await, Err(AppError::Database(_))));

    let invites = InviteRepository::new(conn);
    assert_eq!(invites.delete_by_organization("org1").await.unwrap(), 1);
    assert_eq!(orgs.delete("org1").await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_transfer_decision_moves_member_once() {
    let db = fresh_db().await;
    db.insert_organization("org-a", "Grace Church", None)
        .await
        .unwrap();
    db.insert_organization("org-b", "Hope Church", None)
        .await
        .unwrap();
    db.insert_profile("teacher", Some("org-a")).await.unwrap();

    let conn = Arc::new(db.conn.clone());
    let requests = TransferRequestRepository::new(Arc::clone(&conn));
    let request = requests
        .create(transfer_request::ActiveModel {
            id: Set("tr1".to_string()),
            user_id: Set("teacher".to_string()),
            from_organization_id: Set("org-a".to_string()),
            to_organization_id: Set(Some("org-b".to_string())),
            transfer_type: Set(TransferType::ToAnotherOrg),
            status: Set(TransferStatus::PendingAdmin),
            reason: Set("Family relocated to another city".to_string()),
            teacher_agreement_confirmed: Set(true),
            teacher_agreement_date: Set(Some(Utc::now().into())),
            admin_notes: Set(None),
            requested_by: Set("leader".to_string()),
            processed_at: Set(None),
            processed_by: Set(None),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    let decided = requests
        .decide(
            &request,
            TransferDecision {
                status: TransferStatus::Approved,
                processed_by: "admin".to_string(),
                admin_notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(decided.status, TransferStatus::Approved);

    let profiles = ProfileRepository::new(conn);
    let moved = profiles.get_by_id("teacher").await.unwrap();
    assert_eq!(moved.organization_id.as_deref(), Some("org-b"));

    let again = requests
        .decide(
            &request,
            TransferDecision {
                status: TransferStatus::Denied,
                processed_by: "admin".to_string(),
                admin_notes: None,
            },
        )
        .await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };
    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost:5432"));
    assert!(url.ends_with("/testdb"));
}
