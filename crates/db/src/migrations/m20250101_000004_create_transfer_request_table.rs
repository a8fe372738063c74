//! Create `transfer_request` table.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_organization_table::Organization;
use super::m20250101_000002_create_profile_table::Profile;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TransferRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransferRequest::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TransferRequest::UserId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(TransferRequest::FromOrganizationId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransferRequest::ToOrganizationId).string_len(32))
                    .col(
                        ColumnDef::new(TransferRequest::TransferType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransferRequest::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending_admin"),
                    )
                    .col(ColumnDef::new(TransferRequest::Reason).text().not_null())
                    .col(
                        ColumnDef::new(TransferRequest::TeacherAgreementConfirmed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TransferRequest::TeacherAgreementDate)
                            .timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(TransferRequest::AdminNotes).text())
                    .col(
                        ColumnDef::new(TransferRequest::RequestedBy)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransferRequest::ProcessedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(TransferRequest::ProcessedBy).string_len(64))
                    .col(
                        ColumnDef::new(TransferRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfer_request_user")
                            .from(TransferRequest::Table, TransferRequest::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfer_request_from_organization")
                            .from(TransferRequest::Table, TransferRequest::FromOrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfer_request_to_organization")
                            .from(TransferRequest::Table, TransferRequest::ToOrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transfer_request_from_organization_id")
                    .table(TransferRequest::Table)
                    .col(TransferRequest::FromOrganizationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transfer_request_to_organization_id")
                    .table(TransferRequest::Table)
                    .col(TransferRequest::ToOrganizationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transfer_request_status")
                    .table(TransferRequest::Table)
                    .col(TransferRequest::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransferRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TransferRequest {
    Table,
    Id,
    UserId,
    FromOrganizationId,
    ToOrganizationId,
    TransferType,
    Status,
    Reason,
    TeacherAgreementConfirmed,
    TeacherAgreementDate,
    AdminNotes,
    RequestedBy,
    ProcessedAt,
    ProcessedBy,
    CreatedAt,
}
