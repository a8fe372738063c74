//! Create organization table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organization::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organization::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organization::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Organization::Denomination).string_len(100))
                    .col(ColumnDef::new(Organization::Description).text())
                    .col(
                        ColumnDef::new(Organization::OrgType)
                            .string_len(20)
                            .not_null()
                            .default("church"),
                    )
                    .col(
                        ColumnDef::new(Organization::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Organization::OrgLevel)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Organization::ParentOrgId).string_len(32))
                    .col(
                        ColumnDef::new(Organization::BetaMode)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Organization::BetaStartDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Organization::BetaEndDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(Organization::BetaActivatedBy).string_len(32))
                    .col(
                        ColumnDef::new(Organization::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Organization::CreatedBy).string_len(32).not_null())
                    .col(ColumnDef::new(Organization::ApprovedBy).string_len(32))
                    .col(ColumnDef::new(Organization::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Organization::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_parent")
                            .from(Organization::Table, Organization::ParentOrgId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .check(Expr::col(Organization::OrgLevel).gte(1))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organization_parent_org_id")
                    .table(Organization::Table)
                    .col(Organization::ParentOrgId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organization_status")
                    .table(Organization::Table)
                    .col(Organization::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organization_created_at")
                    .table(Organization::Table)
                    .col(Organization::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Organization::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Organization {
    Table,
    Id,
    Name,
    Denomination,
    Description,
    OrgType,
    Status,
    OrgLevel,
    ParentOrgId,
    BetaMode,
    BetaStartDate,
    BetaEndDate,
    BetaActivatedBy,
    CreatedAt,
    CreatedBy,
    ApprovedBy,
    ApprovedAt,
    UpdatedAt,
}
