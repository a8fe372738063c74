//! Create profile table.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_organization_table::Organization;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profile::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profile::FullName).string_len(256))
                    .col(ColumnDef::new(Profile::Email).string_len(320))
                    .col(ColumnDef::new(Profile::OrganizationId).string_len(32))
                    .col(ColumnDef::new(Profile::OrganizationRole).string_len(20))
                    .col(
                        ColumnDef::new(Profile::IsPlatformAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Profile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_organization")
                            .from(Profile::Table, Profile::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profile_organization_id")
                    .table(Profile::Table)
                    .col(Profile::OrganizationId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Profile {
    Table,
    Id,
    FullName,
    Email,
    OrganizationId,
    OrganizationRole,
    IsPlatformAdmin,
    CreatedAt,
}
