//! Create invite and `org_shared_focus` tables.
//!
//! Neither table cascades on organization delete; the organization deletion
//! flow removes these rows itself, and a leftover row makes the final delete fail.

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
                    .table(Invite::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invite::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invite::OrganizationId).string_len(32).not_null())
                    .col(ColumnDef::new(Invite::Email).string_len(320).not_null())
                    .col(ColumnDef::new(Invite::InvitedBy).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Invite::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Invite::ClaimedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invite_organization")
                            .from(Invite::Table, Invite::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invite_organization_id")
                    .table(Invite::Table)
                    .col(Invite::OrganizationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrgSharedFocus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrgSharedFocus::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrgSharedFocus::OrganizationId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrgSharedFocus::Passage).string_len(200))
                    .col(ColumnDef::new(OrgSharedFocus::Theme).string_len(200))
                    .col(ColumnDef::new(OrgSharedFocus::Notes).text())
                    .col(ColumnDef::new(OrgSharedFocus::StartDate).date().not_null())
                    .col(ColumnDef::new(OrgSharedFocus::EndDate).date().not_null())
                    .col(ColumnDef::new(OrgSharedFocus::CreatedBy).string_len(64).not_null())
                    .col(
                        ColumnDef::new(OrgSharedFocus::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_org_shared_focus_organization")
                            .from(OrgSharedFocus::Table, OrgSharedFocus::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_org_shared_focus_organization_id")
                    .table(OrgSharedFocus::Table)
                    .col(OrgSharedFocus::OrganizationId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrgSharedFocus::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invite::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Invite {
    Table,
    Id,
    OrganizationId,
    Email,
    InvitedBy,
    CreatedAt,
    ClaimedAt,
}

#[derive(Iden)]
enum OrgSharedFocus {
    Table,
    Id,
    OrganizationId,
    Passage,
    Theme,
    Notes,
    StartDate,
    EndDate,
    CreatedBy,
    CreatedAt,
}
