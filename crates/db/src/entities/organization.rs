//! Organization entity for churches and their sub-organizations.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Approval status of an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum OrgStatus {
    /// Awaiting platform admin review.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved and active.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected by a platform admin.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Kind of organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum OrgType {
    /// Beta testing program organization.
    #[sea_orm(string_value = "beta_program")]
    BetaProgram,
    /// Local church organization.
    #[sea_orm(string_value = "church")]
    #[default]
    Church,
    /// Convention, association, or large organization.
    #[sea_orm(string_value = "enterprise")]
    Enterprise,
}

impl OrgType {
    /// Whether organizations of this type may have sub-organizations.
    #[must_use]
    pub const fn allows_sub_orgs(&self) -> bool {
        matches!(self, Self::Church | Self::Enterprise)
    }
}

/// Organization entity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organization")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name.
    pub name: String,

    #[sea_orm(nullable)]
    pub denomination: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub org_type: OrgType,

    pub status: OrgStatus,

    /// Depth in the hierarchy; top-level organizations are level 1.
    pub org_level: i32,

    /// Parent organization (null for top-level).
    #[sea_orm(indexed, nullable)]
    pub parent_org_id: Option<String>,

    #[sea_orm(default_value = false)]
    pub beta_mode: bool,

    #[sea_orm(nullable)]
    pub beta_start_date: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub beta_end_date: Option<DateTimeWithTimeZone>,

    /// Admin who last switched beta mode on.
    #[sea_orm(nullable)]
    pub beta_activated_by: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub created_by: String,

    #[sea_orm(nullable)]
    pub approved_by: Option<String>,

    #[sea_orm(nullable)]
    pub approved_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentOrgId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Parent,
    #[sea_orm(has_many = "super::profile::Entity")]
    Members,
    #[sea_orm(has_many = "super::invite::Entity")]
    Invites,
    #[sea_orm(has_many = "super::org_shared_focus::Entity")]
    SharedFocus,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::invite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invites.def()
    }
}

impl Related<super::org_shared_focus::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SharedFocus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
