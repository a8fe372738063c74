//! Profile entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a profile inside its organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "kebab-case")]
pub enum OrgRole {
    /// Org manager ("shepherd").
    #[sea_orm(string_value = "leader")]
    Leader,
    /// Shares management duties with the leader.
    #[sea_orm(string_value = "co-leader")]
    CoLeader,
    /// Teacher in the organization's pool.
    #[sea_orm(string_value = "member")]
    Member,
}

impl OrgRole {
    /// Check if the role can manage the organization (members, transfers, child orgs).
    #[must_use]
    pub const fn can_manage(&self) -> bool {
        matches!(self, Self::Leader | Self::CoLeader)
    }
}

/// Profile - a user of the platform.
///
/// `organization_id` is the only membership pointer; there is no separate
/// membership table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(nullable)]
    pub full_name: Option<String>,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    #[sea_orm(indexed, nullable)]
    pub organization_id: Option<String>,

    #[sea_orm(nullable)]
    pub organization_role: Option<OrgRole>,

    #[sea_orm(default_value = false)]
    pub is_platform_admin: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id",
        on_delete = "SetNull"
    )]
    Organization,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
