//! Organization invite entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invitation for someone to join an organization's teaching team.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invite")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub organization_id: String,

    /// Address the invitation was sent to.
    pub email: String,

    pub invited_by: String,

    pub created_at: DateTimeWithTimeZone,

    /// When the invitee accepted (null while outstanding).
    #[sea_orm(nullable)]
    pub claimed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
