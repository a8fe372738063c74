//! Transfer request entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of a transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Submitted by the org manager, awaiting a platform admin.
    #[sea_orm(string_value = "pending_admin")]
    PendingAdmin,
    /// Admin granted the request and the member was moved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Admin denied the request.
    #[sea_orm(string_value = "denied")]
    Denied,
    /// Org manager withdrew the request before an admin decision.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl TransferStatus {
    /// Only requests awaiting review may be approved or denied.
    #[must_use]
    pub const fn can_admin_process(&self) -> bool {
        matches!(self, Self::PendingAdmin)
    }

    /// Org managers may withdraw a request until an admin acts on it.
    #[must_use]
    pub const fn can_org_manager_cancel(&self) -> bool {
        matches!(self, Self::PendingAdmin)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PendingAdmin => "Pending Approval",
            Self::Approved => "Approved",
            Self::Denied => "Denied",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Kind of transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum TransferType {
    /// Moving to a different organization.
    #[sea_orm(string_value = "to_another_org")]
    ToAnotherOrg,
    /// Leaving the organization to become an individual user.
    #[sea_orm(string_value = "leave_org")]
    LeaveOrg,
}

/// Transfer request - moves a member between organizations once an admin approves.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfer_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The member being transferred.
    #[sea_orm(indexed)]
    pub user_id: String,

    #[sea_orm(indexed)]
    pub from_organization_id: String,

    /// Destination; null means the member leaves to become an individual.
    #[sea_orm(indexed, nullable)]
    pub to_organization_id: Option<String>,

    pub transfer_type: TransferType,

    #[sea_orm(indexed)]
    pub status: TransferStatus,

    #[sea_orm(column_type = "Text")]
    pub reason: String,

    pub teacher_agreement_confirmed: bool,

    #[sea_orm(nullable)]
    pub teacher_agreement_date: Option<DateTimeWithTimeZone>,

    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,

    /// Org manager who submitted the request.
    pub requested_by: String,

    #[sea_orm(nullable)]
    pub processed_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub processed_by: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::FromOrganizationId",
        to = "super::organization::Column::Id"
    )]
    FromOrganization,
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::ToOrganizationId",
        to = "super::organization::Column::Id"
    )]
    ToOrganization,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
