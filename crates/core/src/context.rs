//! Caller organization scope.

use lessonspark_common::{AppError, AppResult};
use lessonspark_db::entities::profile::{self, OrgRole};
use serde::Serialize;

/// Who is calling and which organization, if any, they act for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgContext {
    /// Profile id of the caller.
    pub user_id: String,
    /// The caller's organization.
    pub organization_id: Option<String>,
    /// The caller's role in that organization.
    pub role: Option<OrgRole>,
    pub is_platform_admin: bool,
}

impl OrgContext {
    /// Build the context of a profile.
    #[must_use]
    pub fn from_profile(profile: &profile::Model) -> Self {
        Self {
            user_id: profile.id.clone(),
            organization_id: profile.organization_id.clone(),
            role: profile.organization_role,
            is_platform_admin: profile.is_platform_admin,
        }
    }

    /// Whether the caller leads or co-leads the given organization.
    #[must_use]
    pub fn manages(&self, organization_id: &str) -> bool {
        self.organization_id.as_deref() == Some(organization_id)
            && self.role.is_some_and(|role| role.can_manage())
    }

    /// The organization the caller manages.
    pub fn managed_organization(&self) -> AppResult<&str> {
        match (self.organization_id.as_deref(), self.role) {
            (Some(org_id), Some(role)) if role.can_manage() => Ok(org_id),
            _ => Err(AppError::Forbidden(
                "Only organization leaders can perform this action".to_string(),
            )),
        }
    }

    /// Platform admins, or managers of the given organization.
    pub fn require_manager_of(&self, organization_id: &str) -> AppResult<()> {
        if self.is_platform_admin || self.manages(organization_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Not a manager of organization {organization_id}"
            )))
        }
    }
}
