//! Organization administration service.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use lessonspark_common::{AppError, AppResult, id::IdGenerator};
use lessonspark_db::entities::organization::{OrgStatus, OrgType};
use lessonspark_db::entities::profile::OrgRole;
use lessonspark_db::entities::{organization, profile};
use lessonspark_db::repositories::{OrganizationRepository, ProfileRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::context::OrgContext;
use crate::hierarchy::{self, HierarchyFilter, HierarchyPolicy};

/// Organization names must be between these lengths once trimmed.
const NAME_MIN_LENGTH: usize = 3;
const NAME_MAX_LENGTH: usize = 100;

/// Input for creating an organization.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 100))]
    pub denomination: Option<String>,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
    #[serde(default)]
    pub org_type: OrgType,
}

/// Input for editing an organization.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationInput {
    pub organization_id: String,
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    pub denomination: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub org_type: Option<OrgType>,
}

/// Input for making a profile an organization's leader.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignLeaderInput {
    pub organization_id: String,
    pub user_id: String,
}

/// Input for creating a sub-organization.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChildOrganizationInput {
    pub parent_org_id: String,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub denomination: String,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
}

/// Input for the hierarchy listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeInput {
    #[serde(default)]
    pub filter: HierarchyFilter,
    pub search: Option<String>,
    #[serde(default)]
    pub expanded: Vec<String>,
}

/// One row of the hierarchy listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationTreeRow {
    pub organization: organization::Model,
    pub depth: usize,
    pub child_count: usize,
    pub level_name: &'static str,
    pub can_have_children: bool,
}

/// Organization with its members and sub-organizations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDetail {
    pub organization: organization::Model,
    pub parent: Option<organization::Model>,
    pub members: Vec<profile::Model>,
    pub member_count: usize,
    pub children: Vec<organization::Model>,
    pub level_name: &'static str,
    pub can_have_children: bool,
}

/// Service for organization administration.
#[derive(Clone)]
pub struct OrganizationService {
    organization_repo: OrganizationRepository,
    profile_repo: ProfileRepository,
    policy: HierarchyPolicy,
    id_gen: IdGenerator,
}

impl OrganizationService {
    /// Create a new organization service.
    #[must_use]
    pub const fn new(
        organization_repo: OrganizationRepository,
        profile_repo: ProfileRepository,
        policy: HierarchyPolicy,
    ) -> Self {
        Self {
            organization_repo,
            profile_repo,
            policy,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a top-level organization on behalf of a platform admin.
    ///
    /// Admin-created organizations skip review and are approved immediately.
    pub async fn create(
        &self,
        admin_id: &str,
        input: CreateOrganizationInput,
    ) -> AppResult<organization::Model> {
        input.validate()?;
        let name = normalize_name(&input.name)?;
        let now = Utc::now();

        let model = organization::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            denomination: Set(non_blank(input.denomination)),
            description: Set(non_blank(input.description)),
            org_type: Set(input.org_type),
            status: Set(OrgStatus::Approved),
            org_level: Set(HierarchyPolicy::TOP_LEVEL),
            parent_org_id: Set(None),
            beta_mode: Set(false),
            beta_start_date: Set(None),
            beta_end_date: Set(None),
            beta_activated_by: Set(None),
            created_at: Set(now.into()),
            created_by: Set(admin_id.to_string()),
            approved_by: Set(Some(admin_id.to_string())),
            approved_at: Set(Some(now.into())),
            updated_at: Set(None),
        };

        let created = self.organization_repo.create(model).await?;
        tracing::info!(organization_id = %created.id, admin_id = %admin_id, "Organization created");
        Ok(created)
    }

    /// Edit name, denomination, description or type.
    pub async fn update(&self, input: UpdateOrganizationInput) -> AppResult<organization::Model> {
        input.validate()?;
        let org = self.organization_repo.get_by_id(&input.organization_id).await?;
        let mut active: organization::ActiveModel = org.into();

        if let Some(name) = input.name {
            active.name = Set(normalize_name(&name)?);
        }
        if let Some(denomination) = input.denomination {
            active.denomination = Set(non_blank(denomination));
        }
        if let Some(description) = input.description {
            active.description = Set(non_blank(description));
        }
        if let Some(org_type) = input.org_type {
            active.org_type = Set(org_type);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.organization_repo.update(active).await
    }

    /// Approve a pending organization.
    pub async fn approve(&self, admin_id: &str, id: &str) -> AppResult<organization::Model> {
        let org = self.get_pending(id).await?;
        let now = Utc::now();

        let mut active: organization::ActiveModel = org.into();
        active.status = Set(OrgStatus::Approved);
        active.approved_by = Set(Some(admin_id.to_string()));
        active.approved_at = Set(Some(now.into()));
        active.updated_at = Set(Some(now.into()));

        let approved = self.organization_repo.update(active).await?;
        tracing::info!(organization_id = %id, admin_id = %admin_id, "Organization approved");
        Ok(approved)
    }

    /// Reject a pending organization.
    pub async fn reject(&self, admin_id: &str, id: &str) -> AppResult<organization::Model> {
        let org = self.get_pending(id).await?;

        let mut active: organization::ActiveModel = org.into();
        active.status = Set(OrgStatus::Rejected);
        active.updated_at = Set(Some(Utc::now().into()));

        let rejected = self.organization_repo.update(active).await?;
        tracing::info!(organization_id = %id, admin_id = %admin_id, "Organization rejected");
        Ok(rejected)
    }

    async fn get_pending(&self, id: &str) -> AppResult<organization::Model> {
        let org = self.organization_repo.get_by_id(id).await?;
        if org.status != OrgStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Organization {id} has already been reviewed"
            )));
        }
        Ok(org)
    }

    /// Flip beta mode.
    ///
    /// Switching on starts a new beta period and clears any previous end date;
    /// switching off only stamps the end date so the start stays as history.
    pub async fn toggle_beta(&self, admin_id: &str, id: &str) -> AppResult<organization::Model> {
        let org = self.organization_repo.get_by_id(id).await?;
        let enable = !org.beta_mode;
        let now = Utc::now();

        let mut active: organization::ActiveModel = org.into();
        active.beta_mode = Set(enable);
        if enable {
            active.beta_start_date = Set(Some(now.into()));
            active.beta_end_date = Set(None);
            active.beta_activated_by = Set(Some(admin_id.to_string()));
        } else {
            active.beta_end_date = Set(Some(now.into()));
        }
        active.updated_at = Set(Some(now.into()));

        let updated = self.organization_repo.update(active).await?;
        tracing::info!(organization_id = %id, beta_mode = enable, "Beta mode toggled");
        Ok(updated)
    }

    /// Profiles eligible to lead an organization.
    pub async fn leader_candidates(&self, id: &str) -> AppResult<Vec<profile::Model>> {
        self.organization_repo.get_by_id(id).await?;
        self.profile_repo.find_leader_candidates(id).await
    }

    /// Make a profile the leader of an organization.
    pub async fn assign_leader(&self, input: AssignLeaderInput) -> AppResult<profile::Model> {
        let org = self.organization_repo.get_by_id(&input.organization_id).await?;
        let user = self.profile_repo.get_by_id(&input.user_id).await?;

        if let Some(current) = user.organization_id.as_deref() {
            if current != org.id {
                return Err(AppError::Conflict(format!(
                    "User {} already belongs to another organization",
                    user.id
                )));
            }
        }

        let mut active: profile::ActiveModel = user.into();
        active.organization_id = Set(Some(org.id.clone()));
        active.organization_role = Set(Some(OrgRole::Leader));

        let leader = self.profile_repo.update(active).await?;
        tracing::info!(organization_id = %org.id, user_id = %leader.id, "Leader assigned");
        Ok(leader)
    }

    /// Create a sub-organization one level below its parent.
    pub async fn create_child(
        &self,
        ctx: &OrgContext,
        input: CreateChildOrganizationInput,
    ) -> AppResult<organization::Model> {
        input.validate()?;
        ctx.require_manager_of(&input.parent_org_id)?;

        let name = normalize_name(&input.name)?;
        let denomination = non_blank(Some(input.denomination))
            .ok_or_else(|| AppError::Validation("Denomination is required".to_string()))?;

        let parent = self.organization_repo.get_by_id(&input.parent_org_id).await?;
        if !parent.org_type.allows_sub_orgs() {
            return Err(AppError::Forbidden(
                "This organization type cannot have sub-organizations".to_string(),
            ));
        }
        if !self.policy.is_within_max_depth(parent.org_level) {
            return Err(AppError::Forbidden(format!(
                "Maximum hierarchy depth of {} reached",
                self.policy.max_depth()
            )));
        }

        let now = Utc::now();
        let model = organization::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            denomination: Set(Some(denomination)),
            description: Set(non_blank(input.description)),
            org_type: Set(parent.org_type),
            status: Set(OrgStatus::Approved),
            org_level: Set(self.policy.child_level(parent.org_level)),
            parent_org_id: Set(Some(parent.id.clone())),
            beta_mode: Set(false),
            beta_start_date: Set(None),
            beta_end_date: Set(None),
            beta_activated_by: Set(None),
            created_at: Set(now.into()),
            created_by: Set(ctx.user_id.clone()),
            approved_by: Set(Some(ctx.user_id.clone())),
            approved_at: Set(Some(now.into())),
            updated_at: Set(None),
        };

        let child = self.organization_repo.create(model).await?;
        tracing::info!(
            organization_id = %child.id,
            parent_org_id = %parent.id,
            org_level = child.org_level,
            "Sub-organization created"
        );
        Ok(child)
    }

    /// Detach a sub-organization from its parent network.
    ///
    /// The organization keeps its members and data and becomes top-level;
    /// its sub-organizations move up with it. Its own manager, the parent's
    /// manager or a platform admin may do this.
    pub async fn disconnect(&self, ctx: &OrgContext, id: &str) -> AppResult<organization::Model> {
        let org = self.organization_repo.get_by_id(id).await?;
        let Some(parent_id) = org.parent_org_id.clone() else {
            return Err(AppError::BadRequest(format!(
                "Organization {id} is already top-level"
            )));
        };

        if !(ctx.is_platform_admin || ctx.manages(&org.id) || ctx.manages(&parent_id)) {
            return Err(AppError::Forbidden(
                "Only the organization, its parent's leaders or an admin can disconnect it"
                    .to_string(),
            ));
        }

        let relevelled = self.organization_repo.make_top_level(&org.id).await?;
        tracing::info!(
            organization_id = %id,
            parent_org_id = %parent_id,
            descendants_relevelled = relevelled,
            "Organization disconnected"
        );
        self.organization_repo.get_by_id(id).await
    }

    /// Organization with members, children and parent.
    pub async fn detail(&self, id: &str) -> AppResult<OrganizationDetail> {
        let organization = self.organization_repo.get_by_id(id).await?;
        let members = self.profile_repo.find_by_organization(id).await?;
        let children = self.organization_repo.find_children(id).await?;
        let parent = match organization.parent_org_id.as_deref() {
            Some(parent_id) => self.organization_repo.find_by_id(parent_id).await?,
            None => None,
        };

        Ok(OrganizationDetail {
            level_name: self.policy.level_name(organization.org_level),
            can_have_children: self.can_have_children(&organization),
            member_count: members.len(),
            organization,
            parent,
            members,
            children,
        })
    }

    /// Filtered hierarchy listing in display order.
    pub async fn tree(&self, input: TreeInput) -> AppResult<Vec<OrganizationTreeRow>> {
        let all = self.organization_repo.find_all().await?;

        let mut child_counts: HashMap<&str, usize> = HashMap::new();
        for org in &all {
            if let Some(parent) = org.parent_org_id.as_deref() {
                *child_counts.entry(parent).or_default() += 1;
            }
        }

        let search_active = input
            .search
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        let expanded: HashSet<String> = input.expanded.into_iter().collect();
        let filtered = hierarchy::filter_nodes(&all, input.filter, input.search.as_deref());

        let rows = hierarchy::build_tree_order(&filtered, &expanded, search_active)
            .into_iter()
            .map(|entry| OrganizationTreeRow {
                child_count: child_counts.get(entry.node.id.as_str()).copied().unwrap_or(0),
                level_name: self.policy.level_name(entry.node.org_level),
                can_have_children: self.can_have_children(entry.node),
                depth: entry.depth,
                organization: entry.node.clone(),
            })
            .collect();

        Ok(rows)
    }

    fn can_have_children(&self, org: &organization::Model) -> bool {
        org.org_type.allows_sub_orgs() && self.policy.is_within_max_depth(org.org_level)
    }
}

/// Trim an organization name and check its length.
fn normalize_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    let length = trimmed.chars().count();
    if !(NAME_MIN_LENGTH..=NAME_MAX_LENGTH).contains(&length) {
        return Err(AppError::Validation(format!(
            "Organization name must be between {NAME_MIN_LENGTH} and {NAME_MAX_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim optional text; blank becomes `None`.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
