//! Core business logic for lessonspark-rs.
//!
//! - [`hierarchy`]: tree ordering for organization listings and the depth policy
//! - [`context`]: the caller's organization scope, passed explicitly into services
//! - [`services`]: organization administration, cascade deletion and transfer requests

pub mod context;
pub mod hierarchy;
pub mod services;

pub use context::OrgContext;
pub use hierarchy::{HierarchyFilter, HierarchyPolicy, TreeEntry, TreeNode};
pub use services::*;
