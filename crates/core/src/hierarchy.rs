//! Organization hierarchy: display ordering and depth policy.
//!
//! [`build_tree_order`] turns a flat list of organizations into the order a
//! collapsible tree is rendered in. Each entry carries its indentation depth.
//! The function is pure and always terminates, even on inputs whose parent
//! pointers form cycles.

use std::collections::{HashMap, HashSet};

use lessonspark_common::config::HierarchyConfig;
use lessonspark_db::entities::organization;
use serde::{Deserialize, Serialize};

/// A node that can be placed in the organization tree.
pub trait TreeNode {
    /// Unique identifier.
    fn id(&self) -> &str;
    /// Parent identifier; `None` for top-level nodes.
    fn parent_id(&self) -> Option<&str>;
    /// Display name, used for ordering and search.
    fn name(&self) -> &str;
    /// Secondary searchable text.
    fn denomination(&self) -> Option<&str> {
        None
    }
}

impl TreeNode for organization::Model {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_org_id.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn denomination(&self) -> Option<&str> {
        self.denomination.as_deref()
    }
}

/// Which part of the hierarchy a listing shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HierarchyFilter {
    /// Every organization.
    #[default]
    All,
    /// Organizations without a parent.
    TopLevel,
    /// Sub-organizations only.
    Children,
}

impl HierarchyFilter {
    fn admits<T: TreeNode>(self, node: &T) -> bool {
        match self {
            Self::All => true,
            Self::TopLevel => node.parent_id().is_none(),
            Self::Children => node.parent_id().is_some(),
        }
    }
}

/// One row of the rendered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEntry<'a, T> {
    /// The organization shown on this row.
    pub node: &'a T,
    /// Indentation level; roots and orphans are 0.
    pub depth: usize,
}

/// Apply the hierarchy filter and a case-insensitive search on name or
/// denomination. Input order is preserved.
#[must_use]
pub fn filter_nodes<'a, T: TreeNode>(
    nodes: &'a [T],
    filter: HierarchyFilter,
    search: Option<&str>,
) -> Vec<&'a T> {
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    nodes
        .iter()
        .filter(|node| filter.admits(*node))
        .filter(|node| {
            needle.as_ref().is_none_or(|needle| {
                node.name().to_lowercase().contains(needle.as_str())
                    || node
                        .denomination()
                        .is_some_and(|d| d.to_lowercase().contains(needle.as_str()))
            })
        })
        .collect()
}

/// Order nodes for rendering as an indented, collapsible tree.
///
/// Top-level nodes come first, sorted by name, each followed by its children
/// when it is expanded or `search_active` is set. Nodes whose parent is not
/// in `nodes` are appended afterwards as roots, in input order, with their
/// own descendants. Nodes that can only be reached through a parent cycle are
/// appended last: each cycle is entered once, at its earliest member.
#[must_use]
pub fn build_tree_order<'a, T: TreeNode>(
    nodes: &[&'a T],
    expanded: &HashSet<String>,
    search_active: bool,
) -> Vec<TreeEntry<'a, T>> {
    let mut builder = TreeBuilder::new(nodes, expanded, search_active);

    let mut roots: Vec<&'a T> = nodes
        .iter()
        .copied()
        .filter(|node| node.parent_id().is_none())
        .collect();
    sort_by_name(&mut roots);
    for root in roots {
        builder.visit(root, 0);
    }

    for &node in nodes {
        if let Some(parent) = node.parent_id() {
            if !builder.by_id.contains_key(parent) {
                builder.visit(node, 0);
            }
        }
    }

    for &node in nodes {
        if builder.visited.contains(node.id()) {
            continue;
        }
        if let Some(entry) = builder.cycle_entry(node) {
            builder.visit(entry, 0);
        }
    }

    builder.out
}

struct TreeBuilder<'a, 'e, T> {
    by_id: HashMap<&'a str, (usize, &'a T)>,
    children: HashMap<&'a str, Vec<&'a T>>,
    expanded: &'e HashSet<String>,
    search_active: bool,
    visited: HashSet<&'a str>,
    out: Vec<TreeEntry<'a, T>>,
}

impl<'a, 'e, T: TreeNode> TreeBuilder<'a, 'e, T> {
    fn new(nodes: &[&'a T], expanded: &'e HashSet<String>, search_active: bool) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        let mut children: HashMap<&'a str, Vec<&'a T>> = HashMap::new();

        for (index, &node) in nodes.iter().enumerate() {
            by_id.entry(node.id()).or_insert((index, node));
            if let Some(parent) = node.parent_id() {
                children.entry(parent).or_default().push(node);
            }
        }
        for siblings in children.values_mut() {
            sort_by_name(siblings);
        }

        Self {
            by_id,
            children,
            expanded,
            search_active,
            visited: HashSet::new(),
            out: Vec::with_capacity(nodes.len()),
        }
    }

    fn visit(&mut self, node: &'a T, depth: usize) {
        if !self.visited.insert(node.id()) {
            return;
        }
        self.out.push(TreeEntry { node, depth });

        if !(self.search_active || self.expanded.contains(node.id())) {
            return;
        }
        let Some(children) = self.children.get(node.id()).cloned() else {
            return;
        };
        for child in children {
            self.visit(child, depth + 1);
        }
    }

    /// If `node` hangs off a parent cycle, the cycle member that should stand
    /// in as its root. `None` when the chain ends at a root or an orphan.
    fn cycle_entry(&self, node: &'a T) -> Option<&'a T> {
        let mut seen: Vec<&'a str> = vec![node.id()];
        let mut current = node;

        let repeated = loop {
            let parent = current.parent_id()?;
            let &(_, parent_node) = self.by_id.get(parent)?;
            if seen.contains(&parent_node.id()) {
                break parent_node;
            }
            seen.push(parent_node.id());
            current = parent_node;
        };

        let mut entry = self.by_id.get(repeated.id())?;
        let mut member = repeated;
        loop {
            let &(index, parent_node) = self.by_id.get(member.parent_id()?)?;
            if parent_node.id() == repeated.id() {
                break;
            }
            if index < entry.0 {
                entry = self.by_id.get(parent_node.id())?;
            }
            member = parent_node;
        }

        Some(entry.1)
    }
}

fn sort_by_name<T: TreeNode>(nodes: &mut [&T]) {
    nodes.sort_by(|a, b| {
        a.name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| a.id().cmp(b.id()))
    });
}

/// Depth limits for organization nesting.
///
/// Top-level organizations are level 1; a child is one level below its
/// parent; no organization may sit deeper than `max_depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyPolicy {
    max_depth: i32,
}

impl Default for HierarchyPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}

impl HierarchyPolicy {
    /// Level of organizations without a parent.
    pub const TOP_LEVEL: i32 = 1;

    /// Policy allowing levels up to `max_depth`.
    #[must_use]
    pub const fn new(max_depth: i32) -> Self {
        Self { max_depth }
    }

    /// Policy from the `hierarchy` config section.
    #[must_use]
    pub const fn from_config(config: &HierarchyConfig) -> Self {
        Self::new(config.max_depth)
    }

    /// Deepest allowed level.
    #[must_use]
    pub const fn max_depth(&self) -> i32 {
        self.max_depth
    }

    /// Whether an organization at `parent_level` may get a child.
    #[must_use]
    pub const fn is_within_max_depth(&self, parent_level: i32) -> bool {
        parent_level < self.max_depth
    }

    /// Level of a new child under `parent_level`.
    #[must_use]
    pub const fn child_level(&self, parent_level: i32) -> i32 {
        parent_level + 1
    }

    /// Display name of a level.
    #[must_use]
    pub const fn level_name(&self, level: i32) -> &'static str {
        match level {
            1 => "Organization",
            2 => "Sub-Organization",
            _ => "Nested Organization",
        }
    }
}
