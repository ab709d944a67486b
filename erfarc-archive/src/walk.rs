//! Depth-limited, filtered traversal of a resource tree.
//!
//! [`walk`] visits a tree depth-first. Each node has a logical path made of
//! the filenames below the top node joined by `/`, for example
//! `textures.erf/stone01.tga`. Filters are matched against that path and
//! prune whole subtrees. The depth limit gates subtree expansion only: a
//! node at the limit is still visited, as a single unit.
//!
//! What a visit does is up to the [`Visitor`]: the listing visitor prints a
//! line, the extracting visitor copies bytes to disk.

use crate::tree::{MetaFile, PATH_SEPARATOR, ResourceNode};
use erfarc_core::{ErfError, Result};
use regex::{Regex, RegexSet};
use std::ops::AddAssign;
use std::path::Path;
use tracing::trace;

/// Totals accumulated by a traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Resources counted, including the top node.
    pub count: u64,
    /// Payload bytes of the counted resources.
    pub bytes: u64,
    /// Meta files visited.
    pub meta_count: u64,
    /// Bytes of the visited meta files.
    pub meta_bytes: u64,
}

impl AddAssign for WalkStats {
    fn add_assign(&mut self, other: Self) {
        self.count += other.count;
        self.bytes += other.bytes;
        self.meta_count += other.meta_count;
        self.meta_bytes += other.meta_bytes;
    }
}

/// Decides whether a logical path takes part in a traversal.
pub trait PathFilter {
    /// Check whether `path` matches.
    fn matches(&self, path: &str) -> bool;
}

/// Matches everything.
impl PathFilter for () {
    fn matches(&self, _path: &str) -> bool {
        true
    }
}

/// A set of regular expressions; a path matches if any of them does.
///
/// An empty set matches every path. Patterns are unanchored, so `"\.nss$"`
/// selects scripts anywhere in the tree.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    set: Option<RegexSet>,
}

impl NameFilter {
    /// Compile a filter from `patterns`.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        if patterns.is_empty() {
            return Ok(Self::default());
        }

        // Compile one by one first so the error names the culprit.
        for pattern in &patterns {
            Regex::new(pattern)
                .map_err(|e| ErfError::invalid_pattern(pattern.as_str(), e.to_string()))?;
        }
        let set = RegexSet::new(&patterns)
            .map_err(|e| ErfError::invalid_pattern(patterns.join(" | "), e.to_string()))?;
        Ok(Self { set: Some(set) })
    }

    /// A filter that matches everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether the filter has no patterns.
    pub fn is_empty(&self) -> bool {
        self.set.is_none()
    }

    /// The source patterns.
    pub fn patterns(&self) -> &[String] {
        self.set.as_ref().map(RegexSet::patterns).unwrap_or(&[])
    }
}

impl PathFilter for NameFilter {
    fn matches(&self, path: &str) -> bool {
        match &self.set {
            Some(set) => set.is_match(path),
            None => true,
        }
    }
}

/// Receives the nodes a traversal selects.
pub trait Visitor {
    /// Handle the payload of `node`, destined for `output`.
    fn visit_resource(&mut self, node: &ResourceNode, path: &str, output: &Path) -> Result<()>;

    /// Handle a meta file of the container `node`, destined for `output`.
    fn visit_meta(
        &mut self,
        node: &ResourceNode,
        meta: &MetaFile,
        path: &str,
        output: &Path,
    ) -> Result<()>;
}

impl<V: Visitor + ?Sized> Visitor for &mut V {
    fn visit_resource(&mut self, node: &ResourceNode, path: &str, output: &Path) -> Result<()> {
        (**self).visit_resource(node, path, output)
    }

    fn visit_meta(
        &mut self,
        node: &ResourceNode,
        meta: &MetaFile,
        path: &str,
        output: &Path,
    ) -> Result<()> {
        (**self).visit_meta(node, meta, path, output)
    }
}

/// Walk the tree below `root`.
///
/// `root` is the top node: it is counted but never filtered or visited
/// itself, only its meta files and subtree are. `depth` limits how many
/// container levels are expanded; a negative depth is unlimited and `0`
/// leaves the root unexpanded. Output paths are rooted at `output_dir`.
///
/// The first visitor error aborts the walk and is returned.
pub fn walk<V: Visitor + ?Sized>(
    root: &ResourceNode,
    depth: i32,
    filter: &dyn PathFilter,
    output_dir: &Path,
    visitor: &mut V,
) -> Result<WalkStats> {
    walk_node(root, true, depth, filter, "", output_dir, visitor)
}

/// Walk `node` as an ordinary member of a tree rather than its top.
///
/// The node is filtered and visited like any child would be, with its own
/// filename as its logical path.
pub fn walk_subtree<V: Visitor + ?Sized>(
    node: &ResourceNode,
    depth: i32,
    filter: &dyn PathFilter,
    output_dir: &Path,
    visitor: &mut V,
) -> Result<WalkStats> {
    walk_node(node, false, depth, filter, "", output_dir, visitor)
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", parent, PATH_SEPARATOR, name)
    }
}

fn walk_node<V: Visitor + ?Sized>(
    node: &ResourceNode,
    is_top: bool,
    depth: i32,
    filter: &dyn PathFilter,
    parent_path: &str,
    dir: &Path,
    visitor: &mut V,
) -> Result<WalkStats> {
    let path = if is_top {
        String::new()
    } else {
        join_path(parent_path, node.filename())
    };

    if !is_top && !filter.matches(&path) {
        trace!(path = %path, "filtered out");
        return Ok(WalkStats::default());
    }

    let mut stats = WalkStats {
        count: 1,
        bytes: node.size,
        ..WalkStats::default()
    };

    if depth != 0 {
        for meta in node.meta_files() {
            let meta_path = join_path(parent_path, &meta.name);
            trace!(path = %meta_path, "visiting meta file");
            visitor.visit_meta(node, meta, &meta_path, &dir.join(&meta.name))?;
            stats.meta_count += 1;
            stats.meta_bytes += meta.size();
        }

        let next = if depth < 0 { -1 } else { depth - 1 };
        let child_dir = if is_top {
            dir.join(&node.name)
        } else {
            dir.join(node.members_dir_name())
        };
        let child_parent = if is_top { "" } else { path.as_str() };
        for child in node.children() {
            stats += walk_node(child, false, next, filter, child_parent, &child_dir, visitor)?;
        }
    }

    if !is_top {
        trace!(path = %path, size = node.size, "visiting resource");
        visitor.visit_resource(node, &path, &dir.join(node.filename()))?;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;
    use erfarc_core::{Array, ResourceType};
    use std::path::PathBuf;

    fn leaf(name: &str, size: u64) -> ResourceNode {
        let mut filenames = Array::new();
        filenames.append(format!("{}.txt", name));
        ResourceNode {
            res_type: ResourceType::TXT,
            name: name.to_string(),
            offset: 0,
            size,
            filenames,
            kind: NodeKind::Leaf,
        }
    }

    #[derive(Default)]
    struct Recorder {
        resources: Vec<(String, PathBuf)>,
        metas: Vec<String>,
        fail_on: Option<String>,
    }

    impl Visitor for Recorder {
        fn visit_resource(&mut self, _: &ResourceNode, path: &str, output: &Path) -> Result<()> {
            if self.fail_on.as_deref() == Some(path) {
                return Err(ErfError::handler(path, "refused"));
            }
            self.resources.push((path.to_string(), output.to_path_buf()));
            Ok(())
        }

        fn visit_meta(&mut self, _: &ResourceNode, _: &MetaFile, path: &str, _: &Path) -> Result<()> {
            self.metas.push(path.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_name_filter_empty_matches_all() {
        let filter = NameFilter::new(Vec::<String>::new()).unwrap();
        assert!(filter.is_empty());
        assert!(filter.matches("x"));
        assert!(NameFilter::all().matches(""));
    }

    #[test]
    fn test_name_filter_any_pattern() {
        let filter = NameFilter::new(["^a", r"\.nss$"]).unwrap();
        assert!(filter.matches("alpha.txt"));
        assert!(filter.matches("dir.erf/script.nss"));
        assert!(!filter.matches("beta.txt"));
        assert_eq!(filter.patterns().len(), 2);
    }

    #[test]
    fn test_name_filter_invalid_pattern() {
        let err = NameFilter::new(["ok", "(unclosed"]).unwrap_err();
        assert!(matches!(err, ErfError::InvalidPattern { pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_walk_leaf_subtree() {
        let node = leaf("alpha", 5);
        let mut recorder = Recorder::default();
        let stats = walk_subtree(&node, -1, &(), Path::new("out"), &mut recorder).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.bytes, 5);
        assert_eq!(recorder.resources[0].0, "alpha.txt");
        assert_eq!(recorder.resources[0].1, Path::new("out/alpha.txt"));
    }

    #[test]
    fn test_walk_subtree_filtered() {
        let node = leaf("alpha", 5);
        let filter = NameFilter::new(["^beta"]).unwrap();
        let mut recorder = Recorder::default();
        let stats = walk_subtree(&node, -1, &filter, Path::new("out"), &mut recorder).unwrap();
        assert_eq!(stats, WalkStats::default());
        assert!(recorder.resources.is_empty());
    }

    #[test]
    fn test_visitor_error_aborts() {
        let node = leaf("alpha", 5);
        let mut recorder = Recorder {
            fail_on: Some("alpha.txt".to_string()),
            ..Recorder::default()
        };
        let err = walk_subtree(&node, -1, &(), Path::new("out"), &mut recorder).unwrap_err();
        assert!(matches!(err, ErfError::Handler { .. }));
    }

    #[test]
    fn test_stats_add_assign() {
        let mut a = WalkStats {
            count: 1,
            bytes: 2,
            meta_count: 3,
            meta_bytes: 4,
        };
        a += a;
        assert_eq!(a.count, 2);
        assert_eq!(a.meta_bytes, 8);
    }
}
