//! Path-level entry points for listing and extraction.

use crate::extract::{Extractor, HandlerTable, Lister};
use crate::tree::ResourceNode;
use crate::walk::{NameFilter, WalkStats, walk};
use erfarc_core::Result;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Traversal settings shared by listing and extraction.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Container levels to expand; negative is unlimited.
    pub depth: i32,
    /// Logical path filter; empty matches everything.
    pub filter: NameFilter,
    /// Extraction root; `None` extracts next to the archive.
    pub output_dir: Option<PathBuf>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            depth: -1,
            filter: NameFilter::all(),
            output_dir: None,
        }
    }
}

impl WalkOptions {
    /// Create options with unlimited depth and no filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the depth limit.
    pub fn depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    /// Set the name filter.
    pub fn filter(mut self, filter: NameFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the extraction root.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Directory output paths are rooted at for the archive at `archive`.
    pub fn resolve_output_dir(&self, archive: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => archive
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}

/// List the archive at `path` to `out`, one line per resource.
pub fn list_archive<W: Write>(path: &Path, options: &WalkOptions, out: W) -> Result<WalkStats> {
    let root = ResourceNode::open(path)?;
    let mut lister = Lister::new(out);
    let dir = options.resolve_output_dir(path);
    walk(&root, options.depth, &options.filter, &dir, &mut lister)
}

/// Extract the archive at `path`.
///
/// `handlers` selects per-type extraction; `None` copies every payload
/// verbatim.
pub fn extract_archive(
    path: &Path,
    options: &WalkOptions,
    handlers: Option<&HandlerTable>,
) -> Result<WalkStats> {
    let root = ResourceNode::open(path)?;
    let source = BufReader::new(File::open(path)?);
    let default_table = HandlerTable::new();
    let table = handlers.unwrap_or(&default_table);

    let dir = options.resolve_output_dir(path);
    let mut extractor = Extractor::new(source, table);
    let stats = walk(&root, options.depth, &options.filter, &dir, &mut extractor)?;
    info!(
        archive = %path.display(),
        resources = stats.count,
        bytes = extractor.bytes_written(),
        "extraction finished"
    );
    Ok(stats)
}
