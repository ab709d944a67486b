//! List command implementation.

use crate::utils::{build_filter, format_size};
use erfarc_archive::{Lister, MetaFile, ResourceNode, Visitor, WalkStats, walk};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// JSON serializable resource data for archive listings.
#[derive(Debug, Serialize, Deserialize)]
struct ResourceJson {
    path: String,
    #[serde(rename = "type")]
    res_type: String,
    offset: u64,
    size: u64,
    container: bool,
}

/// JSON output for archive listing.
#[derive(Debug, Serialize, Deserialize)]
struct ArchiveListJson {
    archive: String,
    kind: String,
    resources: Vec<ResourceJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    meta_files: Vec<String>,
    count: u64,
    bytes: u64,
}

/// Collects visited resources for JSON output.
#[derive(Default)]
struct JsonCollector {
    resources: Vec<ResourceJson>,
    meta_files: Vec<String>,
    meta: bool,
}

impl Visitor for JsonCollector {
    fn visit_resource(
        &mut self,
        node: &ResourceNode,
        path: &str,
        _output: &Path,
    ) -> erfarc_core::Result<()> {
        self.resources.push(ResourceJson {
            path: path.to_string(),
            res_type: node.res_type.to_string(),
            offset: node.offset,
            size: node.size,
            container: node.is_container(),
        });
        Ok(())
    }

    fn visit_meta(
        &mut self,
        _node: &ResourceNode,
        _meta: &MetaFile,
        path: &str,
        _output: &Path,
    ) -> erfarc_core::Result<()> {
        if self.meta {
            self.meta_files.push(path.to_string());
        }
        Ok(())
    }
}

/// Options for listing archive contents.
pub struct ListOptions<'a> {
    pub depth: i32,
    pub filters: &'a [String],
    pub meta: bool,
    pub json: bool,
}

pub fn cmd_list(
    archives: &[PathBuf],
    options: &ListOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = build_filter(options.filters)?;

    for archive in archives {
        let root = ResourceNode::open(archive)?;
        let kind = root
            .header()
            .map(|h| h.kind.to_string())
            .unwrap_or_else(|| root.res_type.to_string());

        if options.json {
            let mut collector = JsonCollector {
                meta: options.meta,
                ..JsonCollector::default()
            };
            let stats = walk(&root, options.depth, &filter, Path::new(""), &mut collector)?;
            let listing = ArchiveListJson {
                archive: archive.display().to_string(),
                kind,
                resources: collector.resources,
                meta_files: collector.meta_files,
                count: stats.count,
                bytes: stats.bytes,
            };
            println!("{}", serde_json::to_string_pretty(&listing)?);
            continue;
        }

        println!("Archive: {} ({})", archive.display(), kind);
        println!();
        println!("{:>12}  {:<4}  Path", "Size", "Type");
        println!("{}", "-".repeat(40));

        let stdout = io::stdout();
        let mut lister = Lister::new(stdout.lock()).with_meta(options.meta);
        let stats = walk(&root, options.depth, &filter, Path::new(""), &mut lister)?;
        lister.into_inner().flush()?;

        print_summary(&stats, root.size);
        println!();
    }

    Ok(())
}

fn print_summary(stats: &WalkStats, archive_size: u64) {
    println!("{}", "-".repeat(40));
    println!("{}", summary_line(stats, archive_size));
    if stats.meta_count > 0 {
        println!(
            "{} meta files, {}",
            stats.meta_count,
            format_size(stats.meta_bytes)
        );
    }
}

/// Resource count and payload bytes below the archive itself.
///
/// The walk counts the archive as one resource; it is not part of its own
/// contents.
fn content_totals(stats: &WalkStats, archive_size: u64) -> (u64, u64) {
    (
        stats.count.saturating_sub(1),
        stats.bytes.saturating_sub(archive_size),
    )
}

fn summary_line(stats: &WalkStats, archive_size: u64) -> String {
    let (count, bytes) = content_totals(stats, archive_size);
    format!("{} resources, {} ({} bytes)", count, format_size(bytes), bytes)
}
