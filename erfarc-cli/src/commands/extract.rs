//! Extract command implementation.

use crate::utils::{Planner, build_filter, create_progress_bar, format_size};
use erfarc_archive::{
    Extractor, HandlerTable, NameFilter, ResourceNode, Visitor, WalkStats, walk, walk_subtree,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Options for extracting archives.
pub struct ExtractOptions<'a> {
    pub output: Option<&'a Path>,
    pub depth: i32,
    pub filters: &'a [String],
    pub keep_going: bool,
    pub progress: bool,
}

pub fn cmd_extract(
    archives: &[PathBuf],
    options: &ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = build_filter(options.filters)?;
    let handlers = HandlerTable::new();
    let mut failed_archives = 0usize;

    for archive in archives {
        match extract_one(archive, options, &filter, &handlers) {
            Ok(0) => {}
            Ok(failures) => {
                eprintln!("{}: {} resources failed", archive.display(), failures);
                failed_archives += 1;
            }
            Err(e) if options.keep_going => {
                eprintln!("{}: {}", archive.display(), e);
                failed_archives += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if failed_archives > 0 {
        return Err(format!("{} of {} archives had errors", failed_archives, archives.len()).into());
    }
    Ok(())
}

/// Extract one archive, returning the number of failed top-level resources.
fn extract_one(
    archive: &Path,
    options: &ExtractOptions,
    filter: &NameFilter,
    handlers: &HandlerTable,
) -> Result<usize, Box<dyn std::error::Error>> {
    let root = ResourceNode::open(archive)?;
    let dir = match options.output {
        Some(dir) => dir.to_path_buf(),
        None => archive.parent().map(Path::to_path_buf).unwrap_or_default(),
    };

    let mut planner = Planner::default();
    walk(&root, options.depth, filter, &dir, &mut planner)?;

    println!("Extracting: {}", archive.display());
    let pb = create_progress_bar(planner.visits, options.progress);
    let source = BufReader::new(File::open(archive)?);
    let mut extractor = Extractor::new(source, handlers).with_progress(|path, _| {
        pb.set_message(path.to_string());
        pb.inc(1);
    });

    let (stats, failures) = if options.keep_going {
        extract_each(&root, options.depth, filter, &dir, &mut extractor)?
    } else {
        (walk(&root, options.depth, filter, &dir, &mut extractor)?, 0)
    };
    let written = extractor.bytes_written();
    drop(extractor);
    pb.finish_and_clear();

    println!(
        "Extracted {} resources and {} meta files ({}) to {}",
        stats.count.saturating_sub(1),
        stats.meta_count,
        format_size(written),
        if dir.as_os_str().is_empty() {
            ".".to_string()
        } else {
            dir.display().to_string()
        }
    );
    Ok(failures)
}

/// Walk each top-level resource separately so one failure does not stop
/// the rest.
fn extract_each<V: Visitor>(
    root: &ResourceNode,
    depth: i32,
    filter: &NameFilter,
    dir: &Path,
    visitor: &mut V,
) -> Result<(WalkStats, usize), Box<dyn std::error::Error>> {
    let mut stats = WalkStats {
        count: 1,
        bytes: root.size,
        ..WalkStats::default()
    };
    if depth == 0 {
        return Ok((stats, 0));
    }

    for meta in root.meta_files() {
        visitor.visit_meta(root, meta, &meta.name, &dir.join(&meta.name))?;
        stats.meta_count += 1;
        stats.meta_bytes += meta.size();
    }

    let next = if depth < 0 { -1 } else { depth - 1 };
    let child_dir = dir.join(&root.name);
    let mut failures = 0;
    for child in root.children() {
        match walk_subtree(child, next, filter, &child_dir, visitor) {
            Ok(child_stats) => stats += child_stats,
            Err(e) => {
                warn!(resource = child.filename(), error = %e, "extraction failed");
                eprintln!("  {}: {}", child.filename(), e);
                failures += 1;
            }
        }
    }
    Ok((stats, failures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use erfarc_archive::{ArchiveKind, ErfVersion, ErfWriter, MetaFile};
    use erfarc_core::{ErfError, ResourceType};
    use std::io::Cursor;

    struct FailOn(&'static str, Vec<String>);

    impl Visitor for FailOn {
        fn visit_resource(
            &mut self,
            _: &ResourceNode,
            path: &str,
            _: &Path,
        ) -> erfarc_core::Result<()> {
            if path == self.0 {
                return Err(ErfError::handler(path, "refused"));
            }
            self.1.push(path.to_string());
            Ok(())
        }

        fn visit_meta(
            &mut self,
            _: &ResourceNode,
            _: &MetaFile,
            _: &str,
            _: &Path,
        ) -> erfarc_core::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_extract_each_keeps_going() {
        let mut buf = Vec::new();
        let mut writer = ErfWriter::new(&mut buf, ArchiveKind::Erf, ErfVersion::V1_0);
        writer.add_resource("a", ResourceType::TXT, b"1").unwrap();
        writer.add_resource("b", ResourceType::TXT, b"22").unwrap();
        writer.add_resource("c", ResourceType::TXT, b"333").unwrap();
        writer.finish().unwrap();

        let size = buf.len() as u64;
        let root =
            ResourceNode::build(ResourceType::ERF, "root", size, &mut Cursor::new(buf)).unwrap();

        let mut visitor = FailOn("b.txt", Vec::new());
        let (stats, failures) = extract_each(
            &root,
            -1,
            &NameFilter::all(),
            Path::new("out"),
            &mut visitor,
        )
        .unwrap();
        assert_eq!(failures, 1);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.meta_count, 1);
        assert_eq!(visitor.1, ["a.txt", "c.txt"]);
    }
}
