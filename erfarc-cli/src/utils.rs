//! Utility functions for the CLI.

use erfarc_archive::{MetaFile, NameFilter, ResourceNode, Visitor};
use erfarc_core::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    pb.set_style(style);
    pb
}

/// Compile CLI filter arguments.
pub fn build_filter(patterns: &[String]) -> Result<NameFilter> {
    NameFilter::new(patterns)
}

/// Format a byte count for humans.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Visitor that only counts, used to size progress bars before a walk.
#[derive(Debug, Default)]
pub struct Planner {
    pub visits: u64,
}

impl Visitor for Planner {
    fn visit_resource(&mut self, _: &ResourceNode, _: &str, _: &Path) -> Result<()> {
        self.visits += 1;
        Ok(())
    }

    fn visit_meta(&mut self, _: &ResourceNode, _: &MetaFile, _: &str, _: &Path) -> Result<()> {
        self.visits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn test_build_filter() {
        assert!(build_filter(&[]).unwrap().is_empty());
        assert!(build_filter(&["[".to_string()]).is_err());
    }
}
