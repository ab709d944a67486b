//! # erfarc Archive
//!
//! ERF-family archive support for erfarc.
//!
//! This crate reads and writes the encapsulated resource archives used by
//! the Aurora engine games:
//!
//! - **ERF**: generic resource archives
//! - **MOD**: modules
//! - **HAK**: hak paks
//!
//! On top of the codec it builds a recursive [`ResourceNode`] tree, with
//! nested archives expanded in place, and a [`walk`] over that tree used
//! for listing and extraction.
//!
//! ## Example
//!
//! ```rust,no_run
//! use erfarc_archive::{NameFilter, WalkOptions, extract_archive};
//! use std::path::Path;
//!
//! let options = WalkOptions::new()
//!     .depth(-1)
//!     .filter(NameFilter::new([r"\.nss$"]).unwrap())
//!     .output_dir("out");
//! let stats = extract_archive(Path::new("module.mod"), &options, None).unwrap();
//! println!("{} resources, {} bytes", stats.count, stats.bytes);
//! ```
//!
//! ## Format Detection
//!
//! Use [`detect::ArchiveKind`] to classify a file by its type tag.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod detect;
pub mod engine;
pub mod erf;
pub mod export;
pub mod extract;
pub mod tree;
pub mod walk;

// Re-exports
pub use detect::ArchiveKind;
pub use engine::{WalkOptions, extract_archive, list_archive};
pub use erf::{
    ErfArchive, ErfEntry, ErfHeader, ErfReader, ErfVersion, ErfWriter, HEADER_SIZE,
    LocalizedString,
};
pub use export::archive_to_xml;
pub use extract::{ExtractHandler, Extractor, HandlerTable, Lister, RawCopyHandler, ReadSeek};
pub use tree::{ContainerNode, MetaFile, NodeKind, ResourceNode};
pub use walk::{NameFilter, PathFilter, Visitor, WalkStats, walk, walk_subtree};
