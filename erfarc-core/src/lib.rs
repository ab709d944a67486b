//! # erfarc Core
//!
//! Core components for the erfarc resource archive library.
//!
//! This crate provides the building blocks the archive layer is made of:
//!
//! - [`array`]: Growable array with wrap-around indexing and clamped ranges
//! - [`dict`]: String-keyed dictionary with a fixed bucket count
//! - [`queue`]: Bounded FIFO queue over a circular buffer
//! - [`restype`]: Resource type registry and key/filename rules
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ CLI                                                     │
//! │     list / extract / info / create                      │
//! ├─────────────────────────────────────────────────────────┤
//! │ Traversal                                               │
//! │     depth limit, name filter, extraction handlers       │
//! ├─────────────────────────────────────────────────────────┤
//! │ Resource Tree + Archive Codec                           │
//! │     ERF/MOD/HAK header, key and value tables            │
//! ├─────────────────────────────────────────────────────────┤
//! │ Core (this crate)                                       │
//! │     Array, Dict, Queue, type registry, errors           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use erfarc_core::{Array, Dict, ResourceType};
//!
//! let mut keys: Array<&str> = Array::new();
//! keys.append("area01");
//! keys.append("module");
//! assert_eq!(keys.get(-1), Some(&"module"));
//!
//! let mut by_ext = Dict::new();
//! by_ext.set("are", ResourceType::ARE);
//! assert_eq!(by_ext.get("are"), Some(&ResourceType::ARE));
//!
//! assert_eq!(ResourceType::from_extension("x.hak"), ResourceType::HAK);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod array;
pub mod dict;
pub mod error;
pub mod queue;
pub mod restype;

// Re-exports for convenience
pub use array::Array;
pub use dict::Dict;
pub use error::{ErfError, Result};
pub use queue::Queue;
pub use restype::{
    KeyWidth, RESOURCE_TYPES, ResourceType, ResourceTypeInfo, filename_to_key_and_type,
    is_valid_key, key_and_type_to_filename, type_from_extension, type_info,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::array::Array;
    pub use crate::dict::Dict;
    pub use crate::error::{ErfError, Result};
    pub use crate::queue::Queue;
    pub use crate::restype::{KeyWidth, ResourceType, ResourceTypeInfo};
}
