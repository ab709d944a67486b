//! Error types for erfarc operations.
//!
//! A single error enum covers the whole library: I/O failures, malformed
//! archives, invalid resource keys and extraction handler failures. There is
//! no process-wide "last error" slot; every fallible call returns its own
//! [`Result`].

use std::io;
use thiserror::Error;

/// The main error type for erfarc operations.
#[derive(Debug, Error)]
pub enum ErfError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The 4-byte type tag is not a recognized container tag.
    #[error("Unrecognized archive tag: {found:?}")]
    InvalidTag {
        /// The tag bytes as found in the file.
        found: [u8; 4],
    },

    /// The version tag is malformed or names an unsupported version.
    #[error("Unsupported archive version: V{major}.{minor}")]
    UnsupportedVersion {
        /// Major version number.
        major: u32,
        /// Minor version number.
        minor: u32,
    },

    /// Invalid header format.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// An entry points outside the bytes of its containing resource.
    #[error("Entry {index} out of bounds: offset {offset} + size {size} exceeds {limit}")]
    OutOfBounds {
        /// Index of the entry in the archive table.
        index: usize,
        /// Resource offset relative to the archive start.
        offset: u64,
        /// Resource size in bytes.
        size: u64,
        /// Length of the containing resource.
        limit: u64,
    },

    /// A nested container is not strictly smaller than its parent.
    #[error("Nested container '{name}' refers back into its parent")]
    SelfReference {
        /// Name of the offending resource.
        name: String,
    },

    /// A resource key failed the name-validity rule.
    #[error("Invalid key for entry {index}: {key:?}")]
    InvalidKey {
        /// Index of the entry (or position of the resource being added).
        index: usize,
        /// The rejected key.
        key: String,
    },

    /// A filename could not be mapped to a key and resource type.
    #[error("Invalid resource filename: {name}")]
    InvalidFilename {
        /// The rejected filename.
        name: String,
    },

    /// The same key and type were added twice to one archive.
    #[error("Duplicate resource: {name}")]
    DuplicateResource {
        /// Filename form of the duplicate resource.
        name: String,
    },

    /// A name-filter pattern failed to compile.
    #[error("Invalid filter pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// Compiler message.
        message: String,
    },

    /// An extraction handler failed for one resource.
    #[error("Handler failed for {path}: {message}")]
    Handler {
        /// Logical path of the resource being materialized.
        path: String,
        /// Description of the failure.
        message: String,
    },
}

/// Result type alias for erfarc operations.
pub type Result<T> = std::result::Result<T, ErfError>;

impl ErfError {
    /// Create an invalid tag error.
    pub fn invalid_tag(found: [u8; 4]) -> Self {
        Self::InvalidTag { found }
    }

    /// Create an unsupported version error.
    pub fn unsupported_version(major: u32, minor: u32) -> Self {
        Self::UnsupportedVersion { major, minor }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an out-of-bounds entry error.
    pub fn out_of_bounds(index: usize, offset: u64, size: u64, limit: u64) -> Self {
        Self::OutOfBounds {
            index,
            offset,
            size,
            limit,
        }
    }

    /// Create a self-reference error.
    pub fn self_reference(name: impl Into<String>) -> Self {
        Self::SelfReference { name: name.into() }
    }

    /// Create an invalid key error.
    pub fn invalid_key(index: usize, key: impl Into<String>) -> Self {
        Self::InvalidKey {
            index,
            key: key.into(),
        }
    }

    /// Create an invalid filename error.
    pub fn invalid_filename(name: impl Into<String>) -> Self {
        Self::InvalidFilename { name: name.into() }
    }

    /// Create a duplicate resource error.
    pub fn duplicate_resource(name: impl Into<String>) -> Self {
        Self::DuplicateResource { name: name.into() }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a handler error.
    pub fn handler(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error describes a malformed archive (as opposed to I/O
    /// or caller mistakes).
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTag { .. }
                | Self::UnsupportedVersion { .. }
                | Self::InvalidHeader { .. }
                | Self::OutOfBounds { .. }
                | Self::SelfReference { .. }
        )
    }
}
