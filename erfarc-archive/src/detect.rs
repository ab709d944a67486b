//! Archive kind detection.
//!
//! ERF-family archives begin with a 4-byte type tag (`"ERF "`, `"MOD "`,
//! `"HAK "`) followed by a 4-byte version tag. Tags are compared
//! case-insensitively, with every non-alphanumeric byte treated as a space,
//! so `b"erf\0"` is recognized as `"ERF "`.

use erfarc_core::ResourceType;
use erfarc_core::error::Result;
use std::io::Read;

/// Known archive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// Generic encapsulated resource file (.erf).
    Erf,
    /// Module (.mod).
    Mod,
    /// Hak pak (.hak).
    Hak,
    /// Unknown tag.
    Unknown,
}

/// Normalize a 4-byte tag: uppercase alphanumerics, everything else a space.
pub fn normalize_tag(tag: &[u8; 4]) -> [u8; 4] {
    tag.map(|b| {
        if b.is_ascii_alphanumeric() {
            b.to_ascii_uppercase()
        } else {
            b' '
        }
    })
}

impl ArchiveKind {
    /// Detect the kind from a 4-byte type tag.
    pub fn from_tag(tag: &[u8; 4]) -> Self {
        match &normalize_tag(tag) {
            b"ERF " => Self::Erf,
            b"MOD " => Self::Mod,
            b"HAK " => Self::Hak,
            _ => Self::Unknown,
        }
    }

    /// Detect the kind from leading bytes.
    pub fn from_magic(magic: &[u8]) -> Self {
        match magic.first_chunk::<4>() {
            Some(tag) => Self::from_tag(tag),
            None => Self::Unknown,
        }
    }

    /// Detect the kind from a reader, returning the bytes consumed.
    pub fn detect<R: Read>(reader: &mut R) -> Result<(Self, Vec<u8>)> {
        let mut magic = vec![0u8; 8];
        let mut filled = 0;
        while filled < magic.len() {
            let n = reader.read(&mut magic[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        magic.truncate(filled);

        let kind = Self::from_magic(&magic);
        Ok((kind, magic))
    }

    /// Map a container resource type to its archive kind.
    pub fn from_resource_type(res_type: ResourceType) -> Self {
        match res_type {
            ResourceType::ERF => Self::Erf,
            ResourceType::MOD => Self::Mod,
            ResourceType::HAK => Self::Hak,
            _ => Self::Unknown,
        }
    }

    /// Canonical 4-byte tag written for this kind.
    pub fn tag(&self) -> [u8; 4] {
        match self {
            Self::Erf => *b"ERF ",
            Self::Mod => *b"MOD ",
            Self::Hak => *b"HAK ",
            Self::Unknown => *b"    ",
        }
    }

    /// Resource type of an archive of this kind.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::Erf => ResourceType::ERF,
            Self::Mod => ResourceType::MOD,
            Self::Hak => ResourceType::HAK,
            Self::Unknown => ResourceType::INVALID,
        }
    }

    /// Check if this is a recognized archive kind.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Erf => write!(f, "ERF"),
            Self::Mod => write!(f, "Module"),
            Self::Hak => write!(f, "Hak pak"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}
