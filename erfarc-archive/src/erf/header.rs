//! ERF header structures.
//!
//! This module defines the low-level on-disk records of an ERF-family
//! archive:
//! - the fixed 160-byte header
//! - key records (one per entry, in the key table)
//! - resource records (one per entry, in the value table)
//! - localized string records
//!
//! ## Layout
//! ```text
//! [0x00] FileType                  (4 bytes, "ERF " / "MOD " / "HAK ")
//! [0x04] Version                   (4 bytes, "V1.0" / "V1.1")
//! [0x08] LanguageCount             (u32 LE)
//! [0x0C] LocalizedStringSize       (u32 LE)
//! [0x10] EntryCount                (u32 LE)
//! [0x14] OffsetToLocalizedString   (u32 LE)
//! [0x18] OffsetToKeyList           (u32 LE)
//! [0x1C] OffsetToResourceList      (u32 LE)
//! [0x20] BuildYear                 (u32 LE, years since 1900)
//! [0x24] BuildDay                  (u32 LE, days since January 1st)
//! [0x28] DescriptionStrRef         (u32 LE)
//! [0x2C] Reserved                  (116 bytes)
//! ```
//!
//! All offsets are relative to the first byte of the archive, which is not
//! necessarily the first byte of the file when the archive is nested.

use erfarc_core::{ErfError, KeyWidth, Result};
use std::io::{Read, Write};

use crate::detect::{ArchiveKind, normalize_tag};

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: u64 = 160;

/// Size of the reserved block at the end of the header.
pub const RESERVED_SIZE: usize = 116;

/// Size of one resource (value table) record.
pub const RESOURCE_RECORD_SIZE: u64 = 8;

/// Size of the fixed part of a localized string record.
pub const LOCALIZED_STRING_PREFIX: u64 = 8;

#[inline]
fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[inline]
fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// Supported format versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErfVersion {
    /// Version 1.0: 16-byte keys.
    #[default]
    V1_0,
    /// Version 1.1: 32-byte keys.
    V1_1,
}

impl ErfVersion {
    /// Parse a version tag of the form `V<major>.<minor>`.
    pub fn from_tag(tag: &[u8; 4]) -> Result<Self> {
        let malformed = || {
            ErfError::invalid_header(format!(
                "malformed version tag {:?}",
                String::from_utf8_lossy(tag)
            ))
        };

        if !tag[0].eq_ignore_ascii_case(&b'V') || tag[2] != b'.' {
            return Err(malformed());
        }
        if !tag[1].is_ascii_digit() || !tag[3].is_ascii_digit() {
            return Err(malformed());
        }

        let major = (tag[1] - b'0') as u32;
        let minor = (tag[3] - b'0') as u32;
        match (major, minor) {
            (1, 0) => Ok(Self::V1_0),
            (1, 1) => Ok(Self::V1_1),
            _ => Err(ErfError::unsupported_version(major, minor)),
        }
    }

    /// Canonical version tag.
    pub fn tag(&self) -> [u8; 4] {
        match self {
            Self::V1_0 => *b"V1.0",
            Self::V1_1 => *b"V1.1",
        }
    }

    /// Major version number.
    pub fn major(&self) -> u32 {
        1
    }

    /// Minor version number.
    pub fn minor(&self) -> u32 {
        match self {
            Self::V1_0 => 0,
            Self::V1_1 => 1,
        }
    }

    /// Width of the key field for this version.
    pub fn key_width(&self) -> KeyWidth {
        match self {
            Self::V1_0 => KeyWidth::Short,
            Self::V1_1 => KeyWidth::Long,
        }
    }

    /// Size of one key table record.
    pub fn key_record_size(&self) -> u64 {
        self.key_width().bytes() as u64 + 8
    }
}

impl std::fmt::Display for ErfVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "V{}.{}", self.major(), self.minor())
    }
}

/// The fixed archive header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErfHeader {
    /// Archive kind decoded from the type tag.
    pub kind: ArchiveKind,
    /// Raw type tag as stored.
    pub type_tag: [u8; 4],
    /// Format version.
    pub version: ErfVersion,
    /// Raw version tag as stored.
    pub version_tag: [u8; 4],
    /// Number of localized strings.
    pub localized_string_count: u32,
    /// Total size of the localized string table in bytes.
    pub localized_string_size: u32,
    /// Number of entries.
    pub entry_count: u32,
    /// Offset of the localized string table.
    pub localized_string_offset: u32,
    /// Offset of the key table.
    pub key_list_offset: u32,
    /// Offset of the resource (value) table.
    pub resource_list_offset: u32,
    /// Build year, counted from 1900.
    pub build_year: u32,
    /// Build day of the year, counted from 0.
    pub build_day: u32,
    /// Talk table reference of the archive description.
    pub description_str_ref: u32,
    /// Reserved bytes, kept verbatim.
    pub reserved: [u8; RESERVED_SIZE],
}

impl ErfHeader {
    /// Create an empty header for `kind` and `version`.
    pub fn new(kind: ArchiveKind, version: ErfVersion) -> Self {
        Self {
            kind,
            type_tag: kind.tag(),
            version,
            version_tag: version.tag(),
            localized_string_count: 0,
            localized_string_size: 0,
            entry_count: 0,
            localized_string_offset: HEADER_SIZE as u32,
            key_list_offset: HEADER_SIZE as u32,
            resource_list_offset: HEADER_SIZE as u32,
            build_year: 0,
            build_day: 0,
            description_str_ref: 0,
            reserved: [0u8; RESERVED_SIZE],
        }
    }

    /// Read a header from the input.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut type_tag = [0u8; 4];
        reader.read_exact(&mut type_tag)?;
        let kind = ArchiveKind::from_tag(&type_tag);
        if !kind.is_known() {
            return Err(ErfError::invalid_tag(type_tag));
        }

        let mut version_tag = [0u8; 4];
        reader.read_exact(&mut version_tag)?;
        let version = ErfVersion::from_tag(&version_tag)?;

        let localized_string_count = read_u32(reader)?;
        let localized_string_size = read_u32(reader)?;
        let entry_count = read_u32(reader)?;
        let localized_string_offset = read_u32(reader)?;
        let key_list_offset = read_u32(reader)?;
        let resource_list_offset = read_u32(reader)?;
        let build_year = read_u32(reader)?;
        let build_day = read_u32(reader)?;
        let description_str_ref = read_u32(reader)?;

        let mut reserved = [0u8; RESERVED_SIZE];
        reader.read_exact(&mut reserved)?;

        Ok(Self {
            kind,
            type_tag,
            version,
            version_tag,
            localized_string_count,
            localized_string_size,
            entry_count,
            localized_string_offset,
            key_list_offset,
            resource_list_offset,
            build_year,
            build_day,
            description_str_ref,
            reserved,
        })
    }

    /// Write the header to the output.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.type_tag)?;
        writer.write_all(&self.version_tag)?;
        for value in [
            self.localized_string_count,
            self.localized_string_size,
            self.entry_count,
            self.localized_string_offset,
            self.key_list_offset,
            self.resource_list_offset,
            self.build_year,
            self.build_day,
            self.description_str_ref,
        ] {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.write_all(&self.reserved)?;
        Ok(())
    }

    /// The type tag with non-alphanumerics normalized to spaces.
    pub fn normalized_tag(&self) -> [u8; 4] {
        normalize_tag(&self.type_tag)
    }

    /// Byte length of the key table.
    pub fn key_table_size(&self) -> u64 {
        self.entry_count as u64 * self.version.key_record_size()
    }

    /// Byte length of the resource table.
    pub fn resource_table_size(&self) -> u64 {
        self.entry_count as u64 * RESOURCE_RECORD_SIZE
    }
}

/// One key table record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    /// Resource name with padding removed.
    pub key: String,
    /// Resource id.
    pub id: u32,
    /// Resource type code.
    pub res_type: u16,
    /// Unused trailing field.
    pub reserved: u16,
}

impl KeyRecord {
    /// Read a key record with the given key field width.
    pub fn read<R: Read>(reader: &mut R, width: KeyWidth) -> Result<Self> {
        let mut key_buf = vec![0u8; width.bytes()];
        reader.read_exact(&mut key_buf)?;

        // Keys are NUL padded; some writers pad with spaces instead.
        let end = key_buf.iter().position(|&b| b == 0).unwrap_or(key_buf.len());
        let key = String::from_utf8_lossy(&key_buf[..end])
            .trim_end_matches(' ')
            .to_string();

        let id = read_u32(reader)?;
        let res_type = read_u16(reader)?;
        let reserved = read_u16(reader)?;

        Ok(Self {
            key,
            id,
            res_type,
            reserved,
        })
    }

    /// Write a key record, NUL padding the key to `width`.
    pub fn write<W: Write>(&self, writer: &mut W, width: KeyWidth) -> Result<()> {
        let bytes = self.key.as_bytes();
        if bytes.len() > width.bytes() {
            return Err(ErfError::invalid_key(self.id as usize, self.key.clone()));
        }
        let mut key_buf = vec![0u8; width.bytes()];
        key_buf[..bytes.len()].copy_from_slice(bytes);

        writer.write_all(&key_buf)?;
        writer.write_all(&self.id.to_le_bytes())?;
        writer.write_all(&self.res_type.to_le_bytes())?;
        writer.write_all(&self.reserved.to_le_bytes())?;
        Ok(())
    }
}

/// One resource (value table) record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Offset of the payload from the archive start.
    pub offset: u32,
    /// Payload size in bytes.
    pub size: u32,
}

impl ResourceRecord {
    /// Read a resource record.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let offset = read_u32(reader)?;
        let size = read_u32(reader)?;
        Ok(Self { offset, size })
    }

    /// Write a resource record.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.offset.to_le_bytes())?;
        writer.write_all(&self.size.to_le_bytes())?;
        Ok(())
    }
}

/// A description string in one language.
///
/// The text length is explicit on disk, so embedded control bytes survive
/// a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedString {
    /// Language identifier (language * 2 + gender).
    pub language_id: u32,
    /// Raw text bytes in the game's Windows-1252 codepage.
    pub bytes: Vec<u8>,
}

impl LocalizedString {
    /// Create a localized string, encoding `text` as Windows-1252.
    pub fn new(language_id: u32, text: &str) -> Self {
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(text);
        Self {
            language_id,
            bytes: bytes.into_owned(),
        }
    }

    /// Decode the text from Windows-1252.
    pub fn text(&self) -> String {
        let (text, _, _) = encoding_rs::WINDOWS_1252.decode(&self.bytes);
        text.into_owned()
    }

    /// Size of this record on disk.
    pub fn record_size(&self) -> u64 {
        LOCALIZED_STRING_PREFIX + self.bytes.len() as u64
    }

    /// Read a localized string record.
    ///
    /// `remaining` is the number of bytes left in the string table; a
    /// record claiming more is rejected.
    pub fn read<R: Read>(reader: &mut R, remaining: u64) -> Result<Self> {
        if remaining < LOCALIZED_STRING_PREFIX {
            return Err(ErfError::invalid_header(
                "localized string table truncated",
            ));
        }
        let language_id = read_u32(reader)?;
        let len = read_u32(reader)? as u64;
        if len > remaining - LOCALIZED_STRING_PREFIX {
            return Err(ErfError::invalid_header(format!(
                "localized string of {} bytes exceeds table ({} bytes left)",
                len,
                remaining - LOCALIZED_STRING_PREFIX
            )));
        }
        let mut bytes = vec![0u8; len as usize];
        reader.read_exact(&mut bytes)?;
        Ok(Self { language_id, bytes })
    }

    /// Write a localized string record.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.language_id.to_le_bytes())?;
        writer.write_all(&(self.bytes.len() as u32).to_le_bytes())?;
        writer.write_all(&self.bytes)?;
        Ok(())
    }
}
