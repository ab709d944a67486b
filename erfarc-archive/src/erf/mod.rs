//! ERF-family archive support (ERF, MOD, HAK).
//!
//! An archive consists of a fixed header, a localized string table, a key
//! table, a resource (value) table and the resource payloads. The key and
//! value tables are parallel: record `i` of each describes entry `i`.
//!
//! ## Example
//!
//! ```no_run
//! use erfarc_archive::ErfReader;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = File::open("module.mod").unwrap();
//! let mut reader = ErfReader::new(BufReader::new(file)).unwrap();
//!
//! for entry in reader.entries() {
//!     println!("{}: {} bytes", entry.filename(), entry.size);
//! }
//! ```

mod header;

pub use header::{
    ErfHeader, ErfVersion, HEADER_SIZE, KeyRecord, LOCALIZED_STRING_PREFIX, LocalizedString,
    RESERVED_SIZE, RESOURCE_RECORD_SIZE, ResourceRecord,
};

use crate::detect::ArchiveKind;
use erfarc_core::{
    Array, Dict, ErfError, ResourceType, Result, filename_to_key_and_type, is_valid_key,
    key_and_type_to_filename,
};
use std::io::{Read, Seek, SeekFrom, Take, Write};
use tracing::{debug, warn};

/// One resource described by the archive tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErfEntry {
    /// Resource name (no extension).
    pub key: String,
    /// Resource type.
    pub res_type: ResourceType,
    /// Resource id from the key table.
    pub id: u32,
    /// Offset of this entry's key record, relative to the archive start.
    pub key_offset: u64,
    /// Offset of the payload, relative to the archive start.
    pub offset: u64,
    /// Payload size in bytes.
    pub size: u64,
}

impl ErfEntry {
    /// Conventional `key.extension` filename.
    pub fn filename(&self) -> String {
        key_and_type_to_filename(&self.key, self.res_type)
    }

    /// Whether this entry is itself an archive.
    pub fn is_container(&self) -> bool {
        self.res_type.is_container()
    }
}

/// Parsed archive metadata (header, strings, entries).
///
/// Payloads are not loaded; use [`ErfReader`] for data access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErfArchive {
    /// The fixed header.
    pub header: ErfHeader,
    /// Localized description strings.
    pub localized_strings: Array<LocalizedString>,
    /// Entries in table order.
    pub entries: Array<ErfEntry>,
}

impl ErfArchive {
    /// Parse archive metadata starting at the reader's current position.
    ///
    /// `limit` is the length of the archive in bytes (the containing file or
    /// the nested resource). Every table and payload must fit inside it.
    pub fn read<R: Read + Seek>(reader: &mut R, limit: u64) -> Result<Self> {
        let base = reader.stream_position()?;

        if limit < HEADER_SIZE {
            return Err(ErfError::invalid_header(format!(
                "archive of {} bytes is smaller than its header",
                limit
            )));
        }
        let header = ErfHeader::read(reader)?;
        debug!(
            kind = %header.kind,
            version = %header.version,
            entries = header.entry_count,
            strings = header.localized_string_count,
            "read archive header"
        );
        if header.reserved.iter().any(|&b| b != 0) {
            warn!("archive header has non-zero reserved bytes");
        }

        check_table(
            "localized string table",
            header.localized_string_offset as u64,
            header.localized_string_size as u64,
            limit,
        )?;
        check_table(
            "key table",
            header.key_list_offset as u64,
            header.key_table_size(),
            limit,
        )?;
        check_table(
            "resource table",
            header.resource_list_offset as u64,
            header.resource_table_size(),
            limit,
        )?;

        let localized_strings = Self::read_localized_strings(reader, base, &header)?;
        let entries = Self::read_entries(reader, base, &header, limit)?;

        Ok(Self {
            header,
            localized_strings,
            entries,
        })
    }

    fn read_localized_strings<R: Read + Seek>(
        reader: &mut R,
        base: u64,
        header: &ErfHeader,
    ) -> Result<Array<LocalizedString>> {
        let count = header.localized_string_count as u64;
        if count * LOCALIZED_STRING_PREFIX > header.localized_string_size as u64 {
            return Err(ErfError::invalid_header(format!(
                "{} localized strings cannot fit in {} bytes",
                count, header.localized_string_size
            )));
        }

        reader.seek(SeekFrom::Start(base + header.localized_string_offset as u64))?;
        let mut remaining = header.localized_string_size as u64;
        let mut strings = Array::with_capacity(count as usize);
        for _ in 0..count {
            let string = LocalizedString::read(reader, remaining)?;
            remaining -= string.record_size();
            strings.append(string);
        }
        Ok(strings)
    }

    fn read_entries<R: Read + Seek>(
        reader: &mut R,
        base: u64,
        header: &ErfHeader,
        limit: u64,
    ) -> Result<Array<ErfEntry>> {
        let count = header.entry_count as usize;
        let width = header.version.key_width();

        reader.seek(SeekFrom::Start(base + header.key_list_offset as u64))?;
        let mut keys = Array::with_capacity(count);
        for _ in 0..count {
            keys.append(KeyRecord::read(reader, width)?);
        }

        reader.seek(SeekFrom::Start(base + header.resource_list_offset as u64))?;
        let mut values = Array::with_capacity(count);
        for _ in 0..count {
            values.append(ResourceRecord::read(reader)?);
        }

        let record_size = header.version.key_record_size();
        let mut entries = Array::with_capacity(count);
        for (index, (key, value)) in keys.into_iter().zip(values).enumerate() {
            if !is_valid_key(&key.key, width.bytes()) {
                return Err(ErfError::invalid_key(index, key.key));
            }

            let offset = value.offset as u64;
            let size = value.size as u64;
            if offset + size > limit || (size > 0 && offset < HEADER_SIZE) {
                return Err(ErfError::out_of_bounds(index, offset, size, limit));
            }

            entries.append(ErfEntry {
                key: key.key,
                res_type: ResourceType::from_code(key.res_type),
                id: key.id,
                key_offset: header.key_list_offset as u64 + index as u64 * record_size,
                offset,
                size,
            });
        }

        debug!("Loaded {} entries", entries.len());
        Ok(entries)
    }

    /// Find an entry by key and type.
    pub fn entry(&self, key: &str, res_type: ResourceType) -> Option<&ErfEntry> {
        self.entries
            .iter()
            .find(|e| e.res_type == res_type && e.key.eq_ignore_ascii_case(key))
    }

    /// Find an entry by `key.extension` filename.
    pub fn entry_by_filename(&self, name: &str) -> Option<&ErfEntry> {
        let (key, res_type) = filename_to_key_and_type(name).ok()?;
        self.entry(&key, res_type)
    }

    /// Sum of all payload sizes.
    pub fn payload_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }
}

/// Verify that a table of `size` bytes at `offset` fits in `limit` bytes.
fn check_table(name: &str, offset: u64, size: u64, limit: u64) -> Result<()> {
    if offset.checked_add(size).is_none_or(|end| end > limit) {
        return Err(ErfError::invalid_header(format!(
            "{} at {} ({} bytes) exceeds archive length {}",
            name, offset, size, limit
        )));
    }
    Ok(())
}

/// Archive reader with extraction support.
pub struct ErfReader<R> {
    reader: R,
    base: u64,
    archive: ErfArchive,
}

impl<R: Read + Seek> ErfReader<R> {
    /// Parse an archive that spans from the reader's position to its end.
    pub fn new(mut reader: R) -> Result<Self> {
        let base = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(base))?;
        Self::with_limit(reader, end.saturating_sub(base))
    }

    /// Parse an archive of `limit` bytes starting at the reader's position.
    pub fn with_limit(mut reader: R, limit: u64) -> Result<Self> {
        let base = reader.stream_position()?;
        let archive = ErfArchive::read(&mut reader, limit)?;
        Ok(Self {
            reader,
            base,
            archive,
        })
    }

    /// Parsed metadata.
    pub fn archive(&self) -> &ErfArchive {
        &self.archive
    }

    /// The archive header.
    pub fn header(&self) -> &ErfHeader {
        &self.archive.header
    }

    /// Get all entries in the archive.
    pub fn entries(&self) -> &[ErfEntry] {
        self.archive.entries.as_slice()
    }

    /// Get the localized description strings.
    pub fn localized_strings(&self) -> &[LocalizedString] {
        self.archive.localized_strings.as_slice()
    }

    /// Get the archive kind.
    pub fn kind(&self) -> ArchiveKind {
        self.archive.header.kind
    }

    /// Find an entry by key and type.
    pub fn entry_by_key(&self, key: &str, res_type: ResourceType) -> Option<&ErfEntry> {
        self.archive.entry(key, res_type)
    }

    /// Open an entry's payload for streaming access.
    ///
    /// Seeks to the payload and returns a [`Take`] limited to its size.
    pub fn read_resource(&mut self, entry: &ErfEntry) -> Result<Take<&mut R>> {
        self.reader
            .seek(SeekFrom::Start(self.base + entry.offset))?;
        Ok(self.reader.by_ref().take(entry.size))
    }

    /// Extract an entry's payload into memory.
    pub fn extract(&mut self, entry: &ErfEntry) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(entry.size as usize);
        self.read_resource(entry)?.read_to_end(&mut data)?;
        if (data.len() as u64) < entry.size {
            return Err(ErfError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("payload of {} truncated", entry.filename()),
            )));
        }
        Ok(data)
    }

    /// Consume the reader, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// A resource queued for writing.
#[derive(Debug, Clone)]
struct PendingResource {
    key: String,
    res_type: ResourceType,
    data: Vec<u8>,
}

/// Archive writer.
///
/// Resources are buffered until [`ErfWriter::finish`], which lays out the
/// header, localized strings, key table, resource table and payloads in that
/// order.
pub struct ErfWriter<W: Write> {
    writer: W,
    header: ErfHeader,
    localized_strings: Array<LocalizedString>,
    resources: Array<PendingResource>,
    names: Dict<()>,
    finished: bool,
}

impl<W: Write> ErfWriter<W> {
    /// Create a new writer for an archive of `kind` and `version`.
    pub fn new(writer: W, kind: ArchiveKind, version: ErfVersion) -> Self {
        Self {
            writer,
            header: ErfHeader::new(kind, version),
            localized_strings: Array::new(),
            resources: Array::new(),
            names: Dict::new(),
            finished: false,
        }
    }

    /// Set the build date (years since 1900, day of the year).
    pub fn set_build_date(&mut self, year: u32, day: u32) {
        self.header.build_year = year;
        self.header.build_day = day;
    }

    /// Set the talk table reference of the description.
    pub fn set_description_str_ref(&mut self, str_ref: u32) {
        self.header.description_str_ref = str_ref;
    }

    /// Add a localized description string.
    pub fn add_localized_string(&mut self, string: LocalizedString) {
        self.localized_strings.append(string);
    }

    /// Add a resource under `key` with type `res_type`.
    pub fn add_resource(&mut self, key: &str, res_type: ResourceType, data: &[u8]) -> Result<()> {
        let width = self.header.version.key_width().bytes();
        if !is_valid_key(key, width) {
            return Err(ErfError::invalid_key(self.resources.len(), key));
        }

        let name = key_and_type_to_filename(&key.to_ascii_lowercase(), res_type);
        if self.names.set(name.as_str(), ()).is_some() {
            return Err(ErfError::duplicate_resource(name));
        }

        self.resources.append(PendingResource {
            key: key.to_string(),
            res_type,
            data: data.to_vec(),
        });
        Ok(())
    }

    /// Add a resource named by a `key.extension` filename.
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let (key, res_type) = filename_to_key_and_type(name)?;
        self.add_resource(&key, res_type, data)
    }

    /// Number of resources queued so far.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if no resources have been queued.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Write the archive and return the metadata that was written.
    ///
    /// Calling `finish` more than once is an error.
    pub fn finish(&mut self) -> Result<ErfArchive> {
        if self.finished {
            return Err(ErfError::invalid_header("archive already finished"));
        }

        let version = self.header.version;
        let width = version.key_width();
        let count = self.resources.len() as u64;

        let strings_size: u64 = self
            .localized_strings
            .iter()
            .map(LocalizedString::record_size)
            .sum();
        let key_list_offset = HEADER_SIZE + strings_size;
        let resource_list_offset = key_list_offset + count * version.key_record_size();
        let data_offset = resource_list_offset + count * RESOURCE_RECORD_SIZE;

        let total = data_offset
            + self
                .resources
                .iter()
                .map(|r| r.data.len() as u64)
                .sum::<u64>();
        if total > u32::MAX as u64 {
            return Err(ErfError::invalid_header(format!(
                "archive of {} bytes exceeds the 4 GiB format limit",
                total
            )));
        }

        let mut header = self.header.clone();
        header.localized_string_count = self.localized_strings.len() as u32;
        header.localized_string_size = strings_size as u32;
        header.entry_count = count as u32;
        header.localized_string_offset = HEADER_SIZE as u32;
        header.key_list_offset = key_list_offset as u32;
        header.resource_list_offset = resource_list_offset as u32;

        let mut entries = Array::with_capacity(self.resources.len());
        let mut offset = data_offset;
        for (index, resource) in self.resources.iter().enumerate() {
            let size = resource.data.len() as u64;
            entries.append(ErfEntry {
                key: resource.key.clone(),
                res_type: resource.res_type,
                id: index as u32,
                key_offset: key_list_offset + index as u64 * version.key_record_size(),
                offset,
                size,
            });
            offset += size;
        }

        header.write(&mut self.writer)?;
        for string in &self.localized_strings {
            string.write(&mut self.writer)?;
        }
        for entry in &entries {
            KeyRecord {
                key: entry.key.clone(),
                id: entry.id,
                res_type: entry.res_type.code(),
                reserved: 0,
            }
            .write(&mut self.writer, width)?;
        }
        for entry in &entries {
            ResourceRecord {
                offset: entry.offset as u32,
                size: entry.size as u32,
            }
            .write(&mut self.writer)?;
        }
        for resource in &self.resources {
            self.writer.write_all(&resource.data)?;
        }
        self.writer.flush()?;
        self.finished = true;

        debug!(
            entries = count,
            bytes = total,
            "wrote {} archive",
            header.kind
        );

        Ok(ErfArchive {
            header,
            localized_strings: self.localized_strings.clone(),
            entries,
        })
    }

    /// Consume the writer and return the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
