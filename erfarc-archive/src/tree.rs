//! Recursive resource tree.
//!
//! Opening an archive produces a [`ResourceNode`] for the archive itself.
//! Every entry becomes a child node; entries whose type is itself a
//! container (ERF, MOD, HAK) are parsed in turn, to any depth. Payloads are
//! never loaded: a node only records where its bytes live in the file.
//!
//! Construction is not depth-limited. Termination is guaranteed by the
//! codec's bounds check together with the rule that a nested container must
//! be strictly smaller than the container holding it.

use crate::detect::ArchiveKind;
use crate::erf::{ErfArchive, ErfHeader};
use crate::export::archive_to_xml;
use erfarc_core::{Array, ErfError, ResourceType, Result, key_and_type_to_filename};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Logical path separator between nested resource names.
pub const PATH_SEPARATOR: char = '/';

/// An auxiliary export attached to a container node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaFile {
    /// Output filename.
    pub name: String,
    /// File contents.
    pub contents: String,
}

impl MetaFile {
    /// Size of the contents in bytes.
    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }
}

/// Payload that only container nodes carry.
#[derive(Debug, Clone)]
pub struct ContainerNode {
    /// The parsed archive header.
    pub header: ErfHeader,
    /// One node per archive entry, in table order.
    pub children: Array<ResourceNode>,
    /// Exports describing this container.
    pub meta_files: Array<MetaFile>,
}

/// Leaf or container.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A plain resource.
    Leaf,
    /// A nested archive.
    Container(ContainerNode),
}

/// One resource in the tree.
#[derive(Debug, Clone)]
pub struct ResourceNode {
    /// Resource type.
    pub res_type: ResourceType,
    /// Resource name without extension.
    pub name: String,
    /// Absolute offset of the payload in the file.
    pub offset: u64,
    /// Payload size in bytes.
    pub size: u64,
    /// Output filenames for this resource's payload.
    pub filenames: Array<String>,
    /// Leaf or container payload.
    pub kind: NodeKind,
}

impl ResourceNode {
    /// Build a node for a resource of `size` bytes at the reader's position.
    ///
    /// Container types are parsed and every entry is built recursively; any
    /// failure in a nested resource fails the whole build.
    pub fn build<R: Read + Seek>(
        res_type: ResourceType,
        name: &str,
        size: u64,
        reader: &mut R,
    ) -> Result<Self> {
        let offset = reader.stream_position()?;
        let mut filenames = Array::new();
        filenames.append(key_and_type_to_filename(name, res_type));

        let kind = if res_type.is_container() {
            NodeKind::Container(Self::build_container(res_type, name, offset, size, reader)?)
        } else {
            NodeKind::Leaf
        };

        Ok(Self {
            res_type,
            name: name.to_string(),
            offset,
            size,
            filenames,
            kind,
        })
    }

    fn build_container<R: Read + Seek>(
        res_type: ResourceType,
        name: &str,
        offset: u64,
        size: u64,
        reader: &mut R,
    ) -> Result<ContainerNode> {
        let archive = ErfArchive::read(reader, size)?;
        debug!(
            name,
            offset,
            size,
            entries = archive.entries.len(),
            "building container node"
        );

        let mut children = Array::with_capacity(archive.entries.len());
        for entry in &archive.entries {
            if entry.is_container() && entry.size >= size {
                return Err(ErfError::self_reference(entry.filename()));
            }
            reader.seek(SeekFrom::Start(offset + entry.offset))?;
            children.append(Self::build(entry.res_type, &entry.key, entry.size, reader)?);
        }

        let mut meta_files = Array::new();
        meta_files.append(MetaFile {
            name: format!("{}.xml", key_and_type_to_filename(name, res_type)),
            contents: archive_to_xml(name, &archive),
        });

        Ok(ContainerNode {
            header: archive.header,
            children,
            meta_files,
        })
    }

    /// Build the root node for the archive at `path`.
    ///
    /// The type comes from the extension; when that is not a container type
    /// the leading tag is checked, so renamed archives still expand.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut res_type = ResourceType::from_extension(&file_name);
        if !res_type.is_container() {
            let (kind, magic) = ArchiveKind::detect(&mut reader)?;
            reader.seek(SeekFrom::Start(0))?;
            if !kind.is_known() {
                let mut tag = [b' '; 4];
                let len = magic.len().min(4);
                tag[..len].copy_from_slice(&magic[..len]);
                return Err(ErfError::invalid_tag(tag));
            }
            res_type = kind.resource_type();
        }

        let stem = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut node = Self::build(res_type, &stem, size, &mut reader)?;
        node.filenames.set(0, file_name);
        Ok(node)
    }

    /// Directory name this container's members are extracted under when
    /// it is nested: the filename with its dot replaced, e.g. `foo_erf`.
    ///
    /// Keys cannot contain dots, so the result never equals a sibling's
    /// filename, and containers sharing a key but not a type stay apart.
    pub fn members_dir_name(&self) -> String {
        key_and_type_to_filename(&self.name, self.res_type).replace('.', "_")
    }

    /// Primary output filename (`name.extension`).
    pub fn filename(&self) -> &str {
        self.filenames.first().map(String::as_str).unwrap_or(&self.name)
    }

    /// Whether this node is a container.
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container(_))
    }

    /// Child nodes; empty for leaves.
    pub fn children(&self) -> &[ResourceNode] {
        match &self.kind {
            NodeKind::Container(container) => container.children.as_slice(),
            NodeKind::Leaf => &[],
        }
    }

    /// Meta files; empty for leaves.
    pub fn meta_files(&self) -> &[MetaFile] {
        match &self.kind {
            NodeKind::Container(container) => container.meta_files.as_slice(),
            NodeKind::Leaf => &[],
        }
    }

    /// Archive header; `None` for leaves.
    pub fn header(&self) -> Option<&ErfHeader> {
        match &self.kind {
            NodeKind::Container(container) => Some(&container.header),
            NodeKind::Leaf => None,
        }
    }

    /// Resolve a `/`-separated path of filenames below this node.
    ///
    /// Matching is case-insensitive, as resource keys are.
    pub fn find(&self, path: &str) -> Option<&ResourceNode> {
        let mut node = self;
        for part in path.split(PATH_SEPARATOR).filter(|p| !p.is_empty()) {
            node = node
                .children()
                .iter()
                .find(|c| c.filename().eq_ignore_ascii_case(part))?;
        }
        Some(node)
    }

    /// Number of nodes in this subtree, including this one.
    pub fn total_nodes(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(ResourceNode::total_nodes)
            .sum::<usize>()
    }
}
