//! Stock visitors: listing and extraction.
//!
//! Extraction dispatches every resource to an [`ExtractHandler`] chosen by
//! resource type. The default, [`RawCopyHandler`], copies the payload bytes
//! unchanged; registering a handler for a type lets it convert instead
//! (for example a binary format to text) without changing the traversal.

use crate::tree::{MetaFile, ResourceNode};
use crate::walk::Visitor;
use erfarc_core::{Dict, ResourceType, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, trace};

/// Object-safe `Read + Seek`.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek + ?Sized> ReadSeek for T {}

/// Materializes one resource at an output path.
pub trait ExtractHandler {
    /// Write `node`'s payload, read from `source`, to `output`.
    ///
    /// Returns the number of bytes written.
    fn extract(&self, source: &mut dyn ReadSeek, node: &ResourceNode, output: &Path)
    -> Result<u64>;
}

/// Copies payload bytes verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCopyHandler;

impl ExtractHandler for RawCopyHandler {
    fn extract(
        &self,
        source: &mut dyn ReadSeek,
        node: &ResourceNode,
        output: &Path,
    ) -> Result<u64> {
        create_parent_dirs(output)?;
        source.seek(SeekFrom::Start(node.offset))?;

        let mut payload = (&mut *source).take(node.size);
        let mut file = BufWriter::new(File::create(output)?);
        let copied = io::copy(&mut payload, &mut file)?;
        file.flush()?;

        if copied < node.size {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "{}: expected {} bytes, copied {}",
                    node.filename(),
                    node.size,
                    copied
                ),
            )
            .into());
        }
        Ok(copied)
    }
}

/// Handlers keyed by resource type extension, with a fallback.
pub struct HandlerTable {
    handlers: Dict<Box<dyn ExtractHandler>>,
    fallback: Box<dyn ExtractHandler>,
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerTable {
    /// Create a table that copies every type verbatim.
    pub fn new() -> Self {
        Self::with_fallback(Box::new(RawCopyHandler))
    }

    /// Create a table with a custom fallback handler.
    pub fn with_fallback(fallback: Box<dyn ExtractHandler>) -> Self {
        Self {
            handlers: Dict::new(),
            fallback,
        }
    }

    /// Register `handler` for `res_type`, returning the one it replaces.
    pub fn register(
        &mut self,
        res_type: ResourceType,
        handler: Box<dyn ExtractHandler>,
    ) -> Option<Box<dyn ExtractHandler>> {
        self.handlers.set(res_type.extension(), handler)
    }

    /// Handler for `res_type`; the fallback if none is registered.
    pub fn handler_for(&self, res_type: ResourceType) -> &dyn ExtractHandler {
        self.handlers
            .get(res_type.extension())
            .map(|handler| handler.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    /// Number of registered handlers, not counting the fallback.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if only the fallback is present.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

fn create_parent_dirs(output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Progress callback: logical path and bytes written.
pub type ProgressFn<'a> = Box<dyn FnMut(&str, u64) + 'a>;

/// Visitor that writes resources and meta files to disk.
pub struct Extractor<'a, R> {
    source: R,
    handlers: &'a HandlerTable,
    written: u64,
    progress: Option<ProgressFn<'a>>,
}

impl<'a, R: Read + Seek> Extractor<'a, R> {
    /// Create an extractor reading payloads from `source`.
    pub fn new(source: R, handlers: &'a HandlerTable) -> Self {
        Self {
            source,
            handlers,
            written: 0,
            progress: None,
        }
    }

    /// Report every written file to `progress`.
    pub fn with_progress(mut self, progress: impl FnMut(&str, u64) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Total bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Consume the extractor, returning the source.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn report(&mut self, path: &str, bytes: u64) {
        self.written += bytes;
        if let Some(progress) = self.progress.as_mut() {
            progress(path, bytes);
        }
    }
}

impl<R: Read + Seek> Visitor for Extractor<'_, R> {
    fn visit_resource(&mut self, node: &ResourceNode, path: &str, output: &Path) -> Result<()> {
        let handler = self.handlers.handler_for(node.res_type);
        let bytes = handler.extract(&mut self.source, node, output)?;
        trace!(path, output = %output.display(), bytes, "extracted");
        self.report(path, bytes);
        Ok(())
    }

    fn visit_meta(
        &mut self,
        _node: &ResourceNode,
        meta: &MetaFile,
        path: &str,
        output: &Path,
    ) -> Result<()> {
        create_parent_dirs(output)?;
        fs::write(output, &meta.contents)?;
        debug!(path, output = %output.display(), "wrote meta file");
        self.report(path, meta.size());
        Ok(())
    }
}

/// Visitor that prints one line per resource: size, type, logical path.
pub struct Lister<W> {
    out: W,
    meta: bool,
}

impl<W: Write> Lister<W> {
    /// Create a lister writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, meta: false }
    }

    /// Also list meta files.
    pub fn with_meta(mut self, meta: bool) -> Self {
        self.meta = meta;
        self
    }

    /// Consume the lister, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Visitor for Lister<W> {
    fn visit_resource(&mut self, node: &ResourceNode, path: &str, _output: &Path) -> Result<()> {
        writeln!(
            self.out,
            "{:>12}  {:<4}  {}",
            node.size,
            node.res_type.to_string(),
            path
        )?;
        Ok(())
    }

    fn visit_meta(
        &mut self,
        _node: &ResourceNode,
        meta: &MetaFile,
        path: &str,
        _output: &Path,
    ) -> Result<()> {
        if self.meta {
            writeln!(self.out, "{:>12}  {:<4}  {}", meta.size(), "meta", path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;
    use erfarc_core::{Array, ErfError};
    use std::io::Cursor;

    fn node_at(offset: u64, size: u64) -> ResourceNode {
        let mut filenames = Array::new();
        filenames.append("chunk.txt".to_string());
        ResourceNode {
            res_type: ResourceType::TXT,
            name: "chunk".to_string(),
            offset,
            size,
            filenames,
            kind: NodeKind::Leaf,
        }
    }

    struct Upper;

    impl ExtractHandler for Upper {
        fn extract(
            &self,
            source: &mut dyn ReadSeek,
            node: &ResourceNode,
            output: &Path,
        ) -> Result<u64> {
            source.seek(SeekFrom::Start(node.offset))?;
            let mut data = vec![0u8; node.size as usize];
            source.read_exact(&mut data)?;
            let text = String::from_utf8(data)
                .map_err(|e| ErfError::handler(output.display().to_string(), e.to_string()))?;
            fs::write(output, text.to_uppercase())?;
            Ok(node.size)
        }
    }

    #[test]
    fn test_raw_copy() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let output = dir.path().join("nested/dir/chunk.txt");
        let mut source = Cursor::new(b"xxhello!yy".to_vec());

        let copied = RawCopyHandler.extract(&mut source, &node_at(2, 6), &output)?;
        assert_eq!(copied, 6);
        assert_eq!(fs::read(&output)?, b"hello!");
        Ok(())
    }

    #[test]
    fn test_raw_copy_truncated() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let output = dir.path().join("chunk.txt");
        let mut source = Cursor::new(b"abc".to_vec());
        let err = RawCopyHandler
            .extract(&mut source, &node_at(1, 10), &output)
            .unwrap_err();
        assert!(matches!(err, ErfError::Io(_)));
        Ok(())
    }

    #[test]
    fn test_handler_table_dispatch() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut table = HandlerTable::new();
        assert!(table.is_empty());
        assert!(table.register(ResourceType::TXT, Box::new(Upper)).is_none());
        assert_eq!(table.len(), 1);

        let dir = tempfile::tempdir()?;
        let output = dir.path().join("chunk.txt");
        let mut source = Cursor::new(b"hello".to_vec());
        table
            .handler_for(ResourceType::TXT)
            .extract(&mut source, &node_at(0, 5), &output)?;
        assert_eq!(fs::read_to_string(&output)?, "HELLO");

        let other = dir.path().join("chunk.nss");
        table
            .handler_for(ResourceType::NSS)
            .extract(&mut source, &node_at(0, 5), &other)?;
        assert_eq!(fs::read_to_string(&other)?, "hello");
        Ok(())
    }

    #[test]
    fn test_lister_line() {
        let mut lister = Lister::new(Vec::new());
        lister
            .visit_resource(&node_at(0, 42), "a.erf/chunk.txt", Path::new(""))
            .unwrap();
        let out = String::from_utf8(lister.into_inner()).unwrap();
        assert_eq!(out, "          42  txt   a.erf/chunk.txt\n");
    }
}
