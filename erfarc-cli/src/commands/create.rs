//! Create command implementation.

use erfarc_archive::{ArchiveKind, ErfVersion, ErfWriter, LocalizedString};
use erfarc_core::ResourceType;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// English, the language id used for descriptions given on the command line.
const LANGUAGE_ENGLISH: u32 = 0;

/// Archive kind implied by the output file's extension.
pub fn kind_for_path(path: &Path) -> ArchiveKind {
    let res_type = ResourceType::from_extension(&path.to_string_lossy());
    match ArchiveKind::from_resource_type(res_type) {
        ArchiveKind::Unknown => {
            warn!(path = %path.display(), "unrecognized archive extension, writing ERF");
            ArchiveKind::Erf
        }
        kind => kind,
    }
}

pub fn cmd_create(
    archive: &PathBuf,
    files: &[PathBuf],
    version: ErfVersion,
    description: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind = kind_for_path(archive);
    let file = File::create(archive)?;
    let mut writer = ErfWriter::new(BufWriter::new(file), kind, version);

    if let Some(text) = description {
        writer.add_localized_string(LocalizedString::new(LANGUAGE_ENGLISH, text));
    }

    for path in files {
        let data = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        writer.add_file(&name, &data)?;
        debug!(file = %path.display(), bytes = data.len(), "added");
        println!("  adding: {}", name);
    }

    let written = writer.finish()?;
    println!(
        "Created {} ({} {}, {} entries)",
        archive.display(),
        kind,
        version,
        written.entries.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use erfarc_archive::ErfReader;
    use std::io::BufReader;

    #[test]
    fn test_kind_for_path() {
        assert_eq!(kind_for_path(Path::new("a.mod")), ArchiveKind::Mod);
        assert_eq!(kind_for_path(Path::new("dir/b.HAK")), ArchiveKind::Hak);
        assert_eq!(kind_for_path(Path::new("c.bin")), ArchiveKind::Erf);
    }

    #[test]
    fn test_create_archive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let script = dir.path().join("x0_onspawn.nss");
        fs::write(&script, b"// spawn")?;
        let archive = dir.path().join("scripts.hak");

        cmd_create(&archive, &[script], ErfVersion::V1_1, Some("Scripts"))?;

        let reader = ErfReader::new(BufReader::new(File::open(&archive)?))?;
        assert_eq!(reader.kind(), ArchiveKind::Hak);
        assert_eq!(reader.header().version, ErfVersion::V1_1);
        assert_eq!(reader.entries()[0].key, "x0_onspawn");
        assert_eq!(reader.entries()[0].res_type, ResourceType::NSS);
        assert_eq!(reader.localized_strings()[0].text(), "Scripts");
        Ok(())
    }

    #[test]
    fn test_create_rejects_unknown_type() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let readme = dir.path().join("readme");
        fs::write(&readme, b"x")?;
        let archive = dir.path().join("out.erf");
        assert!(cmd_create(&archive, &[readme], ErfVersion::V1_0, None).is_err());
        Ok(())
    }
}
