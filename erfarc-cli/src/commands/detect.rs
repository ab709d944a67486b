//! Detect command implementation.

use erfarc_archive::ArchiveKind;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

pub fn cmd_detect(file: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let f = File::open(file)?;
    let mut reader = BufReader::new(f);

    let (kind, magic) = ArchiveKind::detect(&mut reader)?;

    println!("File: {}", file.display());
    println!("Kind: {}", kind);
    println!("Magic bytes: {:02X?}", &magic[..magic.len().min(8)]);

    if kind.is_known() {
        println!("Extension: .{}", kind.resource_type().extension());
        if let Some(version) = magic.get(4..8) {
            println!("Version tag: {}", String::from_utf8_lossy(version));
        }
    } else {
        println!("Type: not an ERF-family archive");
    }

    Ok(())
}
