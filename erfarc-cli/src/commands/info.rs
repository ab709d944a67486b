//! Info command implementation.

use crate::utils::format_size;
use erfarc_archive::ErfReader;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

pub fn cmd_info(archive: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(archive)?;
    let metadata = file.metadata()?;
    let reader = ErfReader::new(BufReader::new(file))?;
    let header = reader.header();

    println!("Archive Information");
    println!("===================");
    println!("File: {}", archive.display());
    println!("Kind: {}", header.kind);
    println!("Version: {}", header.version);
    println!("Size: {} bytes", metadata.len());
    println!(
        "Build date: year {}, day {}",
        header.build_year + 1900,
        header.build_day
    );
    println!("Description strref: {:#010x}", header.description_str_ref);

    println!();
    println!("Tables:");
    println!(
        "  Localized strings: {} ({} bytes at {})",
        header.localized_string_count,
        header.localized_string_size,
        header.localized_string_offset
    );
    println!(
        "  Keys: {} ({} bytes at {})",
        header.entry_count,
        header.key_table_size(),
        header.key_list_offset
    );
    println!(
        "  Resources: {} ({} bytes at {})",
        header.entry_count,
        header.resource_table_size(),
        header.resource_list_offset
    );

    if !reader.localized_strings().is_empty() {
        println!();
        println!("Description:");
        for string in reader.localized_strings() {
            println!("  [{}] {}", string.language_id, string.text());
        }
    }

    let entries = reader.entries();
    println!();
    println!("Entries:");
    println!(
        "  {:>5}  {:<32}  {:<4}  {:>10}  {:>10}",
        "Id", "Key", "Type", "Offset", "Size"
    );
    for entry in entries {
        println!(
            "  {:>5}  {:<32}  {:<4}  {:>10}  {:>10}",
            entry.id,
            entry.key,
            entry.res_type.to_string(),
            entry.offset,
            entry.size
        );
    }

    let total: u64 = entries.iter().map(|e| e.size).sum();
    let nested = entries.iter().filter(|e| e.is_container()).count();
    println!();
    println!(
        "{} entries, {} of payload, {} nested archives",
        entries.len(),
        format_size(total),
        nested
    );

    Ok(())
}
