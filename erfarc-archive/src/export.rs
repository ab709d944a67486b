//! XML export of an archive's structure.
//!
//! Every container node in a resource tree carries one meta file: a small
//! XML document describing the archive header, its localized strings and
//! its entry table. The document is what `extract` writes next to the
//! container's directory, and is enough to rebuild the archive layout.

use crate::erf::ErfArchive;
use std::fmt::Write as _;

/// Escape text for use in XML attribute values and content.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {
                let _ = write!(out, "&#x{:x};", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Render the XML description of `archive`, named `name`.
pub fn archive_to_xml(name: &str, archive: &ErfArchive) -> String {
    let header = &archive.header;
    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        xml,
        "<erf name=\"{}\" type=\"{}\" version=\"{}\" year=\"{}\" day=\"{}\" strref=\"{}\">",
        escape_xml(name),
        escape_xml(String::from_utf8_lossy(&header.normalized_tag()).trim_end()),
        header.version,
        header.build_year + 1900,
        header.build_day,
        header.description_str_ref
    );

    if !archive.localized_strings.is_empty() {
        xml.push_str("  <description>\n");
        for string in &archive.localized_strings {
            let _ = writeln!(
                xml,
                "    <string language=\"{}\">{}</string>",
                string.language_id,
                escape_xml(&string.text())
            );
        }
        xml.push_str("  </description>\n");
    }

    for entry in &archive.entries {
        let _ = writeln!(
            xml,
            "  <resource key=\"{}\" type=\"{}\" id=\"{}\" offset=\"{}\" size=\"{}\"/>",
            escape_xml(&entry.key),
            entry.res_type,
            entry.id,
            entry.offset,
            entry.size
        );
    }

    xml.push_str("</erf>\n");
    xml
}
