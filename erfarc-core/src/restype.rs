//! Resource type registry.
//!
//! Every resource stored in an archive carries a 16-bit type code. The
//! registry maps that code to a file extension and a human-readable name,
//! and back. The table is small, so lookups are linear scans.
//!
//! Resource names inside archives ("keys") carry no extension; the
//! extension comes from the type. [`key_and_type_to_filename`] and
//! [`filename_to_key_and_type`] convert between the two forms.

use crate::error::{ErfError, Result};
use std::fmt;

/// Static description of one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTypeInfo {
    /// File extension without the leading dot (lowercase).
    pub extension: &'static str,
    /// On-disk type code, or -1 for the invalid record.
    pub code: i32,
    /// Human-readable name.
    pub name: &'static str,
}

impl ResourceTypeInfo {
    /// The record returned for unknown types.
    pub const INVALID: Self = Self {
        extension: "",
        code: -1,
        name: "",
    };

    /// Check whether this record describes a known type.
    pub fn is_valid(&self) -> bool {
        self.code >= 0
    }
}

macro_rules! resource_types {
    ($(($ident:ident, $ext:literal, $code:literal, $name:literal),)*) => {
        impl ResourceType {
            $(
                #[doc = $name]
                pub const $ident: Self = Self($code);
            )*
        }

        /// All known resource types.
        pub const RESOURCE_TYPES: &[ResourceTypeInfo] = &[
            $(ResourceTypeInfo { extension: $ext, code: $code, name: $name },)*
        ];
    };
}

/// A resource type code as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceType(pub u16);

resource_types! {
    (BMP, "bmp", 0x0001, "Windows bitmap"),
    (TGA, "tga", 0x0003, "Targa image"),
    (WAV, "wav", 0x0004, "Wave audio"),
    (PLT, "plt", 0x0006, "Palette texture"),
    (INI, "ini", 0x0007, "Configuration file"),
    (BMU, "bmu", 0x0008, "MP3 audio"),
    (MPG, "mpg", 0x0009, "MPEG video"),
    (TXT, "txt", 0x000A, "Text file"),
    (PLH, "plh", 0x07D0, "Placeable header"),
    (TEX, "tex", 0x07D1, "Texture"),
    (MDL, "mdl", 0x07D2, "Model"),
    (THG, "thg", 0x07D3, "Thing"),
    (FNT, "fnt", 0x07D5, "Font"),
    (LUA, "lua", 0x07D7, "Lua script"),
    (SLT, "slt", 0x07D8, "Slot"),
    (NSS, "nss", 0x07D9, "Script source"),
    (NCS, "ncs", 0x07DA, "Compiled script"),
    (MOD, "mod", 0x07DB, "Module"),
    (ARE, "are", 0x07DC, "Area"),
    (SET, "set", 0x07DD, "Tileset"),
    (IFO, "ifo", 0x07DE, "Module info"),
    (BIC, "bic", 0x07DF, "Character"),
    (WOK, "wok", 0x07E0, "Walkmesh"),
    (TWODA, "2da", 0x07E1, "Two-dimensional array"),
    (TLK, "tlk", 0x07E2, "Talk table"),
    (TXI, "txi", 0x07E6, "Texture info"),
    (GIT, "git", 0x07E7, "Area instance data"),
    (BTI, "bti", 0x07E8, "Item blueprint (internal)"),
    (UTI, "uti", 0x07E9, "Item blueprint"),
    (BTC, "btc", 0x07EA, "Creature blueprint (internal)"),
    (UTC, "utc", 0x07EB, "Creature blueprint"),
    (DLG, "dlg", 0x07ED, "Dialog"),
    (ITP, "itp", 0x07EE, "Tile/blueprint palette"),
    (BTT, "btt", 0x07EF, "Trigger blueprint (internal)"),
    (UTT, "utt", 0x07F0, "Trigger blueprint"),
    (DDS, "dds", 0x07F1, "DirectDraw surface"),
    (BTS, "bts", 0x07F2, "Sound blueprint (internal)"),
    (UTS, "uts", 0x07F3, "Sound blueprint"),
    (LTR, "ltr", 0x07F4, "Letter-combination table"),
    (GFF, "gff", 0x07F5, "Generic file format"),
    (FAC, "fac", 0x07F6, "Faction"),
    (BTE, "bte", 0x07F7, "Encounter blueprint (internal)"),
    (UTE, "ute", 0x07F8, "Encounter blueprint"),
    (BTD, "btd", 0x07F9, "Door blueprint (internal)"),
    (UTD, "utd", 0x07FA, "Door blueprint"),
    (BTP, "btp", 0x07FB, "Placeable blueprint (internal)"),
    (UTP, "utp", 0x07FC, "Placeable blueprint"),
    (DFT, "dft", 0x07FD, "Default values"),
    (GIC, "gic", 0x07FE, "Area comments"),
    (GUI, "gui", 0x07FF, "Graphical user interface"),
    (CSS, "css", 0x0800, "Conditional script source"),
    (CCS, "ccs", 0x0801, "Conditional compiled script"),
    (BTM, "btm", 0x0802, "Store blueprint (internal)"),
    (UTM, "utm", 0x0803, "Store blueprint"),
    (DWK, "dwk", 0x0804, "Door walkmesh"),
    (PWK, "pwk", 0x0805, "Placeable walkmesh"),
    (BTG, "btg", 0x0806, "Random item generator (internal)"),
    (UTG, "utg", 0x0807, "Random item generator"),
    (JRL, "jrl", 0x0808, "Journal"),
    (SAV, "sav", 0x0809, "Saved game"),
    (UTW, "utw", 0x080A, "Waypoint blueprint"),
    (FOURPC, "4pc", 0x080B, "Texture (4PC)"),
    (SSF, "ssf", 0x080C, "Sound set"),
    (HAK, "hak", 0x080D, "Hak pak"),
    (NWM, "nwm", 0x080E, "Premium module"),
    (BIK, "bik", 0x080F, "Bink video"),
    (NDB, "ndb", 0x0810, "Script debugger data"),
    (PTM, "ptm", 0x0811, "Plot manager"),
    (PTT, "ptt", 0x0812, "Plot wizard blueprint"),
    (BAK, "bak", 0x0813, "Backup"),
    (DAT, "dat", 0x0814, "Data"),
    (SHD, "shd", 0x0815, "Shader"),
    (XBC, "xbc", 0x0816, "Xbox configuration"),
    (WBM, "wbm", 0x0817, "WebM video"),
    (MTR, "mtr", 0x0818, "Material"),
    (KTX, "ktx", 0x0819, "Khronos texture"),
    (TTF, "ttf", 0x081A, "TrueType font"),
    (SQL, "sql", 0x081B, "SQL script"),
    (TML, "tml", 0x081C, "Tile map"),
    (SQ3, "sq3", 0x081D, "SQLite database"),
    (LOD, "lod", 0x081E, "Level of detail"),
    (GIF, "gif", 0x081F, "GIF image"),
    (PNG, "png", 0x0820, "PNG image"),
    (JPG, "jpg", 0x0821, "JPEG image"),
    (CAF, "caf", 0x0822, "Core audio"),
    (JUI, "jui", 0x0823, "JSON user interface"),
    (IDS, "ids", 0x270C, "Identifier list"),
    (ERF, "erf", 0x270D, "Encapsulated resource file"),
    (BIF, "bif", 0x270E, "Resource bundle"),
    (KEY, "key", 0x270F, "Bundle key"),
}

impl ResourceType {
    /// Sentinel for unknown types.
    pub const INVALID: Self = Self(0xFFFF);

    /// Wrap a raw on-disk code without checking it.
    pub const fn from_code(code: u16) -> Self {
        Self(code)
    }

    /// The raw on-disk code.
    pub const fn code(self) -> u16 {
        self.0
    }

    /// Classify a path by its extension.
    ///
    /// Directory components and the leading dot are stripped; the match is
    /// case-insensitive. Returns [`ResourceType::INVALID`] when nothing
    /// matches.
    pub fn from_extension(path: &str) -> Self {
        let name = final_component(path);
        let ext = match name.rfind('.') {
            Some(dot) => &name[dot + 1..],
            None => name,
        };
        RESOURCE_TYPES
            .iter()
            .find(|info| info.extension.eq_ignore_ascii_case(ext))
            .map(|info| Self(info.code as u16))
            .unwrap_or(Self::INVALID)
    }

    /// Look up the registry record for this type.
    ///
    /// Unknown codes yield [`ResourceTypeInfo::INVALID`]; check
    /// [`ResourceTypeInfo::is_valid`] before relying on the fields.
    pub fn info(self) -> ResourceTypeInfo {
        RESOURCE_TYPES
            .iter()
            .find(|info| info.code == self.0 as i32)
            .copied()
            .unwrap_or(ResourceTypeInfo::INVALID)
    }

    /// Check whether the code is in the registry.
    pub fn is_valid(self) -> bool {
        self.info().is_valid()
    }

    /// File extension for this type, empty if unknown.
    pub fn extension(self) -> &'static str {
        self.info().extension
    }

    /// Whether resources of this type are themselves archives.
    pub fn is_container(self) -> bool {
        matches!(self, Self::ERF | Self::MOD | Self::HAK)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.info();
        if info.is_valid() {
            write!(f, "{}", info.extension)
        } else {
            write!(f, "unknown({:#06x})", self.0)
        }
    }
}

/// Look up type information by code.
pub fn type_info(res_type: ResourceType) -> ResourceTypeInfo {
    res_type.info()
}

/// Classify a path by its extension.
pub fn type_from_extension(path: &str) -> ResourceType {
    ResourceType::from_extension(path)
}

/// Width of the fixed key field in an archive's key table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyWidth {
    /// 16-byte keys (version 1.0).
    Short,
    /// 32-byte keys (version 1.1).
    Long,
}

impl KeyWidth {
    /// Number of bytes in the key field.
    pub const fn bytes(self) -> usize {
        match self {
            Self::Short => 16,
            Self::Long => 32,
        }
    }
}

/// Check a resource key against the name-validity rule.
///
/// A key is 1 to `max_len` ASCII letters, digits or underscores.
pub fn is_valid_key(key: &str, max_len: usize) -> bool {
    !key.is_empty()
        && key.len() <= max_len
        && key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Build the conventional `key.extension` filename for a resource.
pub fn key_and_type_to_filename(key: &str, res_type: ResourceType) -> String {
    let ext = res_type.extension();
    if ext.is_empty() {
        format!("{}.{}", key, res_type.code())
    } else {
        format!("{}.{}", key, ext)
    }
}

/// Split a filename into a resource key and type.
///
/// Only the final path component is considered. The key must satisfy
/// [`is_valid_key`] for the longest key width, and the extension must be a
/// registered type.
pub fn filename_to_key_and_type(path: &str) -> Result<(String, ResourceType)> {
    let name = final_component(path);
    let (key, ext) = name
        .rsplit_once('.')
        .ok_or_else(|| ErfError::invalid_filename(name))?;

    let res_type = RESOURCE_TYPES
        .iter()
        .find(|info| info.extension.eq_ignore_ascii_case(ext))
        .map(|info| ResourceType(info.code as u16))
        .ok_or_else(|| ErfError::invalid_filename(name))?;

    if !is_valid_key(key, KeyWidth::Long.bytes()) {
        return Err(ErfError::invalid_filename(name));
    }

    Ok((key.to_string(), res_type))
}

/// Final component of a `/` or `\` separated path.
fn final_component(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(ResourceType::from_extension("module.MOD"), ResourceType::MOD);
        assert_eq!(ResourceType::from_extension("dir/sub/x.2da"), ResourceType::TWODA);
        assert_eq!(ResourceType::from_extension(".txt"), ResourceType::TXT);
        assert_eq!(ResourceType::from_extension("hak"), ResourceType::HAK);
        assert_eq!(
            ResourceType::from_extension("archive.zip"),
            ResourceType::INVALID
        );
    }

    #[test]
    fn test_type_info_invalid_record() {
        let info = type_info(ResourceType::from_code(0x1234));
        assert_eq!(info, ResourceTypeInfo::INVALID);
        assert_eq!(info.code, -1);
        assert_eq!(info.extension, "");
        assert!(!info.is_valid());

        let info = type_info(ResourceType::TXT);
        assert_eq!(info.extension, "txt");
        assert_eq!(info.code, 10);
    }

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in RESOURCE_TYPES.iter().enumerate() {
            for b in &RESOURCE_TYPES[i + 1..] {
                assert_ne!(a.code, b.code, "{} and {}", a.extension, b.extension);
                assert_ne!(a.extension, b.extension);
            }
        }
    }

    #[test]
    fn test_on_disk_codes() {
        let cases = [
            (ResourceType::TXT, 10, "txt"),
            (ResourceType::NSS, 2009, "nss"),
            (ResourceType::NCS, 2010, "ncs"),
            (ResourceType::MOD, 2011, "mod"),
            (ResourceType::ARE, 2012, "are"),
            (ResourceType::IFO, 2014, "ifo"),
            (ResourceType::TWODA, 2017, "2da"),
            (ResourceType::TLK, 2018, "tlk"),
            (ResourceType::UTC, 2027, "utc"),
            (ResourceType::DLG, 2029, "dlg"),
            (ResourceType::HAK, 2061, "hak"),
            (ResourceType::IDS, 9996, "ids"),
            (ResourceType::ERF, 9997, "erf"),
            (ResourceType::BIF, 9998, "bif"),
            (ResourceType::KEY, 9999, "key"),
        ];
        for (res_type, code, extension) in cases {
            assert_eq!(res_type.code(), code, "{}", extension);
            assert_eq!(ResourceType::from_code(code).extension(), extension);
            assert_eq!(ResourceType::from_extension(extension), res_type);
        }
        assert!(ResourceType::from_code(9997).is_container());
    }

    #[test]
    fn test_containers() {
        assert!(ResourceType::ERF.is_container());
        assert!(ResourceType::MOD.is_container());
        assert!(ResourceType::HAK.is_container());
        assert!(!ResourceType::TXT.is_container());
        assert!(!ResourceType::INVALID.is_container());
    }

    #[test]
    fn test_key_validity() {
        assert!(is_valid_key("abc_09", 16));
        assert!(!is_valid_key("abc/def", 16));
        assert!(!is_valid_key("", 16));
        assert!(!is_valid_key(&"a".repeat(33), 16));
        assert!(!is_valid_key(&"a".repeat(17), 16));
        assert!(is_valid_key(&"a".repeat(32), 32));
    }

    #[test]
    fn test_filename_round_trip() {
        let name = key_and_type_to_filename("area01", ResourceType::ARE);
        assert_eq!(name, "area01.are");

        let (key, res_type) = filename_to_key_and_type("some/dir/area01.are").unwrap();
        assert_eq!(key, "area01");
        assert_eq!(res_type, ResourceType::ARE);

        assert!(filename_to_key_and_type("noext").is_err());
        assert!(filename_to_key_and_type("bad-key.txt").is_err());
        assert!(filename_to_key_and_type("x.unknown").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ResourceType::HAK.to_string(), "hak");
        assert_eq!(ResourceType::INVALID.to_string(), "unknown(0xffff)");
    }
}
