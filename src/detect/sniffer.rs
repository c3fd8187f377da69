//! Container format sniffing from the first eight bytes.

use tracing::debug;

use crate::core::ContainerFormat;
use crate::formats::macho::{
    FAT_MAGIC, FAT_MAGIC_ALT, MH_CIGAM, MH_CIGAM_64, MH_MAGIC, MH_MAGIC_64,
};
use crate::io::HEADER_SIZE;

const JAVA_CLASS_MAGIC: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

/// Container format and a human-readable platform description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub format: ContainerFormat,
    pub platform: String,
}

impl Classification {
    fn new(format: ContainerFormat, platform: impl Into<String>) -> Self {
        Self {
            format,
            platform: platform.into(),
        }
    }
}

/// Classify a header prefix by its magic numbers.
///
/// Universal Mach-O is checked before the Java class magic, which shares
/// the same four bytes; class files therefore classify as
/// `Mach-O-Universal`.
pub fn sniff(header: &[u8; HEADER_SIZE]) -> Classification {
    let word = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let next = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);

    let classification = match word {
        FAT_MAGIC | FAT_MAGIC_ALT => Classification::new(
            ContainerFormat::MachOUniversal,
            format!("macOS ({} architectures)", next),
        ),
        MH_MAGIC => Classification::new(ContainerFormat::MachO, "macOS (32-bit)"),
        MH_MAGIC_64 => Classification::new(ContainerFormat::MachO, "macOS (64-bit)"),
        MH_CIGAM => Classification::new(ContainerFormat::MachO, "macOS (32-bit swapped)"),
        MH_CIGAM_64 => Classification::new(ContainerFormat::MachO, "macOS (64-bit swapped)"),
        _ if header.starts_with(b"MZ") => Classification::new(ContainerFormat::Pe, "Windows"),
        _ if header.starts_with(b"\x7fELF") => {
            Classification::new(ContainerFormat::Elf, "Unix/Linux")
        }
        _ if header.starts_with(&JAVA_CLASS_MAGIC) => {
            Classification::new(ContainerFormat::JavaClass, "JVM")
        }
        _ => Classification::new(ContainerFormat::Unknown, "Unknown"),
    };

    debug!(
        format = %classification.format,
        platform = %classification.platform,
        "sniffed container format"
    );
    classification
}
