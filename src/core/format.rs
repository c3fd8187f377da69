//! Container formats recognized by the sniffer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The outer binary envelope, independent of source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContainerFormat {
    /// Portable Executable (Windows)
    #[serde(rename = "PE")]
    Pe,
    /// Executable and Linkable Format (Linux, Unix)
    #[serde(rename = "ELF")]
    Elf,
    /// Thin Mach-O image (macOS, iOS)
    #[serde(rename = "Mach-O")]
    MachO,
    /// Universal ("fat") Mach-O wrapping one image per architecture
    #[serde(rename = "Mach-O-Universal")]
    MachOUniversal,
    /// JVM class file
    #[serde(rename = "Java-Class")]
    JavaClass,
    /// Unknown or unsupported format
    #[default]
    Unknown,
}

impl ContainerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerFormat::Pe => "PE",
            ContainerFormat::Elf => "ELF",
            ContainerFormat::MachO => "Mach-O",
            ContainerFormat::MachOUniversal => "Mach-O-Universal",
            ContainerFormat::JavaClass => "Java-Class",
            ContainerFormat::Unknown => "Unknown",
        }
    }

    /// True for the formats a structural analyzer exists for.
    pub fn is_analyzable(&self) -> bool {
        matches!(
            self,
            ContainerFormat::Pe
                | ContainerFormat::Elf
                | ContainerFormat::MachO
                | ContainerFormat::MachOUniversal
        )
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
