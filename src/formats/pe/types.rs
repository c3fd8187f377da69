//! Core PE data types and structures

use std::fmt;

// PE constants
pub const DOS_SIGNATURE: u16 = 0x5A4D; // MZ
pub const PE_SIGNATURE: [u8; 4] = *b"PE\0\0";
pub const PE32_MAGIC: u16 = 0x10B;
pub const PE32PLUS_MAGIC: u16 = 0x20B;

/// Size of the COFF file header following the signature
pub const COFF_HEADER_SIZE: usize = 20;
/// Size of one section table entry
pub const SECTION_HEADER_SIZE: usize = 40;
/// Size of one import descriptor
pub const IMPORT_DESCRIPTOR_SIZE: usize = 20;

// Data directory indices
pub const IMAGE_DIRECTORY_ENTRY_IMPORT: usize = 1;
pub const IMAGE_DIRECTORY_ENTRY_COM_DESCRIPTOR: usize = 14;
pub const IMAGE_NUMBEROF_DIRECTORY_ENTRIES: usize = 16;

/// PE parsing error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeError {
    InvalidDosSignature,
    InvalidPeSignature,
    InvalidMagic(u16),
    TruncatedHeader { expected: usize, actual: usize },
    InvalidRva { rva: u32 },
    InvalidOffset { offset: usize },
    InvalidString,
}

impl fmt::Display for PeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDosSignature => write!(f, "Invalid DOS signature"),
            Self::InvalidPeSignature => write!(f, "Invalid PE signature"),
            Self::InvalidMagic(m) => write!(f, "Invalid optional header magic: 0x{:04x}", m),
            Self::TruncatedHeader { expected, actual } => {
                write!(
                    f,
                    "Truncated header: expected {} bytes, got {}",
                    expected, actual
                )
            }
            Self::InvalidRva { rva } => write!(f, "Invalid RVA: 0x{:08x}", rva),
            Self::InvalidOffset { offset } => write!(f, "Invalid file offset: 0x{:x}", offset),
            Self::InvalidString => write!(f, "Invalid string encoding"),
        }
    }
}

impl std::error::Error for PeError {}

pub type Result<T> = std::result::Result<T, PeError>;

/// Machine types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    Unknown,
    I386,   // 0x014c
    X86_64, // 0x8664
    Arm,    // 0x01c0
    Arm64,  // 0xaa64
    Other(u16),
}

impl From<u16> for Machine {
    fn from(value: u16) -> Self {
        match value {
            0x014c => Self::I386,
            0x8664 => Self::X86_64,
            0x01c0 => Self::Arm,
            0xaa64 => Self::Arm64,
            0 => Self::Unknown,
            other => Self::Other(other),
        }
    }
}

/// DOS header fields the loader actually needs
#[derive(Debug, Clone, Copy)]
pub struct DosHeader {
    pub e_magic: u16,  // Magic number (MZ)
    pub e_lfanew: u32, // File address of PE header
}

/// COFF header (20 bytes)
#[derive(Debug, Clone, Copy)]
pub struct CoffHeader {
    pub machine: Machine,
    pub number_of_sections: u16,
    pub time_date_stamp: u32,
    pub size_of_optional_header: u16,
    pub characteristics: u16,
}

/// Data directory entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataDirectory {
    pub virtual_address: u32,
    pub size: u32,
}

/// Optional header, reduced to the fields shared by PE32 and PE32+
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionalHeader {
    Pe32 {
        address_of_entry_point: u32,
        image_base: u32,
        number_of_rva_and_sizes: u32,
    },
    Pe32Plus {
        address_of_entry_point: u32,
        image_base: u64,
        number_of_rva_and_sizes: u32,
    },
}

impl OptionalHeader {
    pub fn magic(&self) -> u16 {
        match self {
            Self::Pe32 { .. } => PE32_MAGIC,
            Self::Pe32Plus { .. } => PE32PLUS_MAGIC,
        }
    }

    pub fn entry_point(&self) -> u32 {
        match *self {
            Self::Pe32 {
                address_of_entry_point,
                ..
            }
            | Self::Pe32Plus {
                address_of_entry_point,
                ..
            } => address_of_entry_point,
        }
    }

    pub fn image_base(&self) -> u64 {
        match *self {
            Self::Pe32 { image_base, .. } => image_base as u64,
            Self::Pe32Plus { image_base, .. } => image_base,
        }
    }

    pub fn number_of_rva_and_sizes(&self) -> u32 {
        match *self {
            Self::Pe32 {
                number_of_rva_and_sizes,
                ..
            }
            | Self::Pe32Plus {
                number_of_rva_and_sizes,
                ..
            } => number_of_rva_and_sizes,
        }
    }

    /// Offset of the data directory array from the start of the optional header
    pub fn data_directory_offset(&self) -> usize {
        match self {
            Self::Pe32 { .. } => 96,
            Self::Pe32Plus { .. } => 112,
        }
    }

    pub fn is_64bit(&self) -> bool {
        matches!(self, Self::Pe32Plus { .. })
    }
}

/// NT headers (PE signature + COFF + Optional)
#[derive(Debug, Clone)]
pub struct NtHeaders {
    pub file_header: CoffHeader,
    pub optional_header: OptionalHeader,
}

/// Section header
#[derive(Debug, Clone)]
pub struct SectionHeader {
    pub name: [u8; 8],
    pub virtual_size: u32,
    pub virtual_address: u32,
    pub size_of_raw_data: u32,
    pub pointer_to_raw_data: u32,
    pub characteristics: u32,
}

impl SectionHeader {
    pub fn name(&self) -> String {
        crate::formats::fixed_name(&self.name)
    }

    pub fn contains_rva(&self, rva: u32) -> bool {
        let size = self.virtual_size.max(self.size_of_raw_data);
        rva >= self.virtual_address && (rva as u64) < self.virtual_address as u64 + size as u64
    }
}

/// One by-name or by-ordinal import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry<'a> {
    pub name: Option<&'a str>,
    pub ordinal: Option<u16>,
    pub hint: Option<u16>,
}

/// Import descriptor with its resolved entries
#[derive(Debug, Clone)]
pub struct ImportDescriptor<'a> {
    pub dll_name: &'a str,
    pub entries: Vec<ImportEntry<'a>>,
}
