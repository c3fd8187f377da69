//! ELF data types and constants

use std::fmt;

/// ELF parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElfError {
    InvalidMagic,
    UnsupportedClass(u8),
    UnsupportedData(u8),
    UnsupportedVersion(u8),
    InvalidOffset { offset: usize },
    Truncated { offset: usize, needed: usize },
    InvalidSectionIndex(u32),
    MalformedHeader(String),
    InvalidString,
}

impl fmt::Display for ElfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMagic => write!(f, "Invalid ELF magic"),
            Self::UnsupportedClass(c) => write!(f, "Unsupported ELF class: {}", c),
            Self::UnsupportedData(d) => write!(f, "Unsupported ELF data encoding: {}", d),
            Self::UnsupportedVersion(v) => write!(f, "Unsupported ELF version: {}", v),
            Self::InvalidOffset { offset } => write!(f, "Invalid offset: {:#x}", offset),
            Self::Truncated { offset, needed } => {
                write!(f, "Truncated at {:#x}, needed {} bytes", offset, needed)
            }
            Self::InvalidSectionIndex(idx) => write!(f, "Invalid section index: {}", idx),
            Self::MalformedHeader(msg) => write!(f, "Malformed header: {}", msg),
            Self::InvalidString => write!(f, "String not UTF-8"),
        }
    }
}

impl std::error::Error for ElfError {}

pub type Result<T> = std::result::Result<T, ElfError>;

/// ELF magic number
pub const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// Current ELF version
pub const EV_CURRENT: u8 = 1;

/// ELF class (32-bit or 64-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfClass {
    Elf32 = 1,
    Elf64 = 2,
}

impl ElfClass {
    pub fn from_u8(val: u8) -> Result<Self> {
        match val {
            1 => Ok(ElfClass::Elf32),
            2 => Ok(ElfClass::Elf64),
            _ => Err(ElfError::UnsupportedClass(val)),
        }
    }

    /// Size of the file header
    pub fn header_size(&self) -> usize {
        match self {
            ElfClass::Elf32 => 52,
            ElfClass::Elf64 => 64,
        }
    }

    /// Size of one section header
    pub fn section_header_size(&self) -> usize {
        match self {
            ElfClass::Elf32 => 40,
            ElfClass::Elf64 => 64,
        }
    }

    /// Size of one symbol table entry
    pub fn symbol_size(&self) -> usize {
        match self {
            ElfClass::Elf32 => 16,
            ElfClass::Elf64 => 24,
        }
    }

    /// Size of one dynamic entry
    pub fn dynamic_entry_size(&self) -> usize {
        match self {
            ElfClass::Elf32 => 8,
            ElfClass::Elf64 => 16,
        }
    }
}

/// ELF data encoding (endianness)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfData {
    Little = 1,
    Big = 2,
}

impl ElfData {
    pub fn from_u8(val: u8) -> Result<Self> {
        match val {
            1 => Ok(ElfData::Little),
            2 => Ok(ElfData::Big),
            _ => Err(ElfError::UnsupportedData(val)),
        }
    }
}

/// ELF identification (first 16 bytes)
#[derive(Debug, Clone, Copy)]
pub struct ElfIdent {
    pub class: ElfClass,
    pub data: ElfData,
    pub version: u8,
    pub osabi: u8,
}

/// ELF header
#[derive(Debug, Clone, Copy)]
pub struct ElfHeader {
    pub ident: ElfIdent,
    pub e_type: u16,
    pub e_machine: u16,
    pub e_shoff: u64,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
    /// Section count after resolving extended numbering
    pub shnum: usize,
    /// Section name string table index after resolving extended numbering
    pub shstrndx: u32,
}

/// Section header
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionHeader {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_entsize: u64,
}

impl SectionHeader {
    /// True when the section occupies no bytes in the file
    pub fn is_nobits(&self) -> bool {
        self.sh_type == SHT_NOBITS
    }
}

/// Section types
pub const SHT_NULL: u32 = 0;
pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_DYNAMIC: u32 = 6;
pub const SHT_NOBITS: u32 = 8;

/// Special section indices
pub const SHN_UNDEF: u16 = 0;
pub const SHN_LORESERVE: u16 = 0xff00;
pub const SHN_XINDEX: u16 = 0xffff;

/// Section with resolved name and file contents
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    pub header: SectionHeader,
    pub name: &'a str,
    pub data: &'a [u8],
}

/// Symbol entry
#[derive(Debug, Clone, Copy)]
pub struct Symbol {
    pub st_name: u32,
    pub st_value: u64,
    pub st_size: u64,
    pub st_info: u8,
    pub st_shndx: u16,
}

impl Symbol {
    pub fn is_undefined(&self) -> bool {
        self.st_shndx == SHN_UNDEF
    }
}

/// Dynamic entry
#[derive(Debug, Clone, Copy)]
pub struct DynamicEntry {
    pub d_tag: i64,
    pub d_val: u64,
}

/// Dynamic tags
pub const DT_NULL: i64 = 0;
pub const DT_NEEDED: i64 = 1;
