//! Mach-O data types and constants

use std::fmt;

// Thin magic numbers, read big-endian from the first four bytes
pub const MH_MAGIC: u32 = 0xfeedface;
pub const MH_CIGAM: u32 = 0xcefaedfe; // swapped
pub const MH_MAGIC_64: u32 = 0xfeedfacf;
pub const MH_CIGAM_64: u32 = 0xcffaedfe; // swapped

// Universal magic numbers
pub const FAT_MAGIC: u32 = 0xcafebabe;
/// Second universal magic recognized when sniffing; the fat decoder rejects it
pub const FAT_MAGIC_ALT: u32 = 0xcaaebabe;

// Load commands
pub const LC_REQ_DYLD: u32 = 0x8000_0000;
pub const LC_SEGMENT: u32 = 0x1;
pub const LC_LOAD_DYLIB: u32 = 0xc;
pub const LC_LOAD_WEAK_DYLIB: u32 = 0x18 | LC_REQ_DYLD;
pub const LC_SEGMENT_64: u32 = 0x19;

/// Section types without file contents
pub const SECTION_TYPE: u32 = 0xff;
pub const S_ZEROFILL: u32 = 0x1;
pub const S_GB_ZEROFILL: u32 = 0xc;
pub const S_THREAD_LOCAL_ZEROFILL: u32 = 0x12;

/// Mach-O parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachOError {
    TooShort { needed: usize, actual: usize },
    InvalidMagic(u32),
    InvalidLoadCommand { offset: usize, cmdsize: u32 },
    TruncatedCommand { cmd: u32, offset: usize },
    InvalidDylibName { offset: usize },
    InvalidFatArch { index: u32 },
    DuplicateFatArch { index: u32, cputype: u32, cpusubtype: u32 },
    FatFileTypeMismatch { index: u32, filetype: u32, expected: u32 },
    InvalidFatSlice { index: u32, source: Box<MachOError> },
}

impl fmt::Display for MachOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { needed, actual } => {
                write!(f, "Data too short: need {} bytes, have {}", needed, actual)
            }
            Self::InvalidMagic(m) => write!(f, "Invalid magic number: 0x{:08x}", m),
            Self::InvalidLoadCommand { offset, cmdsize } => write!(
                f,
                "Invalid load command at 0x{:x}: cmdsize {}",
                offset, cmdsize
            ),
            Self::TruncatedCommand { cmd, offset } => {
                write!(f, "Truncated load command 0x{:x} at 0x{:x}", cmd, offset)
            }
            Self::InvalidDylibName { offset } => {
                write!(f, "Invalid dylib name in command at 0x{:x}", offset)
            }
            Self::InvalidFatArch { index } => {
                write!(f, "Fat architecture {} lies outside the file", index)
            }
            Self::DuplicateFatArch {
                index,
                cputype,
                cpusubtype,
            } => write!(
                f,
                "Fat architecture {} duplicates cpu 0x{:x} subcpu 0x{:x}",
                index, cputype, cpusubtype
            ),
            Self::FatFileTypeMismatch {
                index,
                filetype,
                expected,
            } => write!(
                f,
                "Fat architecture {} has file type {}, expected {}",
                index, filetype, expected
            ),
            Self::InvalidFatSlice { index, source } => {
                write!(f, "Fat architecture {}: {}", index, source)
            }
        }
    }
}

impl std::error::Error for MachOError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidFatSlice { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MachOError>;

/// Byte order of a thin image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    pub fn u32_at(self, data: &[u8], offset: usize) -> Result<u32> {
        let bytes = take::<4>(data, offset)?;
        Ok(match self {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        })
    }

    pub fn u64_at(self, data: &[u8], offset: usize) -> Result<u64> {
        let bytes = take::<8>(data, offset)?;
        Ok(match self {
            Endian::Little => u64::from_le_bytes(bytes),
            Endian::Big => u64::from_be_bytes(bytes),
        })
    }
}

fn take<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    offset
        .checked_add(N)
        .and_then(|end| data.get(offset..end))
        .and_then(|b| b.try_into().ok())
        .ok_or(MachOError::TooShort {
            needed: offset.saturating_add(N),
            actual: data.len(),
        })
}

/// Mach-O header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachHeader {
    pub magic: u32,
    pub cputype: u32,
    pub cpusubtype: u32,
    pub filetype: u32,
    pub ncmds: u32,
    pub sizeofcmds: u32,
    pub flags: u32,
}

impl MachHeader {
    pub fn is_64bit(&self) -> bool {
        matches!(self.magic, MH_MAGIC_64 | MH_CIGAM_64)
    }

    pub fn endian(&self) -> Endian {
        match self.magic {
            MH_CIGAM | MH_CIGAM_64 => Endian::Little,
            _ => Endian::Big,
        }
    }

    /// Header size; load commands start right after
    pub fn size(&self) -> usize {
        if self.is_64bit() {
            32
        } else {
            28
        }
    }
}

/// Section from a segment command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachSection {
    pub sectname: String,
    pub segname: String,
    pub addr: u64,
    pub size: u64,
    pub offset: u32,
    pub flags: u32,
}

impl MachSection {
    /// True for sections that occupy no file space
    pub fn is_zerofill(&self) -> bool {
        matches!(
            self.flags & SECTION_TYPE,
            S_ZEROFILL | S_GB_ZEROFILL | S_THREAD_LOCAL_ZEROFILL
        )
    }
}

/// Segment with its sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub segname: String,
    pub fileoff: u64,
    pub filesize: u64,
    pub sections: Vec<MachSection>,
}

/// Decoded load command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadCommand {
    Segment(Segment),
    /// LC_LOAD_DYLIB; weak, lazy and re-exported loads stay `Other`
    Dylib { name: String },
    Other { cmd: u32, cmdsize: u32 },
}
