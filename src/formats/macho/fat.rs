//! Universal (fat) binary decoding and architecture selection

use crate::formats::macho::types::*;
use crate::formats::macho::MachOParser;

const FAT_HEADER_SIZE: usize = 8;
const FAT_ARCH_SIZE: usize = 20;

// CPU types
pub const CPU_ARCH_ABI64: u32 = 0x0100_0000;
pub const CPU_TYPE_X86: u32 = 7;
pub const CPU_TYPE_X86_64: u32 = CPU_TYPE_X86 | CPU_ARCH_ABI64;
pub const CPU_TYPE_ARM: u32 = 12;
pub const CPU_TYPE_ARM64: u32 = CPU_TYPE_ARM | CPU_ARCH_ABI64;
pub const CPU_TYPE_POWERPC: u32 = 18;
pub const CPU_TYPE_POWERPC64: u32 = CPU_TYPE_POWERPC | CPU_ARCH_ABI64;

/// CPU type of a fat architecture entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuType {
    X86,
    X86_64,
    Arm,
    Arm64,
    PowerPc,
    PowerPc64,
    Other(u32),
}

impl CpuType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            CPU_TYPE_X86 => Self::X86,
            CPU_TYPE_X86_64 => Self::X86_64,
            CPU_TYPE_ARM => Self::Arm,
            CPU_TYPE_ARM64 => Self::Arm64,
            CPU_TYPE_POWERPC => Self::PowerPc,
            CPU_TYPE_POWERPC64 => Self::PowerPc64,
            other => Self::Other(other),
        }
    }

    /// Name this CPU type carries in `std::env::consts::ARCH`
    pub fn host_arch_name(&self) -> Option<&'static str> {
        match self {
            Self::X86 => Some("x86"),
            Self::X86_64 => Some("x86_64"),
            Self::Arm => Some("arm"),
            Self::Arm64 => Some("aarch64"),
            Self::PowerPc => Some("powerpc"),
            Self::PowerPc64 => Some("powerpc64"),
            Self::Other(_) => None,
        }
    }
}

/// One architecture slice of a universal binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatArch {
    pub cputype: CpuType,
    pub cpusubtype: u32,
    pub offset: u32,
    pub size: u32,
    pub align: u32,
}

impl FatArch {
    /// Bytes of the thin image; bounds were checked when the table was parsed
    pub fn slice<'data>(&self, data: &'data [u8]) -> &'data [u8] {
        crate::formats::slice_or_empty(data, self.offset as u64, self.size as u64)
    }
}

/// Parsed universal binary: the architecture table plus every decoded slice
#[derive(Debug, Clone)]
pub struct FatBinary<'data> {
    data: &'data [u8],
    arches: Vec<FatArch>,
    slices: Vec<MachOParser<'data>>,
}

impl<'data> FatBinary<'data> {
    /// Parse the big-endian fat header, every architecture entry and every
    /// thin image it points at.
    ///
    /// Each slice must decode, no two entries may share a cpu/subcpu pair and
    /// every slice must carry the file type of the first one.
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let magic = Endian::Big.u32_at(data, 0)?;
        if magic != FAT_MAGIC {
            return Err(MachOError::InvalidMagic(magic));
        }
        let nfat_arch = Endian::Big.u32_at(data, 4)?;

        let table_end = (nfat_arch as usize)
            .checked_mul(FAT_ARCH_SIZE)
            .and_then(|len| len.checked_add(FAT_HEADER_SIZE))
            .unwrap_or(usize::MAX);
        if table_end > data.len() {
            return Err(MachOError::TooShort {
                needed: table_end,
                actual: data.len(),
            });
        }

        let mut arches: Vec<FatArch> = Vec::with_capacity(nfat_arch as usize);
        let mut slices: Vec<MachOParser<'data>> = Vec::with_capacity(nfat_arch as usize);
        for index in 0..nfat_arch {
            let base = FAT_HEADER_SIZE + index as usize * FAT_ARCH_SIZE;
            let cputype = Endian::Big.u32_at(data, base)?;
            let arch = FatArch {
                cputype: CpuType::from_u32(cputype),
                cpusubtype: Endian::Big.u32_at(data, base + 4)?,
                offset: Endian::Big.u32_at(data, base + 8)?,
                size: Endian::Big.u32_at(data, base + 12)?,
                align: Endian::Big.u32_at(data, base + 16)?,
            };
            if arch.offset as u64 + arch.size as u64 > data.len() as u64 {
                return Err(MachOError::InvalidFatArch { index });
            }

            if arches
                .iter()
                .any(|seen| seen.cputype == arch.cputype && seen.cpusubtype == arch.cpusubtype)
            {
                return Err(MachOError::DuplicateFatArch {
                    index,
                    cputype,
                    cpusubtype: arch.cpusubtype,
                });
            }

            let slice =
                MachOParser::parse(arch.slice(data)).map_err(|e| MachOError::InvalidFatSlice {
                    index,
                    source: Box::new(e),
                })?;
            if let Some(first) = slices.first() {
                let expected = first.header().filetype;
                let filetype = slice.header().filetype;
                if filetype != expected {
                    return Err(MachOError::FatFileTypeMismatch {
                        index,
                        filetype,
                        expected,
                    });
                }
            }

            arches.push(arch);
            slices.push(slice);
        }

        Ok(Self {
            data,
            arches,
            slices,
        })
    }

    pub fn arches(&self) -> &[FatArch] {
        &self.arches
    }

    /// Decoded thin images, in table order
    pub fn slices(&self) -> &[MachOParser<'data>] {
        &self.slices
    }

    /// Pick the architecture entry to analyze for `host_arch`.
    ///
    /// Entries for one CPU type may differ only in subtype (arm64 and arm64e,
    /// say); the last entry matching the host wins. With no match the first
    /// entry is used. Returns `None` only for an empty table.
    pub fn select_arch(&self, host_arch: &str) -> Option<&FatArch> {
        self.select_index(host_arch).and_then(|i| self.arches.get(i))
    }

    /// Decoded slice chosen by [`FatBinary::select_arch`]
    pub fn select_slice(&self, host_arch: &str) -> Option<&MachOParser<'data>> {
        self.select_index(host_arch).and_then(|i| self.slices.get(i))
    }

    fn select_index(&self, host_arch: &str) -> Option<usize> {
        self.arches
            .iter()
            .rposition(|arch| arch.cputype.host_arch_name() == Some(host_arch))
            .or_else(|| (!self.arches.is_empty()).then_some(0))
    }

    /// Thin image bytes of an architecture entry
    pub fn image(&self, arch: &FatArch) -> &'data [u8] {
        arch.slice(self.data)
    }
}
