//! Section table management

use crate::formats::elf::types::*;
use crate::formats::elf::utils::{read_addr, read_cstring, EndianRead};
use crate::formats::slice_or_empty;

/// Section headers in file order together with the section name string table
pub struct SectionTable<'a> {
    headers: Vec<SectionHeader>,
    strings: &'a [u8],
    data: &'a [u8],
}

impl<'a> SectionTable<'a> {
    /// Parse section table from ELF data
    pub fn parse(data: &'a [u8], header: &ElfHeader) -> Result<Self> {
        let sh_num = header.shnum;
        if sh_num == 0 {
            return Ok(Self {
                headers: Vec::new(),
                strings: &[],
                data,
            });
        }

        let class = header.ident.class;
        let entsize = class.section_header_size();
        let sh_offset =
            usize::try_from(header.e_shoff).map_err(|_| ElfError::InvalidOffset {
                offset: usize::MAX,
            })?;
        let total_size = sh_num.checked_mul(entsize).unwrap_or(usize::MAX);
        if sh_offset
            .checked_add(total_size)
            .map_or(true, |end| end > data.len())
        {
            return Err(ElfError::Truncated {
                offset: sh_offset,
                needed: total_size,
            });
        }

        let headers = (0..sh_num)
            .map(|i| parse_section_header(data, sh_offset + i * entsize, class, header.ident.data))
            .collect::<Result<Vec<_>>>()?;

        let shstrtab = headers
            .get(header.shstrndx as usize)
            .ok_or(ElfError::InvalidSectionIndex(header.shstrndx))?;
        let strings = file_bytes(data, shstrtab);

        Ok(Self {
            headers,
            strings,
            data,
        })
    }

    /// Get section by name
    pub fn by_name(&self, name: &str) -> Option<Section<'a>> {
        self.sections().find(|s| s.name == name)
    }

    /// Get section by index
    pub fn by_index(&self, index: usize) -> Option<Section<'a>> {
        self.headers.get(index).map(|header| Section {
            header: *header,
            name: read_cstring(self.strings, header.sh_name as usize).unwrap_or(""),
            data: file_bytes(self.data, header),
        })
    }

    /// First section of the given type
    pub fn by_type(&self, sh_type: u32) -> Option<Section<'a>> {
        let index = self.headers.iter().position(|h| h.sh_type == sh_type)?;
        self.by_index(index)
    }

    /// Get all sections
    pub fn sections(&self) -> impl Iterator<Item = Section<'a>> + '_ {
        (0..self.headers.len()).filter_map(move |i| self.by_index(i))
    }

    /// Count sections
    pub fn count(&self) -> usize {
        self.headers.len()
    }
}

/// File contents of a section; empty for NOBITS or out-of-range extents
fn file_bytes<'a>(data: &'a [u8], header: &SectionHeader) -> &'a [u8] {
    if header.is_nobits() {
        return &[];
    }
    slice_or_empty(data, header.sh_offset, header.sh_size)
}

/// Parse a single section header
pub(crate) fn parse_section_header(
    data: &[u8],
    offset: usize,
    class: ElfClass,
    endian: ElfData,
) -> Result<SectionHeader> {
    // Word-sized fields start at +8 and advance by the address width
    let word = match class {
        ElfClass::Elf32 => 4,
        ElfClass::Elf64 => 8,
    };
    let flags_at = offset + 8;
    let addr_at = flags_at + word;
    let offset_at = addr_at + word;
    let size_at = offset_at + word;
    let link_at = size_at + word;
    let entsize_at = link_at + 8 + word;

    Ok(SectionHeader {
        sh_name: data.read_u32(offset, endian)?,
        sh_type: data.read_u32(offset + 4, endian)?,
        sh_flags: read_addr(data, flags_at, class, endian)?,
        sh_addr: read_addr(data, addr_at, class, endian)?,
        sh_offset: read_addr(data, offset_at, class, endian)?,
        sh_size: read_addr(data, size_at, class, endian)?,
        sh_link: data.read_u32(link_at, endian)?,
        sh_entsize: read_addr(data, entsize_at, class, endian)?,
    })
}
