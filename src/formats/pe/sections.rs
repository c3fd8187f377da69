//! Section management for PE files

use crate::formats::pe::types::*;
use crate::formats::pe::utils::u32_at;
use crate::formats::slice_or_empty;

/// Parse `count` section headers starting at `offset`
pub fn parse_section_headers(data: &[u8], offset: usize, count: u16) -> Result<Vec<SectionHeader>> {
    let end = offset + count as usize * SECTION_HEADER_SIZE;
    if end > data.len() {
        return Err(PeError::TruncatedHeader {
            expected: end,
            actual: data.len(),
        });
    }

    (0..count as usize)
        .map(|i| {
            let base = offset + i * SECTION_HEADER_SIZE;
            let mut name = [0u8; 8];
            name.copy_from_slice(&data[base..base + 8]);
            Ok(SectionHeader {
                name,
                virtual_size: u32_at(data, base + 8)?,
                virtual_address: u32_at(data, base + 12)?,
                size_of_raw_data: u32_at(data, base + 16)?,
                pointer_to_raw_data: u32_at(data, base + 20)?,
                characteristics: u32_at(data, base + 36)?,
            })
        })
        .collect()
}

/// Section table in file order, with RVA resolution
#[derive(Debug, Clone)]
pub struct SectionTable {
    headers: Vec<SectionHeader>,
}

impl SectionTable {
    pub fn new(headers: Vec<SectionHeader>) -> Self {
        Self { headers }
    }

    /// Get all section headers
    pub fn headers(&self) -> &[SectionHeader] {
        &self.headers
    }

    /// Find section by name
    pub fn section_by_name(&self, name: &str) -> Option<&SectionHeader> {
        self.headers.iter().find(|s| s.name() == name)
    }

    /// Find section containing RVA
    pub fn section_containing_rva(&self, rva: u32) -> Option<&SectionHeader> {
        self.headers.iter().find(|s| s.contains_rva(rva))
    }

    /// Convert RVA to file offset
    pub fn rva_to_offset(&self, rva: u32) -> Option<usize> {
        let section = self.section_containing_rva(rva)?;
        let delta = rva - section.virtual_address;
        usize::try_from(section.pointer_to_raw_data as u64 + delta as u64).ok()
    }

    /// Raw file contents of a section, clamped to the image
    pub fn section_data<'a>(&self, data: &'a [u8], section: &SectionHeader) -> &'a [u8] {
        slice_or_empty(
            data,
            section.pointer_to_raw_data as u64,
            section.size_of_raw_data as u64,
        )
    }
}
