//! Dynamic section parsing

use crate::formats::elf::types::*;
use crate::formats::elf::utils::{read_addr, read_cstring, EndianRead};

/// Dynamic section entries up to the first DT_NULL
pub struct DynamicSection<'a> {
    entries: Vec<DynamicEntry>,
    strings: &'a [u8],
}

impl<'a> DynamicSection<'a> {
    /// Parse dynamic entries; `strings` is the section linked via `sh_link`
    pub fn parse(
        dynamic_section: &Section<'a>,
        strings: &'a [u8],
        class: ElfClass,
        endian: ElfData,
    ) -> Result<Self> {
        if dynamic_section.header.sh_type != SHT_DYNAMIC {
            return Err(ElfError::MalformedHeader(
                "Not a dynamic section".to_string(),
            ));
        }

        let entry_size = class.dynamic_entry_size();
        let data = dynamic_section.data;
        let mut entries = Vec::new();
        let mut offset = 0;

        while offset + entry_size <= data.len() {
            let d_tag = match class {
                ElfClass::Elf32 => data.read_u32(offset, endian)? as i32 as i64,
                ElfClass::Elf64 => data.read_u64(offset, endian)? as i64,
            };
            let d_val = read_addr(data, offset + entry_size / 2, class, endian)?;

            if d_tag == DT_NULL {
                break;
            }

            entries.push(DynamicEntry { d_tag, d_val });
            offset += entry_size;
        }

        Ok(Self { entries, strings })
    }

    /// All entries in section order
    pub fn entries(&self) -> &[DynamicEntry] {
        &self.entries
    }

    /// Get needed libraries (DT_NEEDED)
    pub fn needed_libraries(&self) -> Vec<&'a str> {
        self.entries
            .iter()
            .filter(|e| e.d_tag == DT_NEEDED)
            .filter_map(|e| {
                let offset = usize::try_from(e.d_val).ok()?;
                read_cstring(self.strings, offset).ok()
            })
            .collect()
    }
}
