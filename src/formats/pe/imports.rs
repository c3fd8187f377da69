//! Import table parsing

use crate::formats::pe::sections::SectionTable;
use crate::formats::pe::types::*;
use crate::formats::pe::utils::{read_cstring, u16_at, u32_at, u64_at};

/// Upper bound on import descriptors walked before giving up on a terminator
pub const MAX_DESCRIPTORS: usize = 4096;
/// Upper bound on thunks decoded across the whole table
pub const MAX_IMPORTS: usize = 65536;

/// Parse the import directory into descriptors with their entries
pub fn parse_imports<'a>(
    data: &'a [u8],
    sections: &SectionTable,
    import_dir: &DataDirectory,
    is_64bit: bool,
) -> Result<Vec<ImportDescriptor<'a>>> {
    let mut descriptors = Vec::new();
    if import_dir.virtual_address == 0 {
        return Ok(descriptors);
    }

    let mut offset = sections
        .rva_to_offset(import_dir.virtual_address)
        .ok_or(PeError::InvalidRva {
            rva: import_dir.virtual_address,
        })?;

    let mut total_imports = 0;

    while descriptors.len() < MAX_DESCRIPTORS && total_imports < MAX_IMPORTS {
        let Some(desc_data) = data.get(offset..offset + IMPORT_DESCRIPTOR_SIZE) else {
            break;
        };

        // Check for terminator (all zeros)
        if desc_data.iter().all(|&b| b == 0) {
            break;
        }

        let original_first_thunk = u32_at(data, offset)?;
        let name_rva = u32_at(data, offset + 12)?;
        let first_thunk = u32_at(data, offset + 16)?;
        offset += IMPORT_DESCRIPTOR_SIZE;

        // Skip invalid entries
        if name_rva == 0 {
            continue;
        }

        let name_offset = sections
            .rva_to_offset(name_rva)
            .ok_or(PeError::InvalidRva { rva: name_rva })?;
        let dll_name = read_cstring(data, name_offset, 256)?;

        // Use original first thunk if available, otherwise first thunk
        let thunk_rva = if original_first_thunk != 0 {
            original_first_thunk
        } else {
            first_thunk
        };

        let entries = parse_thunks(
            data,
            sections,
            thunk_rva,
            is_64bit,
            MAX_IMPORTS - total_imports,
        )?;
        total_imports += entries.len();

        descriptors.push(ImportDescriptor { dll_name, entries });
    }

    Ok(descriptors)
}

fn parse_thunks<'a>(
    data: &'a [u8],
    sections: &SectionTable,
    thunk_rva: u32,
    is_64bit: bool,
    max_count: usize,
) -> Result<Vec<ImportEntry<'a>>> {
    let mut entries = Vec::new();
    if thunk_rva == 0 {
        return Ok(entries);
    }

    let mut thunk_offset = sections
        .rva_to_offset(thunk_rva)
        .ok_or(PeError::InvalidRva { rva: thunk_rva })?;

    let entry_size = if is_64bit { 8 } else { 4 };

    while entries.len() < max_count {
        if thunk_offset + entry_size > data.len() {
            break;
        }

        let (val, is_ordinal) = if is_64bit {
            let val = u64_at(data, thunk_offset)?;
            (val, val & (1u64 << 63) != 0)
        } else {
            let val = u32_at(data, thunk_offset)? as u64;
            (val, val & (1u64 << 31) != 0)
        };

        // Check for terminator
        if val == 0 {
            break;
        }

        let entry = if is_ordinal {
            ImportEntry {
                name: None,
                ordinal: Some((val & 0xFFFF) as u16),
                hint: None,
            }
        } else {
            let hint_name_rva = (val & 0x7FFF_FFFF) as u32;
            match sections.rva_to_offset(hint_name_rva) {
                Some(hint_offset) => ImportEntry {
                    name: read_cstring(data, hint_offset + 2, 512).ok(),
                    ordinal: None,
                    hint: u16_at(data, hint_offset).ok(),
                },
                None => ImportEntry {
                    name: None,
                    ordinal: None,
                    hint: None,
                },
            }
        };

        entries.push(entry);
        thunk_offset += entry_size;
    }

    Ok(entries)
}
