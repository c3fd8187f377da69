//! PE header parsing

use crate::formats::pe::types::*;
use crate::formats::pe::utils::{u16_at, u32_at, u64_at};

/// Parse DOS header from data
pub fn parse_dos_header(data: &[u8]) -> Result<DosHeader> {
    if data.len() < 64 {
        return Err(PeError::TruncatedHeader {
            expected: 64,
            actual: data.len(),
        });
    }

    let e_magic = u16_at(data, 0)?;
    if e_magic != DOS_SIGNATURE {
        return Err(PeError::InvalidDosSignature);
    }

    Ok(DosHeader {
        e_magic,
        e_lfanew: u32_at(data, 60)?,
    })
}

/// Parse COFF header from data at offset
pub fn parse_coff_header(data: &[u8], offset: usize) -> Result<CoffHeader> {
    let end = offset + COFF_HEADER_SIZE;
    if end > data.len() {
        return Err(PeError::TruncatedHeader {
            expected: end,
            actual: data.len(),
        });
    }

    Ok(CoffHeader {
        machine: Machine::from(u16_at(data, offset)?),
        number_of_sections: u16_at(data, offset + 2)?,
        time_date_stamp: u32_at(data, offset + 4)?,
        size_of_optional_header: u16_at(data, offset + 16)?,
        characteristics: u16_at(data, offset + 18)?,
    })
}

/// Parse optional header from data at offset
pub fn parse_optional_header(data: &[u8], offset: usize, size: u16) -> Result<OptionalHeader> {
    if size < 2 {
        return Err(PeError::TruncatedHeader {
            expected: offset + 2,
            actual: offset + size as usize,
        });
    }

    if offset + size as usize > data.len() {
        return Err(PeError::TruncatedHeader {
            expected: offset + size as usize,
            actual: data.len(),
        });
    }

    let magic = u16_at(data, offset)?;
    let minimum = match magic {
        PE32_MAGIC => 96,
        PE32PLUS_MAGIC => 112,
        _ => return Err(PeError::InvalidMagic(magic)),
    };

    if (size as usize) < minimum {
        return Err(PeError::TruncatedHeader {
            expected: offset + minimum,
            actual: offset + size as usize,
        });
    }

    let address_of_entry_point = u32_at(data, offset + 16)?;
    let header = if magic == PE32_MAGIC {
        OptionalHeader::Pe32 {
            address_of_entry_point,
            image_base: u32_at(data, offset + 28)?,
            number_of_rva_and_sizes: u32_at(data, offset + 92)?,
        }
    } else {
        OptionalHeader::Pe32Plus {
            address_of_entry_point,
            image_base: u64_at(data, offset + 24)?,
            number_of_rva_and_sizes: u32_at(data, offset + 108)?,
        }
    };

    Ok(header)
}

/// Parse the data directory array.
///
/// Entries past the end of the optional header or the image are treated as
/// absent; the result is always padded to 16 entries.
pub fn parse_data_directories(
    data: &[u8],
    offset: usize,
    count: u32,
    available: usize,
) -> Vec<DataDirectory> {
    let count = (count as usize)
        .min(IMAGE_NUMBEROF_DIRECTORY_ENTRIES)
        .min(available / 8);

    let mut directories: Vec<DataDirectory> = (0..count)
        .map_while(|i| {
            let dir_offset = offset + i * 8;
            Some(DataDirectory {
                virtual_address: u32_at(data, dir_offset).ok()?,
                size: u32_at(data, dir_offset + 4).ok()?,
            })
        })
        .collect();

    // Pad with empty directories if needed
    directories.resize(IMAGE_NUMBEROF_DIRECTORY_ENTRIES, DataDirectory::default());
    directories
}

/// Parse NT headers (PE signature + COFF + Optional)
pub fn parse_nt_headers(data: &[u8], offset: usize) -> Result<(NtHeaders, Vec<DataDirectory>)> {
    // Check PE signature
    let signature = offset
        .checked_add(4)
        .and_then(|end| data.get(offset..end))
        .ok_or(PeError::TruncatedHeader {
            expected: offset.saturating_add(4),
            actual: data.len(),
        })?;

    if signature != PE_SIGNATURE {
        return Err(PeError::InvalidPeSignature);
    }

    // Parse COFF header
    let coff_header = parse_coff_header(data, offset + 4)?;

    // Parse optional header
    let opt_offset = offset + 4 + COFF_HEADER_SIZE;
    let opt_size = coff_header.size_of_optional_header;
    let optional_header = parse_optional_header(data, opt_offset, opt_size)?;

    // Parse data directories
    let dir_start = optional_header.data_directory_offset();
    let directories = parse_data_directories(
        data,
        opt_offset + dir_start,
        optional_header.number_of_rva_and_sizes(),
        (opt_size as usize).saturating_sub(dir_start),
    );

    let nt_headers = NtHeaders {
        file_header: coff_header,
        optional_header,
    };

    Ok((nt_headers, directories))
}
