//! ELF header parsing

use crate::formats::elf::sections::parse_section_header;
use crate::formats::elf::types::*;
use crate::formats::elf::utils::{read_addr, EndianRead};

/// Parse ELF identification bytes
pub fn parse_ident(data: &[u8]) -> Result<ElfIdent> {
    if data.len() < 16 {
        return Err(ElfError::Truncated {
            offset: 0,
            needed: 16,
        });
    }

    if &data[0..4] != ELF_MAGIC {
        return Err(ElfError::InvalidMagic);
    }

    let class = ElfClass::from_u8(data[4])?;
    let data_encoding = ElfData::from_u8(data[5])?;
    let version = data[6];
    if version != EV_CURRENT {
        return Err(ElfError::UnsupportedVersion(version));
    }

    Ok(ElfIdent {
        class,
        data: data_encoding,
        version,
        osabi: data[7],
    })
}

/// Parse the ELF file header and validate its section table geometry
pub fn parse_header(data: &[u8]) -> Result<ElfHeader> {
    let ident = parse_ident(data)?;
    let class = ident.class;
    let endian = ident.data;

    let header_size = class.header_size();
    if data.len() < header_size {
        return Err(ElfError::Truncated {
            offset: 0,
            needed: header_size,
        });
    }

    let e_type = data.read_u16(16, endian)?;
    let e_machine = data.read_u16(18, endian)?;

    // Section header fields sit after e_entry and e_phoff
    let (shoff_at, tail) = match class {
        ElfClass::Elf32 => (32, 46),
        ElfClass::Elf64 => (40, 58),
    };
    let e_shoff = read_addr(data, shoff_at, class, endian)?;
    let e_shentsize = data.read_u16(tail, endian)?;
    let e_shnum = data.read_u16(tail + 2, endian)?;
    let e_shstrndx = data.read_u16(tail + 4, endian)?;

    let mut shnum = e_shnum as usize;
    let mut shstrndx = e_shstrndx as u32;

    // Extended numbering: with e_shnum zero, section 0 carries the real count
    // in sh_size and, for SHN_XINDEX, the string table index in sh_link
    if e_shnum == 0 && e_shoff != 0 {
        let offset = usize::try_from(e_shoff).map_err(|_| ElfError::InvalidOffset {
            offset: usize::MAX,
        })?;
        let first = parse_section_header(data, offset, class, endian)?;
        shnum = usize::try_from(first.sh_size).unwrap_or(usize::MAX);
        if shnum < SHN_LORESERVE as usize {
            return Err(ElfError::MalformedHeader(format!(
                "invalid section count in sh_size: {}",
                first.sh_size
            )));
        }
        if e_shstrndx == SHN_XINDEX {
            shstrndx = first.sh_link;
            if shstrndx < SHN_LORESERVE as u32 {
                return Err(ElfError::MalformedHeader(format!(
                    "invalid string table index in sh_link: {}",
                    first.sh_link
                )));
            }
        }
    }

    if shnum > 0 {
        if e_shentsize as usize != class.section_header_size() {
            return Err(ElfError::MalformedHeader(format!(
                "Invalid e_shentsize: expected {}, got {}",
                class.section_header_size(),
                e_shentsize
            )));
        }
        if e_shoff == 0 {
            return Err(ElfError::MalformedHeader(
                "section headers present but e_shoff is zero".to_string(),
            ));
        }
        if shstrndx as usize >= shnum {
            return Err(ElfError::InvalidSectionIndex(shstrndx));
        }
    }

    Ok(ElfHeader {
        ident,
        e_type,
        e_machine,
        e_shoff,
        e_shentsize,
        e_shnum,
        e_shstrndx,
        shnum,
        shstrndx,
    })
}
