//! Header and load command parsing

use crate::formats::fixed_name;
use crate::formats::macho::types::*;

const SEGMENT_COMMAND_SIZE: usize = 56;
const SEGMENT_COMMAND_64_SIZE: usize = 72;
const SECTION_SIZE: usize = 68;
const SECTION_64_SIZE: usize = 80;

/// Parse the thin Mach-O header
pub fn parse_header(data: &[u8]) -> Result<MachHeader> {
    let magic = Endian::Big.u32_at(data, 0)?;
    if !matches!(magic, MH_MAGIC | MH_CIGAM | MH_MAGIC_64 | MH_CIGAM_64) {
        return Err(MachOError::InvalidMagic(magic));
    }

    let mut header = MachHeader {
        magic,
        cputype: 0,
        cpusubtype: 0,
        filetype: 0,
        ncmds: 0,
        sizeofcmds: 0,
        flags: 0,
    };
    if data.len() < header.size() {
        return Err(MachOError::TooShort {
            needed: header.size(),
            actual: data.len(),
        });
    }

    let endian = header.endian();
    header.cputype = endian.u32_at(data, 4)?;
    header.cpusubtype = endian.u32_at(data, 8)?;
    header.filetype = endian.u32_at(data, 12)?;
    header.ncmds = endian.u32_at(data, 16)?;
    header.sizeofcmds = endian.u32_at(data, 20)?;
    header.flags = endian.u32_at(data, 24)?;
    Ok(header)
}

/// Walk `ncmds` load commands inside the `sizeofcmds` region
pub fn parse_load_commands(data: &[u8], header: &MachHeader) -> Result<Vec<LoadCommand>> {
    let start = header.size();
    let region_end = start
        .checked_add(header.sizeofcmds as usize)
        .filter(|&end| end <= data.len())
        .ok_or(MachOError::TooShort {
            needed: start.saturating_add(header.sizeofcmds as usize),
            actual: data.len(),
        })?;
    let region = &data[..region_end];
    let endian = header.endian();

    let mut commands = Vec::new();
    let mut offset = start;
    for _ in 0..header.ncmds {
        let cmd = endian.u32_at(region, offset)?;
        let cmdsize = endian.u32_at(region, offset + 4)?;
        let end = offset
            .checked_add(cmdsize as usize)
            .filter(|&end| cmdsize >= 8 && end <= region_end)
            .ok_or(MachOError::InvalidLoadCommand { offset, cmdsize })?;
        let body = &region[offset..end];

        let command = match cmd {
            LC_SEGMENT => LoadCommand::Segment(parse_segment(body, offset, endian, false)?),
            LC_SEGMENT_64 => LoadCommand::Segment(parse_segment(body, offset, endian, true)?),
            LC_LOAD_DYLIB => LoadCommand::Dylib {
                name: dylib_name(body, offset, endian)?,
            },
            _ => LoadCommand::Other { cmd, cmdsize },
        };
        commands.push(command);
        offset = end;
    }

    Ok(commands)
}

fn parse_segment(body: &[u8], offset: usize, endian: Endian, is_64: bool) -> Result<Segment> {
    let (cmd, header_size, section_size) = if is_64 {
        (LC_SEGMENT_64, SEGMENT_COMMAND_64_SIZE, SECTION_64_SIZE)
    } else {
        (LC_SEGMENT, SEGMENT_COMMAND_SIZE, SECTION_SIZE)
    };
    let truncated = MachOError::TruncatedCommand { cmd, offset };
    if body.len() < header_size {
        return Err(truncated);
    }

    let segname = fixed_name(&body[8..24]);
    let (fileoff, filesize, nsects) = if is_64 {
        (
            endian.u64_at(body, 40)?,
            endian.u64_at(body, 48)?,
            endian.u32_at(body, 64)?,
        )
    } else {
        (
            endian.u32_at(body, 32)? as u64,
            endian.u32_at(body, 36)? as u64,
            endian.u32_at(body, 48)?,
        )
    };

    let table_len = (nsects as usize)
        .checked_mul(section_size)
        .filter(|&len| header_size + len <= body.len())
        .ok_or(truncated)?;
    let sections = body[header_size..header_size + table_len]
        .chunks_exact(section_size)
        .map(|raw| parse_section(raw, endian, is_64))
        .collect::<Result<Vec<_>>>()?;

    Ok(Segment {
        segname,
        fileoff,
        filesize,
        sections,
    })
}

fn parse_section(raw: &[u8], endian: Endian, is_64: bool) -> Result<MachSection> {
    let (addr, size, offset, flags) = if is_64 {
        (
            endian.u64_at(raw, 32)?,
            endian.u64_at(raw, 40)?,
            endian.u32_at(raw, 48)?,
            endian.u32_at(raw, 64)?,
        )
    } else {
        (
            endian.u32_at(raw, 32)? as u64,
            endian.u32_at(raw, 36)? as u64,
            endian.u32_at(raw, 40)?,
            endian.u32_at(raw, 56)?,
        )
    };

    Ok(MachSection {
        sectname: fixed_name(&raw[0..16]),
        segname: fixed_name(&raw[16..32]),
        addr,
        size,
        offset,
        flags,
    })
}

/// Library path stored inside a dylib command at the `lc_str` offset
fn dylib_name(body: &[u8], offset: usize, endian: Endian) -> Result<String> {
    let name_off = endian.u32_at(body, 8)? as usize;
    if name_off >= body.len() {
        return Err(MachOError::InvalidDylibName { offset });
    }
    Ok(fixed_name(&body[name_off..]))
}
