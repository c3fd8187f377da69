//! Utility functions for ELF parsing

use crate::formats::elf::types::{ElfClass, ElfData, ElfError, Result};

/// Trait for reading values with endianness support
pub trait EndianRead {
    fn read_u16(&self, offset: usize, data: ElfData) -> Result<u16>;
    fn read_u32(&self, offset: usize, data: ElfData) -> Result<u32>;
    fn read_u64(&self, offset: usize, data: ElfData) -> Result<u64>;
}

fn bytes_at<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N]> {
    offset
        .checked_add(N)
        .and_then(|end| buf.get(offset..end))
        .and_then(|b| b.try_into().ok())
        .ok_or(ElfError::Truncated { offset, needed: N })
}

impl EndianRead for [u8] {
    fn read_u16(&self, offset: usize, data: ElfData) -> Result<u16> {
        let bytes = bytes_at::<2>(self, offset)?;
        Ok(match data {
            ElfData::Little => u16::from_le_bytes(bytes),
            ElfData::Big => u16::from_be_bytes(bytes),
        })
    }

    fn read_u32(&self, offset: usize, data: ElfData) -> Result<u32> {
        let bytes = bytes_at::<4>(self, offset)?;
        Ok(match data {
            ElfData::Little => u32::from_le_bytes(bytes),
            ElfData::Big => u32::from_be_bytes(bytes),
        })
    }

    fn read_u64(&self, offset: usize, data: ElfData) -> Result<u64> {
        let bytes = bytes_at::<8>(self, offset)?;
        Ok(match data {
            ElfData::Little => u64::from_le_bytes(bytes),
            ElfData::Big => u64::from_be_bytes(bytes),
        })
    }
}

/// Read an address-sized word based on ELF class
pub fn read_addr(data: &[u8], offset: usize, class: ElfClass, endian: ElfData) -> Result<u64> {
    match class {
        ElfClass::Elf32 => data.read_u32(offset, endian).map(|v| v as u64),
        ElfClass::Elf64 => data.read_u64(offset, endian),
    }
}

/// Read a null-terminated string from data
pub fn read_cstring(data: &[u8], offset: usize) -> Result<&str> {
    if offset >= data.len() {
        return Err(ElfError::InvalidOffset { offset });
    }

    let slice = &data[offset..];
    let end = slice.iter().position(|&b| b == 0).unwrap_or(slice.len());

    std::str::from_utf8(&slice[..end]).map_err(|_| ElfError::InvalidString)
}
