//! Utility functions for PE parsing

use crate::formats::pe::types::{PeError, Result};

/// Extension trait for reading little-endian primitives from byte slices
pub trait ReadExt {
    fn read_u16_le_at(&self, offset: usize) -> Option<u16>;
    fn read_u32_le_at(&self, offset: usize) -> Option<u32>;
    fn read_u64_le_at(&self, offset: usize) -> Option<u64>;
    fn read_cstring_at(&self, offset: usize, max_len: usize) -> Option<&str>;
}

impl ReadExt for [u8] {
    #[inline(always)]
    fn read_u16_le_at(&self, offset: usize) -> Option<u16> {
        self.get(offset..offset.checked_add(2)?)
            .and_then(|b| b.try_into().ok())
            .map(u16::from_le_bytes)
    }

    #[inline(always)]
    fn read_u32_le_at(&self, offset: usize) -> Option<u32> {
        self.get(offset..offset.checked_add(4)?)
            .and_then(|b| b.try_into().ok())
            .map(u32::from_le_bytes)
    }

    #[inline(always)]
    fn read_u64_le_at(&self, offset: usize) -> Option<u64> {
        self.get(offset..offset.checked_add(8)?)
            .and_then(|b| b.try_into().ok())
            .map(u64::from_le_bytes)
    }

    fn read_cstring_at(&self, offset: usize, max_len: usize) -> Option<&str> {
        let end = offset.saturating_add(max_len).min(self.len());
        let slice = self.get(offset..end)?;

        // Find null terminator
        let len = slice.iter().position(|&b| b == 0).unwrap_or(slice.len());
        std::str::from_utf8(&slice[..len]).ok()
    }
}

/// Helper to read a null-terminated string from a buffer
pub fn read_cstring(data: &[u8], offset: usize, max_len: usize) -> Result<&str> {
    data.read_cstring_at(offset, max_len)
        .ok_or(PeError::InvalidString)
}

/// Read a `u16` or report the offending offset
pub fn u16_at(data: &[u8], offset: usize) -> Result<u16> {
    data.read_u16_le_at(offset)
        .ok_or(PeError::InvalidOffset { offset })
}

/// Read a `u32` or report the offending offset
pub fn u32_at(data: &[u8], offset: usize) -> Result<u32> {
    data.read_u32_le_at(offset)
        .ok_or(PeError::InvalidOffset { offset })
}

/// Read a `u64` or report the offending offset
pub fn u64_at(data: &[u8], offset: usize) -> Result<u64> {
    data.read_u64_le_at(offset)
        .ok_or(PeError::InvalidOffset { offset })
}
