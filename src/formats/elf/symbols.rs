//! Symbol table parsing

use crate::formats::elf::types::*;
use crate::formats::elf::utils::{read_addr, EndianRead};

/// Symbol table entries plus the string table they name into
pub struct SymbolTable<'a> {
    symbols: Vec<Symbol>,
    strings: &'a [u8],
}

impl<'a> SymbolTable<'a> {
    /// Parse symbol table from section data.
    ///
    /// Trailing bytes that do not form a whole entry are ignored.
    pub fn parse(
        symbol_data: &[u8],
        string_data: &'a [u8],
        class: ElfClass,
        endian: ElfData,
    ) -> Result<Self> {
        let entry_size = class.symbol_size();
        let symbols = (0..symbol_data.len() / entry_size)
            .map(|i| parse_symbol(symbol_data, i * entry_size, class, endian))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            symbols,
            strings: string_data,
        })
    }

    /// Get symbol by index
    pub fn by_index(&self, index: usize) -> Option<&Symbol> {
        self.symbols.get(index)
    }

    /// Name of a symbol; out-of-range names read as empty
    pub fn symbol_name(&self, symbol: &Symbol) -> String {
        let start = symbol.st_name as usize;
        let Some(tail) = self.strings.get(start..) else {
            return String::new();
        };
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        String::from_utf8_lossy(&tail[..end]).into_owned()
    }

    /// Names of every symbol after the reserved null entry, in table order
    pub fn names(&self) -> Vec<String> {
        self.symbols
            .iter()
            .skip(1)
            .map(|s| self.symbol_name(s))
            .collect()
    }

    /// Number of entries, including the null symbol
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Parse a single symbol entry
fn parse_symbol(data: &[u8], offset: usize, class: ElfClass, endian: ElfData) -> Result<Symbol> {
    match class {
        ElfClass::Elf32 => Ok(Symbol {
            st_name: data.read_u32(offset, endian)?,
            st_value: read_addr(data, offset + 4, class, endian)?,
            st_size: read_addr(data, offset + 8, class, endian)?,
            st_info: *data.get(offset + 12).ok_or(ElfError::Truncated {
                offset: offset + 12,
                needed: 1,
            })?,
            st_shndx: data.read_u16(offset + 14, endian)?,
        }),
        ElfClass::Elf64 => Ok(Symbol {
            st_name: data.read_u32(offset, endian)?,
            st_info: *data.get(offset + 4).ok_or(ElfError::Truncated {
                offset: offset + 4,
                needed: 1,
            })?,
            st_shndx: data.read_u16(offset + 6, endian)?,
            st_value: data.read_u64(offset + 8, endian)?,
            st_size: data.read_u64(offset + 16, endian)?,
        }),
    }
}
