//! ELF (Executable and Linkable Format) parser
//!
//! Zero-copy over an in-memory image. The file header and section header
//! table are validated up front; symbol and dynamic tables are decoded on
//! demand.

pub mod dynamic;
pub mod headers;
pub mod sections;
pub mod symbols;
pub mod types;
pub mod utils;

use crate::core::ContainerFormat;
use crate::formats::{Container, ContainerSection};
use dynamic::DynamicSection;
use headers::parse_header;
use sections::SectionTable;
use symbols::SymbolTable;
pub use types::*;

/// Main ELF parser
pub struct ElfParser<'data> {
    header: ElfHeader,
    sections: SectionTable<'data>,
}

impl<'data> ElfParser<'data> {
    /// Parse ELF from raw data
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let header = parse_header(data)?;
        let sections = SectionTable::parse(data, &header)?;

        Ok(Self { header, sections })
    }

    /// Get ELF header
    pub fn header(&self) -> &ElfHeader {
        &self.header
    }

    /// Get section table
    pub fn section_table(&self) -> &SectionTable<'data> {
        &self.sections
    }

    /// Static symbol table from the first SHT_SYMTAB section
    pub fn symbol_table(&self) -> Result<Option<SymbolTable<'data>>> {
        let Some(symtab) = self.sections.by_type(SHT_SYMTAB) else {
            return Ok(None);
        };
        let strings = self.linked_strings(&symtab)?;

        SymbolTable::parse(
            symtab.data,
            strings,
            self.header.ident.class,
            self.header.ident.data,
        )
        .map(Some)
    }

    /// Dynamic section from the first SHT_DYNAMIC section
    pub fn dynamic(&self) -> Result<Option<DynamicSection<'data>>> {
        let Some(dynamic) = self.sections.by_type(SHT_DYNAMIC) else {
            return Ok(None);
        };
        let strings = self.linked_strings(&dynamic)?;

        DynamicSection::parse(
            &dynamic,
            strings,
            self.header.ident.class,
            self.header.ident.data,
        )
        .map(Some)
    }

    /// String table referenced by a section's `sh_link`
    fn linked_strings(&self, section: &Section<'data>) -> Result<&'data [u8]> {
        let link = section.header.sh_link;
        let strtab = self
            .sections
            .by_index(link as usize)
            .ok_or(ElfError::InvalidSectionIndex(link))?;
        if strtab.header.sh_type != SHT_STRTAB {
            return Err(ElfError::MalformedHeader(format!(
                "section {} linked from {} is not a string table",
                link, section.name
            )));
        }
        Ok(strtab.data)
    }
}

impl<'data> Container<'data> for ElfParser<'data> {
    type Error = ElfError;

    fn format(&self) -> ContainerFormat {
        ContainerFormat::Elf
    }

    fn sections(&self) -> Vec<ContainerSection<'data>> {
        self.sections
            .sections()
            .map(|s| ContainerSection {
                name: s.name.to_string(),
                data: s.data,
            })
            .collect()
    }

    fn symbols(&self) -> Result<Vec<String>> {
        Ok(self
            .symbol_table()?
            .map(|table| table.names())
            .unwrap_or_default())
    }

    fn libraries(&self) -> Result<Vec<String>> {
        Ok(self
            .dynamic()?
            .map(|d| {
                d.needed_libraries()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }
}
