//! PE (Portable Executable) parser

pub mod headers;
pub mod imports;
pub mod sections;
pub mod types;
pub mod utils;

use crate::core::ContainerFormat;
use crate::formats::{Container, ContainerSection};
use headers::*;
use imports::parse_imports;
use sections::*;
pub use types::*;

/// Main PE parser
pub struct PeParser<'data> {
    data: &'data [u8],
    nt_headers: NtHeaders,
    data_directories: Vec<DataDirectory>,
    section_table: SectionTable,
}

impl<'data> PeParser<'data> {
    /// Parse DOS header, NT headers and the section table
    pub fn new(data: &'data [u8]) -> Result<Self> {
        let dos_header = parse_dos_header(data)?;

        let e_lfanew = dos_header.e_lfanew as usize;
        let (nt_headers, data_directories) = parse_nt_headers(data, e_lfanew)?;

        let section_offset = e_lfanew
            + 4
            + COFF_HEADER_SIZE
            + nt_headers.file_header.size_of_optional_header as usize;
        let section_headers = parse_section_headers(
            data,
            section_offset,
            nt_headers.file_header.number_of_sections,
        )?;

        Ok(Self {
            data,
            nt_headers,
            data_directories,
            section_table: SectionTable::new(section_headers),
        })
    }

    /// Get NT headers
    pub fn nt_headers(&self) -> &NtHeaders {
        &self.nt_headers
    }

    /// Check if PE is 64-bit
    pub fn is_64bit(&self) -> bool {
        self.nt_headers.optional_header.is_64bit()
    }

    /// Get machine type
    pub fn machine(&self) -> Machine {
        self.nt_headers.file_header.machine
    }

    /// Get section table
    pub fn section_table(&self) -> &SectionTable {
        &self.section_table
    }

    /// Get data directory by index; missing entries read as empty
    pub fn data_directory(&self, index: usize) -> DataDirectory {
        self.data_directories
            .get(index)
            .copied()
            .unwrap_or_default()
    }

    /// Check if file is .NET/CLR
    pub fn is_dotnet(&self) -> bool {
        self.data_directory(IMAGE_DIRECTORY_ENTRY_COM_DESCRIPTOR)
            .virtual_address
            != 0
    }

    /// Parse the import table
    pub fn import_descriptors(&self) -> Result<Vec<ImportDescriptor<'data>>> {
        parse_imports(
            self.data,
            &self.section_table,
            &self.data_directory(IMAGE_DIRECTORY_ENTRY_IMPORT),
            self.is_64bit(),
        )
    }
}

impl<'data> Container<'data> for PeParser<'data> {
    type Error = PeError;

    fn format(&self) -> ContainerFormat {
        ContainerFormat::Pe
    }

    fn sections(&self) -> Vec<ContainerSection<'data>> {
        self.section_table
            .headers()
            .iter()
            .map(|header| ContainerSection {
                name: header.name(),
                data: self.section_table.section_data(self.data, header),
            })
            .collect()
    }

    /// By-name imports as `function:dll`; ordinal imports are skipped.
    fn imports(&self) -> Result<Vec<String>> {
        Ok(self
            .import_descriptors()?
            .iter()
            .flat_map(|desc| {
                desc.entries.iter().filter_map(move |entry| {
                    entry
                        .name
                        .map(|name| format!("{}:{}", name, desc.dll_name))
                })
            })
            .collect())
    }

    fn libraries(&self) -> Result<Vec<String>> {
        Ok(self
            .import_descriptors()?
            .iter()
            .map(|desc| desc.dll_name.to_string())
            .collect())
    }
}
