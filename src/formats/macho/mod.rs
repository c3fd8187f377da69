//! Mach-O parser
//!
//! Thin images are decoded in either byte order, 32- or 64-bit. Universal
//! binaries are handled by [`fat::FatBinary`], which decodes every slice with
//! [`MachOParser`] and hands back the one selected for the host.

pub mod commands;
pub mod fat;
pub mod types;

use crate::core::ContainerFormat;
use crate::formats::{slice_or_empty, Container, ContainerSection};
use commands::{parse_header, parse_load_commands};
pub use fat::{CpuType, FatArch, FatBinary};
pub use types::*;

/// Main Mach-O parser for a thin image
#[derive(Debug, Clone)]
pub struct MachOParser<'data> {
    data: &'data [u8],
    header: MachHeader,
    commands: Vec<LoadCommand>,
}

impl<'data> MachOParser<'data> {
    /// Parse the header and every load command
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let header = parse_header(data)?;
        let commands = parse_load_commands(data, &header)?;

        Ok(Self {
            data,
            header,
            commands,
        })
    }

    pub fn header(&self) -> &MachHeader {
        &self.header
    }

    pub fn load_commands(&self) -> &[LoadCommand] {
        &self.commands
    }

    /// Segments in load command order
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.commands.iter().filter_map(|lc| match lc {
            LoadCommand::Segment(seg) => Some(seg),
            _ => None,
        })
    }
}

impl<'data> Container<'data> for MachOParser<'data> {
    type Error = MachOError;

    fn format(&self) -> ContainerFormat {
        ContainerFormat::MachO
    }

    fn sections(&self) -> Vec<ContainerSection<'data>> {
        self.segments()
            .flat_map(|seg| seg.sections.iter())
            .map(|section| ContainerSection {
                name: section.sectname.clone(),
                data: if section.is_zerofill() {
                    &[]
                } else {
                    slice_or_empty(self.data, section.offset as u64, section.size)
                },
            })
            .collect()
    }

    fn libraries(&self) -> Result<Vec<String>> {
        Ok(self
            .commands
            .iter()
            .filter_map(|lc| match lc {
                LoadCommand::Dylib { name } => Some(name.clone()),
                _ => None,
            })
            .collect())
    }
}
