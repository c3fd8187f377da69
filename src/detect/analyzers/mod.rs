//! Per-format structural analyzers.
//!
//! Each analyzer parses an in-memory image with its decoder and records
//! language hypotheses on the shared [`DetectionResult`]. Decoder errors
//! never escape: they become evidence entries and the analyzer returns.

pub mod elf;
pub mod macho;
pub mod pe;

use tracing::debug;

use crate::config::DetectorConfig;
use crate::core::{ContainerFormat, DetectionResult, Language};

/// Maps an import or library entry to the languages it implies.
pub(crate) struct EntryRule {
    pub matches: fn(&str) -> bool,
    pub languages: &'static [Language],
    pub label: &'static str,
}

/// Record one hit per entry using the first rule that matches it.
pub(crate) fn apply_rules(result: &mut DetectionResult, entries: &[String], rules: &[EntryRule]) {
    for entry in entries {
        if let Some(rule) = rules.iter().find(|rule| (rule.matches)(entry)) {
            debug!(entry = %entry, label = rule.label, "entry rule matched");
            result.record(rule.languages, format!("{}: {}", rule.label, entry));
        }
    }
}

/// Run the structural analyzer for `format` over `image`.
pub fn analyze(
    format: ContainerFormat,
    image: &[u8],
    config: &DetectorConfig,
    result: &mut DetectionResult,
) {
    match format {
        ContainerFormat::Pe => pe::analyze(image, result),
        ContainerFormat::Elf => elf::analyze(image, result),
        ContainerFormat::MachO | ContainerFormat::MachOUniversal => {
            macho::analyze(image, &config.host_arch, result)
        }
        ContainerFormat::JavaClass | ContainerFormat::Unknown => {
            debug!(format = %format, "no structural analyzer");
        }
    }
}
