//! ELF structural analysis.

use tracing::{debug, warn};

use super::{apply_rules, EntryRule};
use crate::core::{DetectionResult, Language};
use crate::formats::elf::ElfParser;
use crate::formats::Container;

const LIBRARY_RULES: &[EntryRule] = &[
    EntryRule {
        matches: |e| e.contains("libgo"),
        languages: &[Language::Go],
        label: "Go library",
    },
    EntryRule {
        matches: |e| e.contains("libstdc++"),
        languages: &[Language::Cpp],
        label: "C++ stdlib",
    },
    EntryRule {
        matches: |e| e.contains("libgfortran"),
        languages: &[Language::Fortran],
        label: "Fortran library",
    },
    EntryRule {
        matches: |e| e.contains("libpython"),
        languages: &[Language::Python],
        label: "Python library",
    },
];

/// Analyze an ELF image.
pub fn analyze(image: &[u8], result: &mut DetectionResult) {
    let parser = match ElfParser::parse(image) {
        Ok(parser) => parser,
        Err(e) => {
            warn!(error = %e, "ELF parsing failed");
            result.note(format!("ELF parsing failed: {}", e));
            return;
        }
    };

    if parser.any_section_name(|name| name == ".go.buildinfo") {
        result.record(&[Language::Go], "Found Go build info");
    }

    let symbols = parser.symbols().unwrap_or_else(|e| {
        debug!(error = %e, "symbol table unavailable");
        Vec::new()
    });
    if symbols
        .iter()
        .any(|s| s.contains("_ZN4core") || s.contains("_ZN3std"))
    {
        result.record(&[Language::Rust], "Found Rust symbols");
    }

    let libraries = parser.libraries().unwrap_or_else(|e| {
        debug!(error = %e, "dynamic section unavailable");
        Vec::new()
    });
    apply_rules(result, &libraries, LIBRARY_RULES);
}
