//! PE structural analysis.

use memchr::memmem;
use tracing::{debug, warn};

use super::{apply_rules, EntryRule};
use crate::core::{DetectionResult, Language};
use crate::formats::pe::PeParser;
use crate::formats::Container;

/// Import entries are `function:dll`; the DLL rule compares the whole entry.
const IMPORT_RULES: &[EntryRule] = &[
    EntryRule {
        matches: |e| e.contains("go_") || e == "runtime.dll",
        languages: &[Language::Go],
        label: "Go runtime",
    },
    EntryRule {
        matches: |e| e.contains("Qt"),
        languages: &[Language::Cpp],
        label: "Qt framework",
    },
    EntryRule {
        matches: |e| e.contains("msvcr") || e.contains("vcruntime"),
        languages: &[Language::C, Language::Cpp],
        label: "MSVC runtime",
    },
];

/// Analyze a PE image.
pub fn analyze(image: &[u8], result: &mut DetectionResult) {
    let parser = match PeParser::new(image) {
        Ok(parser) => parser,
        Err(e) => {
            warn!(error = %e, "PE parsing failed");
            result.note(format!("PE parsing failed: {}", e));
            return;
        }
    };

    if parser.is_dotnet() {
        result.record(&Language::DOTNET, "Found .NET metadata");
    }

    if parser.any_section_name(|name| name.contains("gofunc") || name.contains("goinfo")) {
        result.record(&[Language::Go], "Found Go runtime indicators");
    }

    if has_rust_panic_strings(&parser) {
        result.record(&[Language::Rust], "Found Rust panic strings");
    }

    let imports = parser.imports().unwrap_or_else(|e| {
        debug!(error = %e, "import enumeration failed");
        Vec::new()
    });
    apply_rules(result, &imports, IMPORT_RULES);
}

fn has_rust_panic_strings(parser: &PeParser<'_>) -> bool {
    parser
        .sections()
        .iter()
        .filter(|s| s.name.contains(".rdata"))
        .any(|s| memmem::find(s.data, b"rust_panic").is_some())
}
