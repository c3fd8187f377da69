//! Mach-O structural analysis, thin and universal.

use tracing::{debug, warn};

use super::{apply_rules, EntryRule};
use crate::core::{DetectionResult, Language};
use crate::formats::macho::{FatBinary, MachOParser, FAT_MAGIC, FAT_MAGIC_ALT};
use crate::formats::Container;
use crate::io::read_header;

const LIBRARY_RULES: &[EntryRule] = &[
    EntryRule {
        matches: |e| e.contains("libswift"),
        languages: &[Language::Swift],
        label: "Swift library",
    },
    EntryRule {
        matches: |e| e.contains("libobjc"),
        languages: &[Language::ObjectiveC],
        label: "Objective-C runtime",
    },
    EntryRule {
        matches: |e| e.contains("libc++"),
        languages: &[Language::Cpp],
        label: "C++ runtime",
    },
];

/// Analyze a Mach-O image. Universal binaries are reduced to the slice for
/// `host_arch` (or the first slice when none matches).
pub fn analyze(image: &[u8], host_arch: &str, result: &mut DetectionResult) {
    let magic = match read_header(&mut &image[..]) {
        Ok(header) => u32::from_be_bytes([header[0], header[1], header[2], header[3]]),
        Err(e) => {
            result.note(format!("Failed to read magic number: {}", e));
            return;
        }
    };

    if magic == FAT_MAGIC || magic == FAT_MAGIC_ALT {
        let fat = match FatBinary::parse(image) {
            Ok(fat) => fat,
            Err(e) => {
                warn!(error = %e, "universal Mach-O parsing failed");
                result.note(format!("Failed to analyse fat Mach-O file: {}", e));
                return;
            }
        };
        let (Some(arch), Some(parser)) = (fat.select_arch(host_arch), fat.select_slice(host_arch))
        else {
            debug!("universal Mach-O lists no architectures");
            return;
        };
        debug!(
            cputype = ?arch.cputype,
            cpusubtype = arch.cpusubtype,
            offset = arch.offset,
            size = arch.size,
            host_arch,
            "selected universal slice"
        );
        inspect(parser, result);
        return;
    }

    match MachOParser::parse(image) {
        Ok(parser) => inspect(&parser, result),
        Err(e) => {
            warn!(error = %e, "Mach-O parsing failed");
            result.note(format!("Failed to analyse Mach-O file: {}", e));
        }
    }
}

fn inspect(parser: &MachOParser<'_>, result: &mut DetectionResult) {
    if parser.any_section_name(|name| name.contains("__swift")) {
        result.record(&[Language::Swift], "Found Swift metadata");
    }

    if parser.any_section_name(|name| name.to_lowercase().contains("_go_build")) {
        result.record(&[Language::Go], "Found Go build ID");
    }

    if parser.any_section_name(|name| name.contains("__objc")) {
        result.record(&[Language::ObjectiveC], "Found Objective-C segments");
    }

    let libraries = parser.libraries().unwrap_or_else(|e| {
        debug!(error = %e, "library enumeration failed");
        Vec::new()
    });
    apply_rules(result, &libraries, LIBRARY_RULES);
}
