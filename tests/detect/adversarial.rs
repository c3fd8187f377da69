use std::io::Cursor;

use binlang::{ContainerFormat, DetectionResult, Detector, DetectorConfig, Language};

use crate::common::fixtures::*;
use crate::common::test_utils::create_temp_file;

fn detect(data: &[u8]) -> DetectionResult {
    Detector::default()
        .detect_reader(&mut Cursor::new(data))
        .expect("detect")
}

#[test]
fn truncated_fixtures_never_panic() {
    let fixtures = vec![
        ElfBuilder::new()
            .section(".go.buildinfo", &[0u8; 8])
            .symbol("_ZN3std2rt10lang_start")
            .needed("libpython3.11.so.1.0")
            .build(),
        PeBuilder::new()
            .section(".rdata")
            .import("Qt5Core.dll", &["qVersion"])
            .dotnet()
            .build(),
        macho_fat(&[
            (
                CPU_TYPE_X86_64,
                macho_thin(
                    CPU_TYPE_X86_64,
                    &["__swift5_types"],
                    &["/usr/lib/libobjc.A.dylib"],
                ),
            ),
            (CPU_TYPE_ARM64, macho_thin(CPU_TYPE_ARM64, &["__go_buildinfo"], &[])),
        ]),
    ];

    for data in fixtures {
        for len in 8..=data.len() {
            let result = detect(&data[..len]);
            assert!(result.confidence >= 0.0 && result.confidence <= 1.0);
        }
    }
}

#[test]
fn header_only_files_degrade_to_evidence() {
    let cases: [(&[u8], ContainerFormat, &str); 5] = [
        (b"\x7fELF\x02\x01\x01\0", ContainerFormat::Elf, "ELF parsing failed: "),
        (b"MZ\x90\0\x03\0\0\0", ContainerFormat::Pe, "PE parsing failed: "),
        (
            b"\xfe\xed\xfa\xcf\0\0\0\x07",
            ContainerFormat::MachO,
            "Failed to analyse Mach-O file: ",
        ),
        (
            b"\xce\xfa\xed\xfe\x07\0\0\0",
            ContainerFormat::MachO,
            "Failed to analyse Mach-O file: ",
        ),
        (
            b"\xca\xfe\xba\xbe\0\0\0\x02",
            ContainerFormat::MachOUniversal,
            "Failed to analyse fat Mach-O file: ",
        ),
    ];

    for (data, format, prefix) in cases {
        let file = create_temp_file(data);
        let result = binlang::detect_source_language(file.path()).unwrap();
        assert_eq!(result.container_format, format);
        assert_eq!(result.evidence.len(), 1, "{:?}", result.evidence);
        assert!(result.evidence[0].starts_with(prefix), "{:?}", result.evidence);
        assert_eq!(result.primary_language, Language::Unknown);
    }
}

#[test]
fn alternate_fat_magic_is_sniffed_but_rejected() {
    let mut data = macho_fat(&[(
        CPU_TYPE_X86_64,
        macho_thin(CPU_TYPE_X86_64, &["__swift5_types"], &[]),
    )]);
    data[1] = 0xae;
    let result = detect(&data);

    assert_eq!(result.container_format, ContainerFormat::MachOUniversal);
    assert_eq!(result.platform, "macOS (1 architectures)");
    assert_eq!(
        result.evidence,
        vec!["Failed to analyse fat Mach-O file: Invalid magic number: 0xcaaebabe".to_string()]
    );
}

#[test]
fn empty_fat_table_records_nothing() {
    let data = macho_fat(&[]);
    let result = detect(&data);

    assert_eq!(result.container_format, ContainerFormat::MachOUniversal);
    assert_eq!(result.platform, "macOS (0 architectures)");
    assert!(result.evidence.is_empty());
    assert_eq!(result.primary_language, Language::Unknown);
}

#[test]
fn fat_slice_outside_file() {
    let mut data = macho_fat(&[(CPU_TYPE_ARM64, macho_thin(CPU_TYPE_ARM64, &[], &[]))]);
    // Inflate the slice size past the end of the file
    data[20..24].copy_from_slice(&0x0010_0000u32.to_be_bytes());
    let result = detect(&data);

    assert_eq!(
        result.evidence,
        vec![
            "Failed to analyse fat Mach-O file: Fat architecture 0 lies outside the file"
                .to_string()
        ]
    );
}

#[test]
fn corrupt_slice_fails_the_whole_universal_binary() {
    let mut broken = macho_thin(CPU_TYPE_ARM64, &["__objc_data"], &[]);
    broken[0] = 0;
    let data = macho_fat(&[
        (CPU_TYPE_X86_64, macho_thin(CPU_TYPE_X86_64, &["__swift5_types"], &[])),
        (CPU_TYPE_ARM64, broken),
    ]);

    // Even a host whose own slice is intact gets no structural evidence
    for host in ["aarch64", "x86_64"] {
        let result = Detector::new(DetectorConfig::default().with_host_arch(host))
            .detect_reader(&mut Cursor::new(data.clone()))
            .unwrap();
        assert_eq!(result.primary_language, Language::Unknown);
        assert_eq!(
            result.evidence,
            vec!["Failed to analyse fat Mach-O file: Fat architecture 1: \
                  Invalid magic number: 0x00edfacf"
                .to_string()]
        );
    }
}

#[test]
fn duplicate_fat_architecture_is_rejected() {
    let data = macho_fat(&[
        (CPU_TYPE_ARM64, macho_thin(CPU_TYPE_ARM64, &["__swift5_types"], &[])),
        (CPU_TYPE_ARM64, macho_thin(CPU_TYPE_ARM64, &["__objc_data"], &[])),
    ]);
    let result = detect(&data);
    assert!(result.candidate_languages.is_empty());
    assert_eq!(
        result.evidence,
        vec!["Failed to analyse fat Mach-O file: Fat architecture 1 duplicates \
              cpu 0x100000c subcpu 0x0"
            .to_string()]
    );
}

#[test]
fn weak_dylib_contributes_no_library_evidence() {
    let mut data = macho_thin(CPU_TYPE_X86_64, &[], &["/usr/lib/libobjc.A.dylib"]);
    // The dylib command follows the 32-byte header and the empty segment
    data[104..108].copy_from_slice(&0x8000_0018u32.to_be_bytes());
    let result = detect(&data);
    assert!(!result.evidence.iter().any(|e| e.starts_with("Objective-C runtime")));
    assert_eq!(result.primary_language, Language::Unknown);
}

#[test]
fn pe_runtime_dll_rule_needs_the_whole_entry() {
    let data = PeBuilder::new().import("runtime.dll", &["Init"]).build();
    let result = detect(&data);

    // Entries are "function:dll", so the DLL rule never fires; the byte
    // scanner still sees "runtime." in the name table.
    assert!(!result.evidence.iter().any(|e| e.starts_with("Go runtime:")));
    assert_eq!(result.evidence, vec!["Found Go patterns in binary".to_string()]);
}

#[test]
fn first_matching_import_rule_wins() {
    // Matches both the Qt and MSVC rules; Qt comes first
    let data = PeBuilder::new().import("msvcrQt.dll", &["a"]).build();
    let result = detect(&data);
    assert_eq!(result.candidate_languages, vec![Language::Cpp]);
    assert_eq!(result.evidence, vec!["Qt framework: a:msvcrQt.dll".to_string()]);
}

#[test]
fn corrupt_section_table_is_evidence() {
    let mut data = ElfBuilder::new().section(".go.buildinfo", &[0u8; 8]).build();
    // e_shstrndx beyond e_shnum
    data[62] = 0x40;
    let result = detect(&data);
    assert_eq!(
        result.evidence,
        vec!["ELF parsing failed: Invalid section index: 64".to_string()]
    );
}

#[test]
fn image_limit_reaches_analyzers_as_a_prefix() {
    let data = ElfBuilder::new().section(".go.buildinfo", &[0u8; 8]).build();
    let detector = Detector::new(DetectorConfig::default().with_max_image_bytes(64));
    let result = detector.detect_reader(&mut Cursor::new(data)).unwrap();

    assert_eq!(result.evidence.len(), 1);
    assert!(result.evidence[0].starts_with("ELF parsing failed: Truncated"));
}

#[test]
fn path_detection_maps_the_whole_file() {
    let data = ElfBuilder::new().section(".go.buildinfo", &[0u8; 8]).build();
    let file = create_temp_file(&data);
    let detector = Detector::new(DetectorConfig::default().with_max_image_bytes(64));

    let result = detector.detect_path(file.path()).unwrap();
    assert_eq!(result.primary_language, Language::Go);
    assert_eq!(result.evidence, vec!["Found Go build info".to_string()]);
}
