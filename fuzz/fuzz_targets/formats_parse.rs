#![no_main]
use libfuzzer_sys::fuzz_target;

use binlang::formats::elf::ElfParser;
use binlang::formats::macho::{FatBinary, MachOParser};
use binlang::formats::pe::PeParser;
use binlang::formats::Container;

fuzz_target!(|data: &[u8]| {
    if let Ok(pe) = PeParser::new(data) {
        let _ = pe.sections();
        let _ = pe.imports();
    }
    if let Ok(elf) = ElfParser::parse(data) {
        let _ = elf.symbols();
        let _ = elf.libraries();
    }
    if let Ok(macho) = MachOParser::parse(data) {
        let _ = macho.sections();
        let _ = macho.libraries();
    }
    if let Ok(fat) = FatBinary::parse(data) {
        if let Some(slice) = fat.select_slice("x86_64") {
            let _ = slice.sections();
            let _ = slice.libraries();
        }
    }
});
