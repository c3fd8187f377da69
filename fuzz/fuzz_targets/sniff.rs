#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Some(header) = data.get(..8).and_then(|h| <[u8; 8]>::try_from(h).ok()) {
        let _ = binlang::detect::sniffer::sniff(&header);
    }
});
