//! Cross-format byte pattern scanning.
//!
//! The first [`SCAN_WINDOW`] bytes of every file are tested against one
//! regular expression per language. A pattern contributes at most one hit
//! no matter how often it occurs.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::debug;

use crate::core::{DetectionResult, Language};

/// Number of leading bytes scanned for language patterns.
pub const SCAN_WINDOW: usize = 65536;

/// Language signatures in their fixed evaluation order.
pub static LANGUAGE_PATTERNS: Lazy<Vec<(Language, Regex)>> = Lazy::new(|| {
    [
        (Language::Go, r"runtime\.|go(itab|type|func|string|interface)"),
        (Language::Rust, r"rust_panic|rust_begin_unwind|core::"),
        (Language::Cpp, r"\.cxx_|std::|__cxa_|typeinfo for"),
        (Language::Python, r"PyImport_|PyEval_|Python[0-9]\.[0-9]"),
        (Language::Java, r"java/|javax/"),
        (Language::Node, r"node\.js|require\("),
    ]
    .into_iter()
    .map(|(language, pattern)| {
        (
            language,
            Regex::new(pattern).expect("valid language pattern"),
        )
    })
    .collect()
});

/// Languages whose pattern occurs in `window`, in table order.
pub fn matching_languages(window: &[u8]) -> Vec<Language> {
    LANGUAGE_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(window))
        .map(|(language, _)| *language)
        .collect()
}

/// Record one hit per matching pattern.
pub fn scan(window: &[u8], result: &mut DetectionResult) {
    if window.is_empty() {
        return;
    }
    for language in matching_languages(window) {
        debug!(language = %language, "byte pattern matched");
        result.record(&[language], format!("Found {} patterns in binary", language));
    }
}
