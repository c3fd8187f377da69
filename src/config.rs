//! Configuration for the detection pipeline.
//!
//! The scan window and the language patterns are fixed; only the pieces
//! that depend on the running environment are configurable.

use serde::{Deserialize, Serialize};

/// Default upper bound on the bytes loaded for structural analysis (512 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 512 * 1024 * 1024;

/// Settings shared by every detection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Architecture name used to pick a slice out of a universal Mach-O,
    /// spelled like `std::env::consts::ARCH` ("x86_64", "aarch64", ...).
    pub host_arch: String,
    /// Maximum number of bytes copied into memory for the structural
    /// analyzers when detecting from a reader. Longer sources are analyzed on
    /// their prefix. Files detected by path are memory-mapped whole.
    pub max_image_bytes: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            host_arch: std::env::consts::ARCH.to_string(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl DetectorConfig {
    /// Override the host architecture used for fat-binary selection.
    pub fn with_host_arch(mut self, arch: impl Into<String>) -> Self {
        self.host_arch = arch.into();
        self
    }

    /// Override the structural-analysis read limit.
    pub fn with_max_image_bytes(mut self, limit: u64) -> Self {
        self.max_image_bytes = limit;
        self
    }
}
