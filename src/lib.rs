//! Source-language detection for compiled executables.
//!
//! `binlang` sniffs the container format of a binary (PE, ELF, Mach-O thin
//! and universal, Java class), inspects the structures each format exposes,
//! scans a fixed prefix for language-specific byte patterns and folds the
//! collected evidence into a single ranked guess.
//!
//! ```no_run
//! let result = binlang::detect_source_language("/usr/bin/ls")?;
//! println!("{} ({:.2})", result.primary_language, result.confidence);
//! # Ok::<(), binlang::BinlangError>(())
//! ```

/// Configuration for the detection pipeline
pub mod config;
/// Core data types module
pub mod core;
pub mod detect;
pub mod error;
/// Structural decoders for executable containers
pub mod formats;
pub mod io;
pub mod logging;

pub use crate::config::DetectorConfig;
pub use crate::core::{ContainerFormat, DetectionResult, Language};
pub use crate::detect::{detect_many, detect_source_language, Detector};
pub use crate::error::{BinlangError, Result};
