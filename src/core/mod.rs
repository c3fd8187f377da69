//! Core data types for binlang.
//!
//! `Language` and `ContainerFormat` are the closed vocabularies the engine
//! speaks in; `DetectionResult` is the value a detection run produces.

pub mod format;
pub mod language;
pub mod result;

pub use format::ContainerFormat;
pub use language::Language;
pub use result::DetectionResult;
