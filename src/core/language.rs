//! Source languages the detector can name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A programming language (or language family member) inferred from a binary.
///
/// Serialized and displayed with the conventional spelling, e.g. `"C++"`
/// or `"VB.NET"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "VB.NET")]
    VisualBasic,
    #[serde(rename = "F#")]
    FSharp,
    Go,
    Rust,
    C,
    #[serde(rename = "C++")]
    Cpp,
    Fortran,
    Python,
    Swift,
    #[serde(rename = "Objective-C")]
    ObjectiveC,
    Java,
    Node,
    Unknown,
}

impl Language {
    /// Languages declared together when CLR metadata is present.
    pub const DOTNET: [Language; 3] = [Language::CSharp, Language::VisualBasic, Language::FSharp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::CSharp => "C#",
            Language::VisualBasic => "VB.NET",
            Language::FSharp => "F#",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Fortran => "Fortran",
            Language::Python => "Python",
            Language::Swift => "Swift",
            Language::ObjectiveC => "Objective-C",
            Language::Java => "Java",
            Language::Node => "Node",
            Language::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
