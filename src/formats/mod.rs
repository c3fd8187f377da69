//! Zero-copy structural decoders for executable containers.
//!
//! Each decoder works on an in-memory image and reports malformed input
//! through its own error enum. [`Container`] is the capability the language
//! analyzers program against.

pub mod elf;
pub mod macho;
pub mod pe;

use crate::core::ContainerFormat;

/// A named section and its raw file contents.
///
/// `data` is empty for sections without file backing (BSS, zero-fill) or
/// whose extent falls outside the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSection<'data> {
    pub name: String,
    pub data: &'data [u8],
}

/// Common view over a parsed executable container.
///
/// Enumeration methods that a format has no notion of keep the default
/// empty implementation.
pub trait Container<'data> {
    type Error: std::error::Error;

    /// Container family of the parsed image.
    fn format(&self) -> ContainerFormat;

    /// Every section in header order.
    fn sections(&self) -> Vec<ContainerSection<'data>>;

    /// Imported symbols, in the format's native spelling.
    fn imports(&self) -> Result<Vec<String>, Self::Error> {
        Ok(Vec::new())
    }

    /// Names from the static symbol table.
    fn symbols(&self) -> Result<Vec<String>, Self::Error> {
        Ok(Vec::new())
    }

    /// Dynamically linked libraries.
    fn libraries(&self) -> Result<Vec<String>, Self::Error> {
        Ok(Vec::new())
    }

    /// True when any section name satisfies `pred`.
    fn any_section_name(&self, mut pred: impl FnMut(&str) -> bool) -> bool
    where
        Self: Sized,
    {
        self.sections().iter().any(|s| pred(&s.name))
    }
}

/// Extract a NUL-padded fixed-width name field.
pub(crate) fn fixed_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Slice `len` bytes at `offset`, or an empty slice when out of range.
pub(crate) fn slice_or_empty(data: &[u8], offset: u64, len: u64) -> &[u8] {
    let (Ok(start), Ok(len)) = (usize::try_from(offset), usize::try_from(len)) else {
        return &[];
    };
    start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .unwrap_or(&[])
}
