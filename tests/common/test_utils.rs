//! Temporary file helpers shared by the integration tests.

use std::io::Write;
use tempfile::NamedTempFile;

/// Creates a temporary file with the given content.
///
/// The file is removed when the returned `NamedTempFile` is dropped.
pub fn create_temp_file(content: &[u8]) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Creates a temporary file of `size` bytes filled with `pattern`.
pub fn create_temp_file_with_size(size: usize, pattern: u8) -> NamedTempFile {
    create_temp_file(&vec![pattern; size])
}
