//! Bounded I/O helpers for the detection pipeline.
//!
//! Every phase of a detection starts from offset 0 of the same handle, so
//! these helpers take any `Read + Seek` source and never assume a position
//! left behind by an earlier phase. Files opened by path are mapped instead
//! of copied, so their structural image is never cut short.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::ops::Deref;

use memmap2::Mmap;
use tracing::{debug, warn};

/// Number of bytes the format sniffer classifies.
pub const HEADER_SIZE: usize = 8;

/// A bounded reader that limits the amount of data read.
pub struct BoundedReader<R> {
    inner: R,
    bytes_read: u64,
    limit: u64,
}

impl<R: Read> BoundedReader<R> {
    pub fn new(reader: R, limit: u64) -> Self {
        Self {
            inner: reader,
            bytes_read: 0,
            limit,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// True once the limit has been consumed.
    pub fn exhausted(&self) -> bool {
        self.bytes_read >= self.limit
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.bytes_read >= self.limit {
            return Ok(0); // EOF
        }

        let remaining = self.limit - self.bytes_read;
        let max_to_read = std::cmp::min(buf.len() as u64, remaining) as usize;
        let n = self.inner.read(&mut buf[..max_to_read])?;
        self.bytes_read += n as u64;
        Ok(n)
    }
}

/// Bytes handed to the structural analyzers
#[derive(Debug)]
pub enum Image {
    /// Read-only map of a whole file
    Mapped(Mmap),
    /// Bounded copy taken from a generic reader
    Buffered(Vec<u8>),
}

impl Deref for Image {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Image::Mapped(mmap) => mmap,
            Image::Buffered(data) => data,
        }
    }
}

/// Map the whole of `file` read-only.
pub fn map_file(file: &File) -> io::Result<Image> {
    // Safety: the map is read-only and lives no longer than the detection
    // that borrows it.
    let mmap = unsafe { Mmap::map(file)? };
    debug!(len = mmap.len(), "mapped image");
    Ok(Image::Mapped(mmap))
}

/// Move the read position back to the start of the source.
pub fn rewind<R: Seek + ?Sized>(reader: &mut R) -> io::Result<()> {
    reader.seek(SeekFrom::Start(0)).map(|_| ())
}

/// Read exactly the classification header.
///
/// Sources shorter than [`HEADER_SIZE`] fail with `UnexpectedEof`.
pub fn read_header<R: Read + ?Sized>(reader: &mut R) -> io::Result<[u8; HEADER_SIZE]> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;
    Ok(header)
}

/// Read up to `limit` bytes from the current position. I/O errors are
/// returned to the caller.
pub fn read_bounded<R: Read>(reader: &mut R, limit: u64) -> io::Result<Vec<u8>> {
    let mut bounded = BoundedReader::new(reader, limit);
    let mut data = Vec::new();
    bounded.read_to_end(&mut data)?;
    if bounded.exhausted() {
        warn!(limit, "read limit reached, analyzing prefix only");
    }
    Ok(data)
}

/// Fill up to `limit` bytes from the current position, keeping whatever was
/// read before an error or EOF.
pub fn read_window<R: Read>(reader: &mut R, limit: usize) -> Vec<u8> {
    let mut window = vec![0u8; limit];
    let mut filled = 0;
    while filled < limit {
        match reader.read(&mut window[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(error = %e, filled, "window read stopped early");
                break;
            }
        }
    }
    window.truncate(filled);
    window
}
