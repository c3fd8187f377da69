//! Detection pipeline: sniff, analyze, scan, aggregate.
//!
//! Every phase starts from offset 0 of the same source. Only failing to
//! open the file, read the 8-byte header or rewind is fatal; everything
//! else degrades into evidence entries on the returned result.

pub mod aggregate;
pub mod analyzers;
pub mod patterns;
pub mod sniffer;

use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::DetectorConfig;
use crate::core::DetectionResult;
use crate::error::Result;
use crate::io::{self, Image};
use patterns::SCAN_WINDOW;
use sniffer::{sniff, Classification};

/// Evidence recorded for containers without a structural analyzer.
pub const UNSUPPORTED_FORMAT: &str = "Unsupported binary format";

/// Runs the detection pipeline with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect the source language of the file at `path`.
    pub fn detect_path<P: AsRef<Path>>(&self, path: P) -> Result<DetectionResult> {
        let path = path.as_ref();
        let span = crate::detect_span!(path.display());
        let _enter = span.enter();

        let mut file = File::open(path)?;
        self.run(&mut file, |file: &mut File| io::map_file(file))
    }

    /// Detect the source language of any seekable byte source.
    ///
    /// The structural analyzers see at most `max_image_bytes` of it.
    pub fn detect_reader<R: Read + Seek>(&self, reader: &mut R) -> Result<DetectionResult> {
        let limit = self.config.max_image_bytes;
        self.run(reader, |reader: &mut R| {
            io::read_bounded(reader, limit).map(Image::Buffered)
        })
    }

    /// Shared pipeline; `load_image` produces the structural input from the
    /// rewound source.
    fn run<R, F>(&self, reader: &mut R, load_image: F) -> Result<DetectionResult>
    where
        R: Read + Seek,
        F: FnOnce(&mut R) -> std::io::Result<Image>,
    {
        io::rewind(reader)?;
        let header = io::read_header(reader)?;
        let Classification { format, platform } = sniff(&header);
        let mut result = DetectionResult::new(format, platform);
        io::rewind(reader)?;

        if format.is_analyzable() {
            match load_image(reader) {
                Ok(image) => {
                    debug!(format = %format, bytes = image.len(), "running structural analyzer");
                    analyzers::analyze(format, &image, &self.config, &mut result);
                }
                Err(e) => {
                    warn!(format = %format, error = %e, "failed to load image");
                    result.note(format!("Failed to read {} image: {}", format, e));
                }
            }
        } else {
            result.note(UNSUPPORTED_FORMAT);
        }

        io::rewind(reader)?;
        let window = io::read_window(reader, SCAN_WINDOW);
        patterns::scan(&window, &mut result);

        aggregate::finalize(&mut result);
        info!(
            format = %result.container_format,
            language = %result.primary_language,
            confidence = result.confidence,
            evidence = result.evidence.len(),
            "detection complete"
        );
        Ok(result)
    }

    /// Detect several files in parallel. Each file gets its own handle and
    /// its own result; output order follows input order.
    pub fn detect_many<I, P>(&self, paths: I) -> Vec<(PathBuf, Result<DetectionResult>)>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        paths
            .into_par_iter()
            .map(|path| {
                let result = self.detect_path(&path);
                (path, result)
            })
            .collect()
    }
}

/// Detect the source language of one file with the default configuration.
pub fn detect_source_language<P: AsRef<Path>>(path: P) -> Result<DetectionResult> {
    Detector::default().detect_path(path)
}

/// Detect several files in parallel with the default configuration.
pub fn detect_many<I, P>(paths: I) -> Vec<(PathBuf, Result<DetectionResult>)>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    Detector::default().detect_many(paths)
}
