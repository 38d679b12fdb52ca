//! Adapter traits for converters and compressors.
//!
//! Registries hold these as trait objects so the dispatcher stays decoupled
//! from the concrete tools, and tests can register mocks through the same
//! seam.

use std::path::Path;

use async_trait::async_trait;

use mediaforge_core::error::{CompressionError, ConversionError};
use mediaforge_core::models::{Artifact, PdfQuality};

/// Typed compression level, built once from the parsed action. Each adapter
/// accepts exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionSpec {
    VideoCrf(u8),
    DocumentQuality(PdfQuality),
}

/// A format converter. One registration per source extension.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Label surfaced in summary conversion options, e.g. "MP4".
    fn target_label(&self) -> &'static str;

    /// Extension of produced artifacts, without the dot.
    fn target_extension(&self) -> &'static str;

    /// Convert `input` into `output_dir`. `desired_name` is advisory: the
    /// adapter derives the real artifact name through the filename
    /// generator and must not trust the caller's name for placement.
    ///
    /// On failure no partial output may remain on disk.
    async fn convert(
        &self,
        input: &Path,
        desired_name: &str,
        output_dir: &Path,
    ) -> Result<Artifact, ConversionError>;
}

/// A compressor. One registration per compressible extension.
#[async_trait]
pub trait Compressor: Send + Sync {
    /// Options surfaced in summary compression options.
    fn options(&self) -> Vec<String>;

    /// Compress `input` into `output_dir` at the requested level.
    ///
    /// If a valid artifact cannot be produced the original input is left
    /// untouched and no partial output remains.
    async fn compress(
        &self,
        input: &Path,
        output_dir: &Path,
        spec: CompressionSpec,
    ) -> Result<Artifact, CompressionError>;
}
