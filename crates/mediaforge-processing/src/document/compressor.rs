//! Two-tier PDF compressor.
//!
//! Tier 1 rewrites the document in-process, recompressing embedded JPEG
//! image streams at the tier's quality. Tier 2 hands the original to
//! Ghostscript with a preset mapped from the quality tier. Escalation
//! happens when tier 1 errors, or when its artifact is still above the
//! configured size threshold. A failed compression leaves the original
//! untouched and no partial artifact behind.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use lopdf::{Dictionary, Document, Object};

use mediaforge_core::error::CompressionError;
use mediaforge_core::models::{Artifact, PdfQuality};
use mediaforge_core::naming::unique_output_name;
use mediaforge_core::Config;

use crate::exec::{remove_partial_output, run_encoder};
use crate::traits::{CompressionSpec, Compressor};

pub struct PdfCompressor {
    ghostscript_path: String,
    threshold_bytes: u64,
}

impl PdfCompressor {
    pub fn new(config: &Config) -> Self {
        Self {
            ghostscript_path: config.ghostscript_path.clone(),
            threshold_bytes: config.pdf_gs_threshold_bytes,
        }
    }

    /// Tier 1: load, recompress embedded images, save. Runs off the async
    /// runtime; any error here falls through to Ghostscript.
    async fn rewrite_in_process(
        &self,
        input: PathBuf,
        output: PathBuf,
        quality: PdfQuality,
    ) -> anyhow::Result<()> {
        let jpeg_quality = quality.jpeg_quality();
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let mut doc = Document::load(&input)?;
            let recompressed = recompress_embedded_images(&mut doc, jpeg_quality);
            tracing::debug!(
                input = %input.display(),
                recompressed = recompressed,
                "rewrote PDF image streams"
            );
            doc.compress();
            doc.save(&output)?;
            Ok(())
        })
        .await
        .map_err(|e| anyhow::anyhow!("rewrite task failed: {}", e))?
    }

    async fn run_ghostscript(
        &self,
        input: &Path,
        output: &Path,
        quality: PdfQuality,
    ) -> Result<(), CompressionError> {
        let args = vec![
            "-sDEVICE=pdfwrite".to_string(),
            "-dCompatibilityLevel=1.4".to_string(),
            format!("-dPDFSETTINGS={}", quality.gs_preset()),
            "-dNOPAUSE".to_string(),
            "-dQUIET".to_string(),
            "-dBATCH".to_string(),
            format!("-sOutputFile={}", output.display()),
            input.to_string_lossy().to_string(),
        ];
        run_encoder(&self.ghostscript_path, &args, output).await?;
        Ok(())
    }
}

#[async_trait]
impl Compressor for PdfCompressor {
    fn options(&self) -> Vec<String> {
        vec![
            "PDF (high)".to_string(),
            "PDF (medium)".to_string(),
            "PDF (low)".to_string(),
        ]
    }

    async fn compress(
        &self,
        input: &Path,
        output_dir: &Path,
        spec: CompressionSpec,
    ) -> Result<Artifact, CompressionError> {
        let quality = match spec {
            CompressionSpec::DocumentQuality(quality) => quality,
            other => {
                return Err(CompressionError::UnsupportedLevel(format!(
                    "document compressor received {:?}",
                    other
                )))
            }
        };

        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let file_name = unique_output_name(&format!("{}_compressed.pdf", stem), Some("pdf"));
        let output_path = output_dir.join(&file_name);

        match self
            .rewrite_in_process(input.to_path_buf(), output_path.clone(), quality)
            .await
        {
            Ok(()) => {
                let size = tokio::fs::metadata(&output_path).await?.len();
                if size > self.threshold_bytes {
                    tracing::info!(
                        size_bytes = size,
                        threshold_bytes = self.threshold_bytes,
                        "rewritten PDF still above threshold, escalating to ghostscript"
                    );
                    self.run_ghostscript(input, &output_path, quality).await?;
                }
            }
            Err(e) => {
                tracing::warn!(
                    input = %input.display(),
                    error = %e,
                    "in-process PDF rewrite failed, falling back to ghostscript"
                );
                remove_partial_output(&output_path).await;
                self.run_ghostscript(input, &output_path, quality).await?;
            }
        }

        let size_bytes = tokio::fs::metadata(&output_path).await?.len();
        tracing::info!(
            input = %input.display(),
            artifact = %file_name,
            quality = quality.label(),
            size_bytes = size_bytes,
            "PDF compression completed"
        );

        Ok(Artifact {
            file_name,
            size_bytes,
        })
    }
}

/// Replace DCT-encoded image streams with a re-encode at `jpeg_quality`
/// when that makes them smaller. Streams that fail to decode are left
/// untouched. Returns the number of replaced streams.
fn recompress_embedded_images(doc: &mut Document, jpeg_quality: u8) -> usize {
    let mut replaced = 0;

    for object in doc.objects.values_mut() {
        let Object::Stream(stream) = object else {
            continue;
        };
        if !is_jpeg_image_stream(&stream.dict) {
            continue;
        }

        let Ok(img) = image::load_from_memory(&stream.content) else {
            continue;
        };

        let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());
        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), jpeg_quality);
        if rgb.write_with_encoder(encoder).is_err() {
            continue;
        }

        if buf.len() < stream.content.len() {
            stream.set_content(buf);
            replaced += 1;
        }
    }

    replaced
}

fn is_jpeg_image_stream(dict: &Dictionary) -> bool {
    if !matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image") {
        return false;
    }

    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => name == b"DCTDecode",
        Ok(Object::Array(filters)) => filters
            .iter()
            .any(|f| matches!(f, Object::Name(name) if name == b"DCTDecode")),
        _ => false,
    }
}
