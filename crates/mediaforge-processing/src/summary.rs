//! File summary builder.
//!
//! Runs at upload time: size and timestamps always, available operations
//! based on what the registries can handle. A signature mismatch downgrades
//! `convertible` to false instead of raising; the upload itself is fine,
//! it just cannot be converted.

use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use mediaforge_core::error::DispatchError;
use mediaforge_core::models::summary::{human_size, FileSummary};

use crate::registry::{CompressorRegistry, ConverterRegistry};
use crate::signature;

/// Operations offered for PDFs beyond compression.
const PDF_OPERATIONS: &[&str] = &["split_pdf", "merge_pdf"];

pub struct SummaryBuilder {
    converters: Arc<ConverterRegistry>,
    compressors: Arc<CompressorRegistry>,
}

impl SummaryBuilder {
    pub fn new(converters: Arc<ConverterRegistry>, compressors: Arc<CompressorRegistry>) -> Self {
        Self {
            converters,
            compressors,
        }
    }

    pub async fn summarize(&self, path: &Path) -> Result<FileSummary, DispatchError> {
        let meta = tokio::fs::metadata(path).await.map_err(|e| {
            DispatchError::Validation(format!("cannot stat {}: {}", path.display(), e))
        })?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_else(|| "unknown".to_string());

        let modified = format_time(meta.modified().ok());
        // Creation time is not available on every filesystem.
        let created = format_time(meta.created().ok().or_else(|| meta.modified().ok()));

        let mut summary = FileSummary {
            filename,
            size: human_size(meta.len()),
            size_bytes: meta.len(),
            created,
            modified,
            extension: extension.clone(),
            convertible: false,
            conversion_options: Vec::new(),
            compressible: false,
            compression_options: Vec::new(),
            document_operations: Vec::new(),
        };

        if let Some(converter) = self.converters.get(&extension) {
            if signature::is_valid(path, &extension).await {
                summary.convertible = true;
                summary.conversion_options = vec![converter.target_label().to_string()];
            } else {
                tracing::debug!(
                    path = %path.display(),
                    extension = %extension,
                    "signature mismatch, reporting as not convertible"
                );
            }
        }

        if let Some(compressor) = self.compressors.get(&extension) {
            summary.compressible = true;
            summary.compression_options = compressor.options();
        }

        if extension == "pdf" {
            summary.document_operations =
                PDF_OPERATIONS.iter().map(|s| s.to_string()).collect();
        }

        Ok(summary)
    }
}

fn format_time(time: Option<SystemTime>) -> String {
    match time {
        Some(t) => DateTime::<Local>::from(t)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "unknown".to_string(),
    }
}
