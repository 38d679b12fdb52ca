//! Dispatch outcome models.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Reported status of a dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Error,
}

/// A file produced by a converter or compressor. The size travels with the
/// name so callers never have to re-stat the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub file_name: String,
    pub size_bytes: u64,
}

/// Before/after size metrics for a compression action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeReport {
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    /// Space saved relative to the original, e.g. "40.00%". Negative when
    /// the output grew.
    pub space_saved: String,
}

impl SizeReport {
    pub fn new(original_bytes: u64, compressed_bytes: u64) -> Self {
        let space_saved = if original_bytes == 0 {
            "0.00%".to_string()
        } else {
            let saved = (original_bytes as f64 - compressed_bytes as f64)
                / original_bytes as f64
                * 100.0;
            format!("{:.2}%", saved)
        };
        Self {
            original_bytes,
            compressed_bytes,
            space_saved,
        }
    }
}

/// The structured outcome of one dispatch call. Built once, never mutated;
/// the caller always receives one of these, never a raw error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub status: ActionStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// Additional download references when an operation produces more than
    /// one artifact (PDF split).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_downloads: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<SizeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<String>,
}

impl ActionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Success,
            message: message.into(),
            download_url: None,
            extra_downloads: Vec::new(),
            compression: None,
            error_category: None,
        }
    }

    /// Build an error result. The message carries the underlying error text
    /// verbatim; the category is the taxonomy code.
    pub fn failure(err: &DispatchError) -> Self {
        Self {
            status: ActionStatus::Error,
            message: err.to_string(),
            download_url: None,
            extra_downloads: Vec::new(),
            compression: None,
            error_category: Some(err.category().to_string()),
        }
    }

    pub fn with_download(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    pub fn with_extra_downloads(mut self, urls: Vec<String>) -> Self {
        self.extra_downloads = urls;
        self
    }

    pub fn with_compression(mut self, report: SizeReport) -> Self {
        self.compression = Some(report);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }
}
