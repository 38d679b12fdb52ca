//! Uploaded-file summary model.

use serde::{Deserialize, Serialize};

/// Read-only view of an uploaded file and the operations currently
/// available for it. Computed fresh per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSummary {
    pub filename: String,
    /// Human-readable size, e.g. "12.34 MB".
    pub size: String,
    pub size_bytes: u64,
    pub created: String,
    pub modified: String,
    #[serde(rename = "type")]
    pub extension: String,
    pub convertible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conversion_options: Vec<String>,
    pub compressible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compression_options: Vec<String>,
    /// Document-specific operations (PDF split/merge), empty otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub document_operations: Vec<String>,
}

/// Format a byte count the way the upload page displays it.
pub fn human_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}
