//! MediaForge core library
//!
//! Domain models, error taxonomy, configuration, and output-name generation
//! shared by the processing pipeline and the CLI.

pub mod config;
pub mod error;
pub mod models;
pub mod naming;

// Re-export commonly used types
pub use config::Config;
pub use error::{CompressionError, ConversionError, DispatchError, DocumentError};
pub use models::action::{Action, ActionFamily, PdfQuality};
pub use models::result::{ActionResult, ActionStatus, Artifact, SizeReport};
pub use models::summary::FileSummary;
pub use naming::unique_output_name;
