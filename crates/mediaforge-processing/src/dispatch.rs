//! Action dispatcher.
//!
//! The orchestration core: parse the action once, resolve the handler for
//! the file's extension, run it, clean up the original, and report a
//! structured outcome. Every failure is translated into an `ActionResult`;
//! callers never see a raw error. Requests that cannot be routed are
//! rejected before any external process is spawned.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mediaforge_core::error::{ConversionError, DispatchError, DocumentError};
use mediaforge_core::models::{Action, ActionFamily, ActionResult, Artifact, SizeReport};
use mediaforge_core::Config;

use crate::document::PdfOps;
use crate::registry::{CompressorRegistry, ConverterRegistry};
use crate::traits::CompressionSpec;

pub struct Dispatcher {
    converters: Arc<ConverterRegistry>,
    compressors: Arc<CompressorRegistry>,
    pdf_ops: PdfOps,
    config: Arc<Config>,
}

impl Dispatcher {
    pub fn new(
        converters: Arc<ConverterRegistry>,
        compressors: Arc<CompressorRegistry>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            converters,
            compressors,
            pdf_ops: PdfOps,
            config,
        }
    }

    /// Dispatch an action on a single input file.
    pub async fn dispatch_file(&self, input: &Path, action: &str) -> ActionResult {
        let inputs = [input.to_path_buf()];
        self.dispatch(&inputs, action).await
    }

    /// Dispatch an action. `merge_pdf` takes two or more inputs, every
    /// other family exactly one. Always returns a well-formed result.
    pub async fn dispatch(&self, inputs: &[PathBuf], action: &str) -> ActionResult {
        match self.run(inputs, action).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    action = action,
                    category = err.category(),
                    error = %err,
                    "dispatch failed"
                );
                ActionResult::failure(&err)
            }
        }
    }

    async fn run(&self, inputs: &[PathBuf], action_str: &str) -> Result<ActionResult, DispatchError> {
        let action = Action::parse(action_str)?;
        tracing::info!(action = action_str, inputs = inputs.len(), "dispatching action");

        self.check_arity(action, inputs)?;

        // Existence check and input size capture, before anything runs.
        let mut input_sizes = Vec::with_capacity(inputs.len());
        for input in inputs {
            let meta = tokio::fs::metadata(input).await.map_err(|e| {
                DispatchError::Validation(format!(
                    "input file not found: {} ({})",
                    input.display(),
                    e
                ))
            })?;
            input_sizes.push(meta.len());
        }

        let primary = &inputs[0];
        let extension = extension_of(primary);

        match action {
            Action::Convert => self.run_convert(primary, &extension).await,
            Action::CompressVideo { crf } => {
                self.run_compress(
                    primary,
                    &extension,
                    CompressionSpec::VideoCrf(crf),
                    input_sizes[0],
                    format!("File compressed with CRF {}", crf),
                )
                .await
            }
            Action::CompressPdf { quality } => {
                self.run_compress(
                    primary,
                    &extension,
                    CompressionSpec::DocumentQuality(quality),
                    input_sizes[0],
                    format!("PDF compressed at {} quality", quality.label()),
                )
                .await
            }
            Action::SplitPdf { at_page } => self.run_split(primary, &extension, at_page).await,
            Action::MergePdf => self.run_merge(inputs).await,
        }
    }

    fn check_arity(&self, action: Action, inputs: &[PathBuf]) -> Result<(), DispatchError> {
        match action.family() {
            ActionFamily::Merge => {
                if inputs.len() < 2 {
                    return Err(DispatchError::Validation(format!(
                        "merge requires at least two inputs, got {}",
                        inputs.len()
                    )));
                }
            }
            _ => {
                if inputs.len() != 1 {
                    return Err(DispatchError::Validation(format!(
                        "action takes exactly one input, got {}",
                        inputs.len()
                    )));
                }
            }
        }
        Ok(())
    }

    async fn run_convert(
        &self,
        input: &Path,
        extension: &str,
    ) -> Result<ActionResult, DispatchError> {
        let converter = self.converters.get(extension).ok_or_else(|| {
            DispatchError::UnsupportedAction(format!(
                "no converter registered for '{}' files",
                extension
            ))
        })?;

        let desired_name = format!(
            "{}_converted.{}",
            file_stem(input),
            converter.target_extension()
        );
        let artifact = converter
            .convert(input, &desired_name, &self.config.convert_output_dir)
            .await?;

        self.remove_original(input).await;

        Ok(
            ActionResult::success("Conversion completed successfully")
                .with_download(self.download_url(&artifact.file_name)),
        )
    }

    async fn run_compress(
        &self,
        input: &Path,
        extension: &str,
        spec: CompressionSpec,
        original_size: u64,
        message: String,
    ) -> Result<ActionResult, DispatchError> {
        let compressor = self.compressors.get(extension).ok_or_else(|| {
            DispatchError::UnsupportedAction(format!(
                "no compressor registered for '{}' files",
                extension
            ))
        })?;

        let artifact = compressor
            .compress(input, &self.config.compress_output_dir, spec)
            .await?;

        self.remove_original(input).await;

        Ok(ActionResult::success(message)
            .with_download(self.download_url(&artifact.file_name))
            .with_compression(SizeReport::new(original_size, artifact.size_bytes)))
    }

    async fn run_split(
        &self,
        input: &Path,
        extension: &str,
        at_page: Option<u32>,
    ) -> Result<ActionResult, DispatchError> {
        if extension != "pdf" {
            return Err(DispatchError::UnsupportedAction(format!(
                "split is only available for PDF files, not '{}'",
                extension
            )));
        }

        let artifacts = self
            .pdf_ops
            .split_file(input, at_page, &self.config.convert_output_dir)
            .await
            .map_err(map_document_error)?;

        self.remove_original(input).await;

        let mut urls = artifacts
            .iter()
            .map(|a: &Artifact| self.download_url(&a.file_name));
        let first = urls.next();
        let rest: Vec<String> = urls.collect();

        let mut result = ActionResult::success("PDF split into 2 parts");
        if let Some(url) = first {
            result = result.with_download(url);
        }
        Ok(result.with_extra_downloads(rest))
    }

    async fn run_merge(&self, inputs: &[PathBuf]) -> Result<ActionResult, DispatchError> {
        for input in inputs {
            let extension = extension_of(input);
            if extension != "pdf" {
                return Err(DispatchError::UnsupportedAction(format!(
                    "merge is only available for PDF files, not '{}'",
                    extension
                )));
            }
        }

        let artifact = self
            .pdf_ops
            .merge_files(inputs, &self.config.convert_output_dir)
            .await
            .map_err(map_document_error)?;

        for input in inputs {
            self.remove_original(input).await;
        }

        Ok(
            ActionResult::success(format!("Merged {} documents", inputs.len()))
                .with_download(self.download_url(&artifact.file_name)),
        )
    }

    fn download_url(&self, file_name: &str) -> String {
        format!(
            "{}/{}",
            self.config.download_url_prefix.trim_end_matches('/'),
            file_name
        )
    }

    /// Best-effort removal of a consumed original. Failure is logged and
    /// never changes the reported outcome.
    async fn remove_original(&self, input: &Path) {
        match tokio::fs::remove_file(input).await {
            Ok(()) => {
                tracing::debug!(path = %input.display(), "removed original upload");
            }
            Err(e) => {
                tracing::warn!(
                    path = %input.display(),
                    error = %e,
                    "failed to remove original upload"
                );
            }
        }
    }
}

fn map_document_error(err: DocumentError) -> DispatchError {
    match err {
        DocumentError::PageOutOfRange(msg) => DispatchError::Validation(msg),
        DocumentError::Malformed(msg) => {
            DispatchError::Conversion(ConversionError::InvalidDocument(msg))
        }
        DocumentError::Io(e) => DispatchError::Conversion(ConversionError::Io(e)),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("file")
}
