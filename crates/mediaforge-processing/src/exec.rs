//! Shared child-process runner for external encoder tools.
//!
//! One contract for every adapter: non-zero exit surfaces the last line of
//! the tool's diagnostic stream, a partial output file is removed before the
//! error is returned, and a zero exit without an output file on disk is
//! still a failure.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use mediaforge_core::error::{CompressionError, ConversionError};

#[derive(Debug, thiserror::Error)]
pub(crate) enum EncoderError {
    #[error("{tool} failed: {detail}")]
    Failed { tool: String, detail: String },

    #[error("output not produced")]
    OutputMissing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<EncoderError> for ConversionError {
    fn from(err: EncoderError) -> Self {
        match err {
            EncoderError::Failed { tool, detail } => ConversionError::ToolFailed { tool, detail },
            EncoderError::OutputMissing => ConversionError::OutputMissing,
            EncoderError::Io(e) => ConversionError::Io(e),
        }
    }
}

impl From<EncoderError> for CompressionError {
    fn from(err: EncoderError) -> Self {
        match err {
            EncoderError::Failed { tool, detail } => CompressionError::ToolFailed { tool, detail },
            EncoderError::OutputMissing => CompressionError::OutputMissing,
            EncoderError::Io(e) => CompressionError::Io(e),
        }
    }
}

/// Run an encoder invocation that is expected to produce `expected_output`.
pub(crate) async fn run_encoder(
    program: &str,
    args: &[String],
    expected_output: &Path,
) -> Result<(), EncoderError> {
    let tool = tool_name(program);
    tracing::debug!(tool = %tool, args = ?args, "spawning encoder");

    let output = Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = last_diagnostic_line(&stderr);
        tracing::warn!(tool = %tool, exit = ?output.status.code(), detail = %detail, "encoder failed");
        remove_partial_output(expected_output).await;
        return Err(EncoderError::Failed {
            tool: tool.to_string(),
            detail,
        });
    }

    // Exit code 0 does not by itself guarantee an artifact.
    if tokio::fs::metadata(expected_output).await.is_err() {
        tracing::warn!(tool = %tool, output = %expected_output.display(), "encoder exited 0 but produced no output");
        return Err(EncoderError::OutputMissing);
    }

    Ok(())
}

/// Best-effort removal of a partially written output. A failure here is
/// logged and must not mask the primary error.
pub(crate) async fn remove_partial_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed partial output");
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output");
        }
    }
}

fn last_diagnostic_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no diagnostic output")
        .to_string()
}

fn tool_name(program: &str) -> &str {
    Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_diagnostic_line_skips_blanks() {
        let stderr = "frame=  100\nError opening input\n\n   \n";
        assert_eq!(last_diagnostic_line(stderr), "Error opening input");
    }

    #[test]
    fn test_last_diagnostic_line_empty_stream() {
        assert_eq!(last_diagnostic_line(""), "no diagnostic output");
    }

    #[test]
    fn test_tool_name_strips_directories() {
        assert_eq!(tool_name("/usr/local/bin/ffmpeg"), "ffmpeg");
        assert_eq!(tool_name("gs"), "gs");
    }

    #[tokio::test]
    async fn test_run_encoder_missing_program_is_io_error() {
        let result = run_encoder(
            "/nonexistent/encoder-binary",
            &["-i".to_string()],
            Path::new("/tmp/never-made.mp4"),
        )
        .await;
        assert!(matches!(result, Err(EncoderError::Io(_))));
    }

    #[tokio::test]
    async fn test_failed_tool_reports_last_stderr_line() {
        // `sh -c` stands in for an encoder that writes diagnostics and
        // exits non-zero.
        let args = vec![
            "-c".to_string(),
            "echo progress >&2; echo 'fatal: bad input' >&2; exit 1".to_string(),
        ];
        let result = run_encoder("sh", &args, Path::new("/tmp/never-made.mp4")).await;
        match result {
            Err(EncoderError::Failed { detail, .. }) => {
                assert_eq!(detail, "fatal: bad input");
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_tool_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("partial.mp4");
        let args = vec![
            "-c".to_string(),
            format!("echo partial > {}; echo boom >&2; exit 1", output.display()),
        ];
        let result = run_encoder("sh", &args, &output).await;
        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_zero_exit_without_output_is_missing() {
        let args = vec!["-c".to_string(), "true".to_string()];
        let result = run_encoder("sh", &args, Path::new("/tmp/not-created-by-test.mp4")).await;
        assert!(matches!(result, Err(EncoderError::OutputMissing)));
    }

    #[tokio::test]
    async fn test_success_when_output_exists() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("done.mp4");
        let args = vec![
            "-c".to_string(),
            format!("echo data > {}", output.display()),
        ];
        run_encoder("sh", &args, &output).await.unwrap();
        assert!(output.exists());
    }
}
