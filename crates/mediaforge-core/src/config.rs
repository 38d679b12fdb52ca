//! Configuration module
//!
//! Environment-driven configuration for the processing core. External tool
//! paths and encoder parameters are configuration data, not code: the
//! argument sets the adapters build around them are fixed per operation.

use std::env;
use std::path::PathBuf;

const DEFAULT_MAX_UPLOAD_BYTES: u64 = 1024 * 1024 * 1024; // 1 GiB
const DEFAULT_VIDEO_CRF: u8 = 28;
const DEFAULT_ENCODER_THREADS: u32 = 2;
const DEFAULT_PDF_GS_THRESHOLD_BYTES: u64 = 50 * 1024 * 1024; // 50 MiB

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory uploads are staged in before processing.
    pub upload_dir: PathBuf,
    /// Download directory for conversion and document-operation artifacts.
    pub convert_output_dir: PathBuf,
    /// Download directory for compression artifacts.
    pub compress_output_dir: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub ghostscript_path: String,
    pub max_upload_size_bytes: u64,
    /// CRF used when a conversion profile re-encodes without an explicit level.
    pub default_video_crf: u8,
    /// Thread cap passed to the video encoder to bound per-request load.
    pub encoder_threads: u32,
    /// In-process PDF rewrites larger than this escalate to Ghostscript.
    pub pdf_gs_threshold_bytes: u64,
    /// Prefix for download references in results, e.g. "/downloads".
    pub download_url_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            convert_output_dir: PathBuf::from("converted/downloads"),
            compress_output_dir: PathBuf::from("compressed/downloads"),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            ghostscript_path: "gs".to_string(),
            max_upload_size_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            default_video_crf: DEFAULT_VIDEO_CRF,
            encoder_threads: DEFAULT_ENCODER_THREADS,
            pdf_gs_threshold_bytes: DEFAULT_PDF_GS_THRESHOLD_BYTES,
            download_url_prefix: "/downloads".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let defaults = Config::default();

        Ok(Config {
            upload_dir: env_path("MEDIAFORGE_UPLOAD_DIR", defaults.upload_dir),
            convert_output_dir: env_path("MEDIAFORGE_CONVERT_DIR", defaults.convert_output_dir),
            compress_output_dir: env_path("MEDIAFORGE_COMPRESS_DIR", defaults.compress_output_dir),
            ffmpeg_path: env_or("MEDIAFORGE_FFMPEG_PATH", defaults.ffmpeg_path),
            ffprobe_path: env_or("MEDIAFORGE_FFPROBE_PATH", defaults.ffprobe_path),
            ghostscript_path: env_or("MEDIAFORGE_GS_PATH", defaults.ghostscript_path),
            max_upload_size_bytes: env_parsed(
                "MEDIAFORGE_MAX_UPLOAD_BYTES",
                defaults.max_upload_size_bytes,
            )?,
            default_video_crf: env_parsed("MEDIAFORGE_DEFAULT_CRF", defaults.default_video_crf)?,
            encoder_threads: env_parsed("MEDIAFORGE_ENCODER_THREADS", defaults.encoder_threads)?,
            pdf_gs_threshold_bytes: env_parsed(
                "MEDIAFORGE_PDF_GS_THRESHOLD_BYTES",
                defaults.pdf_gs_threshold_bytes,
            )?,
            download_url_prefix: env_or("MEDIAFORGE_DOWNLOAD_PREFIX", defaults.download_url_prefix),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.default_video_crf > 51 {
            anyhow::bail!(
                "MEDIAFORGE_DEFAULT_CRF must be within 0-51, got {}",
                self.default_video_crf
            );
        }
        if self.encoder_threads == 0 {
            anyhow::bail!("MEDIAFORGE_ENCODER_THREADS must be at least 1");
        }
        if self.max_upload_size_bytes == 0 {
            anyhow::bail!("MEDIAFORGE_MAX_UPLOAD_BYTES must be non-zero");
        }
        for (name, value) in [
            ("ffmpeg", &self.ffmpeg_path),
            ("ffprobe", &self.ffprobe_path),
            ("ghostscript", &self.ghostscript_path),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("{} path must not be empty", name);
            }
        }
        Ok(())
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn env_path(key: &str, default: PathBuf) -> PathBuf {
    env::var(key).map(PathBuf::from).unwrap_or(default)
}

fn env_parsed<T>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid value for {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}
