//! MP4 re-encode compressor.

use std::path::Path;

use async_trait::async_trait;

use mediaforge_core::error::CompressionError;
use mediaforge_core::models::Artifact;
use mediaforge_core::naming::unique_output_name;
use mediaforge_core::Config;

use crate::exec::run_encoder;
use crate::traits::{CompressionSpec, Compressor};

/// Highest CRF libx264 accepts.
const MAX_CRF: u8 = 51;

/// Re-encodes MP4 at a constant-quality level. Lower CRF means higher
/// quality and a larger file.
pub struct Mp4Compressor {
    ffmpeg_path: String,
    threads: u32,
}

impl Mp4Compressor {
    pub fn new(config: &Config) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            threads: config.encoder_threads,
        }
    }

    fn args(&self, input: &Path, output: &Path, crf: u8) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-crf".to_string(),
            crf.to_string(),
            "-preset".to_string(),
            "medium".to_string(),
            "-tune".to_string(),
            "film".to_string(),
            "-x264-params".to_string(),
            "nal-hrd=cbr:force-cfr=1".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            "128k".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            "-threads".to_string(),
            self.threads.to_string(),
            "-y".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Compressor for Mp4Compressor {
    fn options(&self) -> Vec<String> {
        vec!["MP4 (CRF 28)".to_string(), "MP4 (CRF 24)".to_string()]
    }

    async fn compress(
        &self,
        input: &Path,
        output_dir: &Path,
        spec: CompressionSpec,
    ) -> Result<Artifact, CompressionError> {
        let crf = match spec {
            CompressionSpec::VideoCrf(crf) => crf,
            other => {
                return Err(CompressionError::UnsupportedLevel(format!(
                    "video compressor received {:?}",
                    other
                )))
            }
        };
        if crf > MAX_CRF {
            return Err(CompressionError::UnsupportedLevel(format!(
                "CRF {} outside 0-{}",
                crf, MAX_CRF
            )));
        }

        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("video");
        let file_name =
            unique_output_name(&format!("{}_compressed.mp4", stem), Some("mp4"));
        let output_path = output_dir.join(&file_name);

        let args = self.args(input, &output_path, crf);
        run_encoder(&self.ffmpeg_path, &args, &output_path).await?;

        let size_bytes = tokio::fs::metadata(&output_path).await?.len();
        tracing::info!(
            input = %input.display(),
            artifact = %file_name,
            crf = crf,
            size_bytes = size_bytes,
            "video compression completed"
        );

        Ok(Artifact {
            file_name,
            size_bytes,
        })
    }
}
