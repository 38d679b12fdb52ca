//! WAV to MP3 converter.

use std::path::Path;

use async_trait::async_trait;

use mediaforge_core::error::ConversionError;
use mediaforge_core::models::Artifact;
use mediaforge_core::naming::unique_output_name;
use mediaforge_core::Config;

use crate::exec::run_encoder;
use crate::traits::Converter;

const MP3_BITRATE: &str = "192k";

/// Converts WAV audio to MP3 via ffmpeg.
pub struct Mp3Converter {
    ffmpeg_path: String,
}

impl Mp3Converter {
    pub fn new(config: &Config) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
        }
    }

    fn args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-acodec".to_string(),
            "libmp3lame".to_string(),
            "-b:a".to_string(),
            MP3_BITRATE.to_string(),
            "-y".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Converter for Mp3Converter {
    fn target_label(&self) -> &'static str {
        "MP3"
    }

    fn target_extension(&self) -> &'static str {
        "mp3"
    }

    async fn convert(
        &self,
        input: &Path,
        desired_name: &str,
        output_dir: &Path,
    ) -> Result<Artifact, ConversionError> {
        let file_name = unique_output_name(desired_name, Some(self.target_extension()));
        let output_path = output_dir.join(&file_name);

        let args = self.args(input, &output_path);
        run_encoder(&self.ffmpeg_path, &args, &output_path).await?;

        let size_bytes = tokio::fs::metadata(&output_path).await?.len();
        tracing::info!(
            input = %input.display(),
            artifact = %file_name,
            "audio conversion completed"
        );

        Ok(Artifact {
            file_name,
            size_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_use_lame_at_fixed_bitrate() {
        let converter = Mp3Converter::new(&Config::default());
        let args = converter
            .args(Path::new("voice.wav"), Path::new("voice.mp3"))
            .join(" ");
        assert!(args.contains("-acodec libmp3lame"));
        assert!(args.contains("-b:a 192k"));
        assert!(args.ends_with("-y voice.mp3"));
    }

    #[test]
    fn test_target_metadata() {
        let converter = Mp3Converter::new(&Config::default());
        assert_eq!(converter.target_label(), "MP3");
        assert_eq!(converter.target_extension(), "mp3");
    }
}
