//! FFmpeg-backed video converters.
//!
//! One adapter type, parameterized by a per-container profile. The argument
//! set is fixed per (source format, action) pair; only the generic profile
//! consults ffprobe first, to pick stream copy over a re-encode when the
//! source codec already fits an MP4 container.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use mediaforge_core::error::ConversionError;
use mediaforge_core::models::Artifact;
use mediaforge_core::naming::unique_output_name;
use mediaforge_core::Config;

use crate::exec::run_encoder;
use crate::traits::Converter;

/// Fixed conversion argument profiles, one per source container family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionProfile {
    /// Matroska already carries MP4-compatible streams: remux without
    /// re-encoding.
    MatroskaRemux,
    AviTranscode,
    WindowsMediaTranscode,
    QuickTimeTranscode,
    WebmTranscode,
    /// Long-tail containers: probe the video codec and stream-copy when the
    /// container is the only problem.
    GenericVideo,
}

impl ConversionProfile {
    fn needs_probe(self) -> bool {
        matches!(self, ConversionProfile::GenericVideo)
    }

    /// Build the ffmpeg argument list for this profile.
    fn args(self, input: &Path, output: &Path, probed_codec: Option<&str>) -> Vec<String> {
        let mut args = vec!["-i".to_string(), input.to_string_lossy().to_string()];

        match self {
            ConversionProfile::MatroskaRemux => {
                args.extend_from_slice(&[
                    "-codec".to_string(),
                    "copy".to_string(),
                    "-movflags".to_string(),
                    "+faststart".to_string(),
                ]);
            }
            ConversionProfile::AviTranscode => {
                args.extend_from_slice(&[
                    "-c:v".to_string(),
                    "libx264".to_string(),
                    "-c:a".to_string(),
                    "aac".to_string(),
                    "-strict".to_string(),
                    "experimental".to_string(),
                ]);
            }
            ConversionProfile::WindowsMediaTranscode => {
                args.extend_from_slice(&[
                    "-c:v".to_string(),
                    "libx264".to_string(),
                    "-preset".to_string(),
                    "fast".to_string(),
                    "-c:a".to_string(),
                    "aac".to_string(),
                    "-movflags".to_string(),
                    "+faststart".to_string(),
                ]);
            }
            ConversionProfile::QuickTimeTranscode => {
                args.extend_from_slice(&[
                    "-c:v".to_string(),
                    "libx264".to_string(),
                    "-crf".to_string(),
                    "23".to_string(),
                    "-preset".to_string(),
                    "fast".to_string(),
                    "-c:a".to_string(),
                    "aac".to_string(),
                    "-movflags".to_string(),
                    "+faststart".to_string(),
                ]);
            }
            ConversionProfile::WebmTranscode => {
                args.extend_from_slice(&[
                    "-c:v".to_string(),
                    "libx264".to_string(),
                    "-preset".to_string(),
                    "medium".to_string(),
                    "-crf".to_string(),
                    "23".to_string(),
                    "-c:a".to_string(),
                    "aac".to_string(),
                    "-b:a".to_string(),
                    "128k".to_string(),
                ]);
            }
            ConversionProfile::GenericVideo => {
                match probed_codec {
                    Some("h264") | Some("h265") | Some("hevc") => {
                        args.extend_from_slice(&["-c:v".to_string(), "copy".to_string()]);
                    }
                    Some("mpeg4") => {
                        args.extend_from_slice(&[
                            "-c:v".to_string(),
                            "libx264".to_string(),
                            "-preset".to_string(),
                            "medium".to_string(),
                            "-crf".to_string(),
                            "23".to_string(),
                        ]);
                    }
                    _ => {
                        args.extend_from_slice(&[
                            "-c:v".to_string(),
                            "libx264".to_string(),
                            "-preset".to_string(),
                            "slow".to_string(),
                            "-crf".to_string(),
                            "26".to_string(),
                        ]);
                    }
                }
                args.extend_from_slice(&[
                    "-c:a".to_string(),
                    "aac".to_string(),
                    "-b:a".to_string(),
                    "128k".to_string(),
                    "-movflags".to_string(),
                    "+faststart".to_string(),
                ]);
            }
        }

        args.push("-y".to_string());
        args.push(output.to_string_lossy().to_string());
        args
    }
}

/// Converts a source video container to MP4 via ffmpeg.
pub struct FfmpegConverter {
    ffmpeg_path: String,
    ffprobe_path: String,
    profile: ConversionProfile,
}

impl FfmpegConverter {
    pub fn new(config: &Config, profile: ConversionProfile) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            profile,
        }
    }

    /// Probe the first video stream's codec name.
    async fn probe_video_codec(&self, input: &Path) -> Result<String, ConversionError> {
        let args = [
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=codec_name",
            "-of",
            "default=nokey=1:noprint_wrappers=1",
        ];

        let output = Command::new(&self.ffprobe_path)
            .args(args)
            .arg(input)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr
                .lines()
                .rev()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("codec probe failed")
                .to_string();
            return Err(ConversionError::ToolFailed {
                tool: "ffprobe".to_string(),
                detail,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    fn target_label(&self) -> &'static str {
        "MP4"
    }

    fn target_extension(&self) -> &'static str {
        "mp4"
    }

    async fn convert(
        &self,
        input: &Path,
        desired_name: &str,
        output_dir: &Path,
    ) -> Result<Artifact, ConversionError> {
        let file_name = unique_output_name(desired_name, Some(self.target_extension()));
        let output_path = output_dir.join(&file_name);

        let probed_codec = if self.profile.needs_probe() {
            let codec = self.probe_video_codec(input).await?;
            tracing::debug!(input = %input.display(), codec = %codec, "probed source codec");
            Some(codec)
        } else {
            None
        };

        let args = self
            .profile
            .args(input, &output_path, probed_codec.as_deref());
        run_encoder(&self.ffmpeg_path, &args, &output_path).await?;

        let size_bytes = tokio::fs::metadata(&output_path).await?.len();
        tracing::info!(
            input = %input.display(),
            artifact = %file_name,
            size_bytes = size_bytes,
            "conversion completed"
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

    fn arg_string(profile: ConversionProfile, codec: Option<&str>) -> String {
        profile
            .args(Path::new("in.src"), Path::new("out.mp4"), codec)
            .join(" ")
    }

    #[test]
    fn test_matroska_profile_is_a_remux() {
        let args = arg_string(ConversionProfile::MatroskaRemux, None);
        assert!(args.contains("-codec copy"));
        assert!(args.contains("-movflags +faststart"));
        assert!(!args.contains("libx264"));
    }

    #[test]
    fn test_avi_profile_reencodes() {
        let args = arg_string(ConversionProfile::AviTranscode, None);
        assert!(args.contains("-c:v libx264"));
        assert!(args.contains("-c:a aac"));
    }

    #[test]
    fn test_quicktime_profile_uses_crf_23() {
        let args = arg_string(ConversionProfile::QuickTimeTranscode, None);
        assert!(args.contains("-crf 23"));
        assert!(args.contains("-preset fast"));
    }

    #[test]
    fn test_generic_profile_copies_compatible_codecs() {
        for codec in ["h264", "h265", "hevc"] {
            let args = arg_string(ConversionProfile::GenericVideo, Some(codec));
            assert!(args.contains("-c:v copy"), "codec {} should stream-copy", codec);
        }
    }

    #[test]
    fn test_generic_profile_reencodes_mpeg4_at_crf_23() {
        let args = arg_string(ConversionProfile::GenericVideo, Some("mpeg4"));
        assert!(args.contains("-c:v libx264"));
        assert!(args.contains("-preset medium"));
        assert!(args.contains("-crf 23"));
    }

    #[test]
    fn test_generic_profile_falls_back_to_slow_crf_26() {
        let args = arg_string(ConversionProfile::GenericVideo, Some("vp6"));
        assert!(args.contains("-preset slow"));
        assert!(args.contains("-crf 26"));
    }

    #[test]
    fn test_all_profiles_overwrite_and_end_with_output() {
        for profile in [
            ConversionProfile::MatroskaRemux,
            ConversionProfile::AviTranscode,
            ConversionProfile::WindowsMediaTranscode,
            ConversionProfile::QuickTimeTranscode,
            ConversionProfile::WebmTranscode,
            ConversionProfile::GenericVideo,
        ] {
            let args = profile.args(Path::new("in.src"), Path::new("out.mp4"), Some("h264"));
            let n = args.len();
            assert_eq!(args[n - 2], "-y");
            assert_eq!(args[n - 1], "out.mp4");
        }
    }

    #[test]
    fn test_only_generic_profile_probes() {
        assert!(ConversionProfile::GenericVideo.needs_probe());
        assert!(!ConversionProfile::MatroskaRemux.needs_probe());
        assert!(!ConversionProfile::WebmTranscode.needs_probe());
    }
}
