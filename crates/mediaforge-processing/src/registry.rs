//! Converter and compressor registries.
//!
//! Built once at startup and handed to the dispatcher and the summary
//! builder; there is no process-wide singleton. Keys are lowercase source
//! extensions.

use std::collections::HashMap;
use std::sync::Arc;

use mediaforge_core::Config;

use crate::audio::Mp3Converter;
use crate::document::PdfCompressor;
use crate::traits::{Compressor, Converter};
use crate::video::{ConversionProfile, FfmpegConverter, Mp4Compressor};

/// Video containers handled by the probe-based generic converter.
const GENERIC_VIDEO_EXTENSIONS: &[&str] = &[
    "3g2", "3gp", "divx", "dv", "f4v", "flv", "m2ts", "m2v", "m4v", "mjpeg", "mpeg", "mpg",
    "mts", "mxf", "ogv", "rm", "rmvb", "tod", "ts", "vob", "wtv", "xvid",
];

/// Maps a source extension to its converter.
#[derive(Default)]
pub struct ConverterRegistry {
    by_extension: HashMap<String, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every stock converter, built from config.
    pub fn with_defaults(config: &Config) -> Self {
        let mut registry = Self::new();

        registry.register(
            "mkv",
            Arc::new(FfmpegConverter::new(config, ConversionProfile::MatroskaRemux)),
        );
        registry.register(
            "avi",
            Arc::new(FfmpegConverter::new(config, ConversionProfile::AviTranscode)),
        );
        for ext in ["wmv", "asf"] {
            registry.register(
                ext,
                Arc::new(FfmpegConverter::new(
                    config,
                    ConversionProfile::WindowsMediaTranscode,
                )),
            );
        }
        registry.register(
            "mov",
            Arc::new(FfmpegConverter::new(
                config,
                ConversionProfile::QuickTimeTranscode,
            )),
        );
        registry.register(
            "webm",
            Arc::new(FfmpegConverter::new(config, ConversionProfile::WebmTranscode)),
        );
        for ext in GENERIC_VIDEO_EXTENSIONS {
            registry.register(
                ext,
                Arc::new(FfmpegConverter::new(config, ConversionProfile::GenericVideo)),
            );
        }
        registry.register("wav", Arc::new(Mp3Converter::new(config)));

        registry
    }

    pub fn register(&mut self, extension: &str, converter: Arc<dyn Converter>) {
        self.by_extension
            .insert(extension.to_lowercase(), converter);
    }

    pub fn get(&self, extension: &str) -> Option<Arc<dyn Converter>> {
        self.by_extension.get(&extension.to_lowercase()).cloned()
    }

    pub fn supports(&self, extension: &str) -> bool {
        self.by_extension.contains_key(&extension.to_lowercase())
    }
}

/// Maps a compressible extension to its compressor.
#[derive(Default)]
pub struct CompressorRegistry {
    by_extension: HashMap<String, Arc<dyn Compressor>>,
}

impl CompressorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.register("mp4", Arc::new(Mp4Compressor::new(config)));
        registry.register("pdf", Arc::new(PdfCompressor::new(config)));
        registry
    }

    pub fn register(&mut self, extension: &str, compressor: Arc<dyn Compressor>) {
        self.by_extension
            .insert(extension.to_lowercase(), compressor);
    }

    pub fn get(&self, extension: &str) -> Option<Arc<dyn Compressor>> {
        self.by_extension.get(&extension.to_lowercase()).cloned()
    }

    pub fn supports(&self, extension: &str) -> bool {
        self.by_extension.contains_key(&extension.to_lowercase())
    }
}
