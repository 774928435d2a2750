//! Shared application state.

use std::time::Duration;

use crate::config::ServerConfig;
use crate::core::ffmpeg::{FFmpegInfo, FFmpegRunner, RenderSettings};
use crate::core::render::RenderPipeline;

/// Application state shared across request handlers. Holds no per-request
/// data; each render owns its own segment snapshot and temp artifacts.
pub struct AppState {
    pub config: ServerConfig,
    pub pipeline: RenderPipeline,
}

impl AppState {
    pub fn new(config: ServerConfig, ffmpeg: FFmpegInfo) -> Self {
        let runner = FFmpegRunner::new(ffmpeg, Duration::from_secs(config.engine_timeout_secs));
        let pipeline = RenderPipeline::new(
            runner,
            config.temp_dir.clone(),
            RenderSettings::default(),
        );
        Self { config, pipeline }
    }
}
