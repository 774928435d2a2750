//! Render Pipeline Module
//!
//! Orchestrates one render request: allocate the two temp paths, write the
//! encoded subtitle track, invoke the engine, and hand the produced file to
//! the transport together with the cleanup guard. Each request's pipeline
//! is strictly sequential; concurrent requests share nothing but the temp
//! directory namespace, which the per-request UUID token keeps
//! collision-free.

mod cleanup;

pub use cleanup::TempFileGuard;

use std::path::{Path, PathBuf};

use crate::core::captions::{encode_track, Frame, Segment};
use crate::core::ffmpeg::{FFmpegError, FFmpegRunner, RenderSettings};

/// Render error taxonomy. Input errors are rejected before any temp file is
/// created; engine failures surface the captured diagnostics and never
/// retry.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("No video file provided")]
    NoVideo,

    #[error("Video file not found: {0}")]
    VideoNotFound(String),

    #[error("No subtitles provided")]
    NoSubtitles,

    #[error("Invalid subtitles JSON: {0}")]
    InvalidSubtitles(String),

    #[error("Video encoding failed: {0}")]
    Engine(#[from] FFmpegError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// A successfully rendered video awaiting delivery.
///
/// The guard owns both temp files; whoever consumes the video must keep the
/// guard alive until the bytes have left the process, then drop it.
#[derive(Debug)]
pub struct RenderedVideo {
    /// Path of the produced file in the temp directory
    pub path: PathBuf,
    /// Size reported for Content-Length
    pub size_bytes: u64,
    /// Deletes the track and output files when dropped
    pub guard: TempFileGuard,
}

/// Drives encode -> write -> engine for one request at a time.
pub struct RenderPipeline {
    runner: FFmpegRunner,
    temp_dir: PathBuf,
    settings: RenderSettings,
}

impl RenderPipeline {
    pub fn new(runner: FFmpegRunner, temp_dir: PathBuf, settings: RenderSettings) -> Self {
        Self {
            runner,
            temp_dir,
            settings,
        }
    }

    /// Renders `segments` onto the video at `source`.
    ///
    /// On any failure past track allocation the guard is dropped here and
    /// both temp files are already gone when the error reaches the caller.
    pub async fn render(
        &self,
        source: &Path,
        segments: &[Segment],
        frame: &Frame,
    ) -> RenderResult<RenderedVideo> {
        // Uuid tokens, not timestamps: two requests in the same millisecond
        // must still get distinct paths.
        let token = uuid::Uuid::new_v4().simple().to_string();
        let track_path = self.temp_dir.join(format!("subtitles_{token}.ass"));
        let output_path = self.temp_dir.join(format!("video_with_subtitles_{token}.mp4"));
        let guard = TempFileGuard::new(vec![track_path.clone(), output_path.clone()]);

        let track = encode_track(segments, frame);
        tokio::fs::write(&track_path, &track).await?;
        tracing::info!(
            segments = segments.len(),
            track = %track_path.display(),
            "subtitle track written"
        );

        self.runner
            .burn_subtitles(source, &track_path, &output_path, &self.settings)
            .await?;

        let size_bytes = tokio::fs::metadata(&output_path).await?.len();
        tracing::info!(
            bytes = size_bytes,
            output = %output_path.display(),
            "render complete"
        );

        Ok(RenderedVideo {
            path: output_path,
            size_bytes,
            guard,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
