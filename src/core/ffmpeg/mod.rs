//! FFmpeg Integration Module
//!
//! The compositing engine is consumed strictly through its command-line
//! contract: argument vector in, exit code and stderr out, video bytes
//! written to a path. This module locates the binary and drives the burn-in
//! invocation; it never links against FFmpeg.

mod detection;
mod runner;

pub use detection::{detect_ffmpeg, FFmpegInfo};
pub use runner::{FFmpegRunner, RenderSettings};

/// FFmpeg-related error types
#[derive(Debug, thiserror::Error)]
pub enum FFmpegError {
    #[error("FFmpeg not found. Install FFmpeg or set ffmpegPath in the server config.")]
    NotFound,

    #[error("FFmpeg execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Invalid input file: {0}")]
    InvalidInput(String),

    #[error("Process error: {0}")]
    ProcessError(#[from] std::io::Error),

    #[error("Timeout: encoding took too long")]
    Timeout,
}

pub type FFmpegResult<T> = Result<T, FFmpegError>;
