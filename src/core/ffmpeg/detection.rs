//! FFmpeg Detection Module
//!
//! Locates and validates the ffmpeg binary at startup. Resolution order:
//! `SUBBURN_FFMPEG` environment variable, then the configured override path,
//! then the system PATH.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::process::configure_std_command;

use super::{FFmpegError, FFmpegResult};

/// Information about the detected FFmpeg installation
#[derive(Debug, Clone)]
pub struct FFmpegInfo {
    /// Path to the ffmpeg binary
    pub ffmpeg_path: PathBuf,
    /// FFmpeg version string
    pub version: String,
}

/// Detect FFmpeg, preferring explicit overrides over the system PATH.
/// The binary is validated by running `ffmpeg -version`.
pub fn detect_ffmpeg(override_path: Option<&Path>) -> FFmpegResult<FFmpegInfo> {
    if let Ok(env_path) = std::env::var("SUBBURN_FFMPEG") {
        let path = PathBuf::from(env_path);
        let version = get_ffmpeg_version(&path)?;
        return Ok(FFmpegInfo {
            ffmpeg_path: path,
            version,
        });
    }

    if let Some(path) = override_path {
        let version = get_ffmpeg_version(path)?;
        return Ok(FFmpegInfo {
            ffmpeg_path: path.to_path_buf(),
            version,
        });
    }

    let path = which_ffmpeg()?;
    let version = get_ffmpeg_version(&path)?;
    Ok(FFmpegInfo {
        ffmpeg_path: path,
        version,
    })
}

/// Find the ffmpeg binary in the system PATH using `where` (Windows) or
/// `which` (Unix).
fn which_ffmpeg() -> FFmpegResult<PathBuf> {
    #[cfg(target_os = "windows")]
    let (finder, binary_name) = ("where", "ffmpeg.exe");

    #[cfg(not(target_os = "windows"))]
    let (finder, binary_name) = ("which", "ffmpeg");

    let mut cmd = Command::new(finder);
    configure_std_command(&mut cmd);
    let output = cmd
        .arg(binary_name)
        .output()
        .map_err(|_| FFmpegError::NotFound)?;

    if output.status.success() {
        let path_str = String::from_utf8_lossy(&output.stdout);
        if let Some(first_line) = path_str.lines().next() {
            return Ok(PathBuf::from(first_line.trim()));
        }
    }

    Err(FFmpegError::NotFound)
}

/// Run `ffmpeg -version` and extract the version token from the first line
/// (e.g. "ffmpeg version 6.1.1 Copyright ..." -> "6.1.1").
fn get_ffmpeg_version(path: &Path) -> FFmpegResult<String> {
    let mut cmd = Command::new(path);
    configure_std_command(&mut cmd);
    let output = cmd
        .arg("-version")
        .output()
        .map_err(|_| FFmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FFmpegError::NotFound);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("ffmpeg version "))
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or("unknown")
        .to_string();

    Ok(version)
}
