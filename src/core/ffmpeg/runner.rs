//! FFmpeg Runner Module
//!
//! Executes the burn-in invocation: source video + subtitle track in, new
//! video file out. Arguments are always passed as discrete tokens to the
//! process-creation call; no path or caption content is ever interpreted by
//! a shell.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;

use crate::core::process::configure_tokio_command;

use super::{FFmpegError, FFmpegInfo, FFmpegResult};

/// Fixed encoder parameters for the burn-in pass.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Video codec (e.g. "libx264")
    pub video_codec: String,
    /// Encoding preset (speed/quality balance)
    pub preset: String,
    /// CRF value; 18 is visually lossless for x264
    pub crf: u8,
    /// Audio codec; "copy" passes the source audio through untouched
    pub audio_codec: String,
    /// Pixel format for broad player compatibility
    pub pixel_format: String,
    /// Relocate the moov atom for web streaming
    pub faststart: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 18,
            audio_codec: "copy".to_string(),
            pixel_format: "yuv420p".to_string(),
            faststart: true,
        }
    }
}

/// FFmpeg runner for burn-in invocations
#[derive(Clone)]
pub struct FFmpegRunner {
    info: Arc<FFmpegInfo>,
    /// Wall-clock limit on one engine invocation; the child is killed on
    /// expiry and the request fails.
    timeout: Duration,
}

impl FFmpegRunner {
    pub fn new(info: FFmpegInfo, timeout: Duration) -> Self {
        Self {
            info: Arc::new(info),
            timeout,
        }
    }

    pub fn info(&self) -> &FFmpegInfo {
        &self.info
    }

    /// Build the burn-in argument vector:
    /// `-i <src> -vf ass=<track> -c:v ... -y <out>`.
    ///
    /// Pure so the exact tokens can be asserted in tests.
    pub fn burn_args(
        input: &Path,
        track: &Path,
        output: &Path,
        settings: &RenderSettings,
    ) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vf".to_string(),
            format!("ass={}", escape_filter_value(&track.to_string_lossy())),
            "-c:v".to_string(),
            settings.video_codec.clone(),
            "-preset".to_string(),
            settings.preset.clone(),
            "-crf".to_string(),
            settings.crf.to_string(),
            "-c:a".to_string(),
            settings.audio_codec.clone(),
            "-pix_fmt".to_string(),
            settings.pixel_format.clone(),
        ];

        if settings.faststart {
            args.push("-movflags".to_string());
            args.push("+faststart".to_string());
        }

        args.push("-y".to_string());
        args.push(output.to_string_lossy().to_string());

        args
    }

    /// Burn the subtitle track into the source video.
    ///
    /// Waits for process exit, bounded by the configured timeout. Non-zero
    /// exit is reported with the engine's captured stderr; transcoding is
    /// deterministic, so the caller must not retry.
    pub async fn burn_subtitles(
        &self,
        input: &Path,
        track: &Path,
        output: &Path,
        settings: &RenderSettings,
    ) -> FFmpegResult<()> {
        if !input.exists() {
            return Err(FFmpegError::InvalidInput(format!(
                "Input file does not exist: {}",
                input.display()
            )));
        }

        let args = Self::burn_args(input, track, output, settings);
        tracing::debug!(ffmpeg = %self.info.ffmpeg_path.display(), ?args, "spawning engine");

        let mut cmd = tokio::process::Command::new(&self.info.ffmpeg_path);
        configure_tokio_command(&mut cmd);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn()?;

        // Take stderr immediately and drain it concurrently. FFmpeg logs
        // enough on long encodes to fill the pipe buffer and deadlock an
        // implementation that reads only after wait().
        let stderr_handle = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf).await;
                String::from_utf8_lossy(&buf).to_string()
            })
        });

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "engine timed out, killing");
                let _ = child.kill().await;
                return Err(FFmpegError::Timeout);
            }
        };

        if !status.success() {
            let stderr_msg = match stderr_handle {
                Some(handle) => handle.await.unwrap_or_default(),
                None => String::new(),
            };
            return Err(FFmpegError::ExecutionFailed(stderr_msg.trim().to_string()));
        }

        Ok(())
    }
}

/// Escape a value embedded in an FFmpeg filter description. Filter parsing
/// treats `\`, `:` and `'` specially, so Windows drive letters in temp paths
/// would otherwise split the `ass=` option.
fn escape_filter_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ':' => out.push_str("\\:"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
