//! HTTP request handlers.
//!
//! The render boundary: decode the request leniently (the editor client
//! sends dimensions as strings and the segment list as a JSON-encoded form
//! field), reject input errors before any temp file exists, and stream the
//! rendered video back with cleanup attached to the body.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::captions::{normalize_segments, Frame, StyleOverrides, SubtitlePayload};
use crate::core::render::RenderError;
use crate::state::AppState;

use super::streams::video_stream_body;

/// Render request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Path of the uploaded source video on durable storage.
    #[serde(default, alias = "video")]
    pub video_path: Option<String>,
    /// Frame width; absent or non-numeric values fall back to 1280.
    #[serde(default)]
    pub video_width: Option<Value>,
    /// Frame height; absent or non-numeric values fall back to 720.
    #[serde(default)]
    pub video_height: Option<Value>,
    /// Segment list: an inline array or a JSON-encoded string.
    #[serde(default)]
    pub subtitles: Option<Value>,
    /// Request-level style defaults for fields the segments omit.
    #[serde(default)]
    pub defaults: Option<StyleOverrides>,
}

/// HTTP error envelope: `{ "error": ..., "details"?: ... }`.
#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Internal { error: String, details: Option<String> },
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            HttpError::Internal { error, details } => {
                (StatusCode::INTERNAL_SERVER_ERROR, error, details)
            }
        };

        let mut body = json!({ "error": error });
        if let Some(details) = details {
            body["details"] = Value::String(details);
        }
        (status, Json(body)).into_response()
    }
}

impl From<RenderError> for HttpError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::NoVideo
            | RenderError::VideoNotFound(_)
            | RenderError::NoSubtitles
            | RenderError::InvalidSubtitles(_) => HttpError::BadRequest(err.to_string()),
            RenderError::Engine(engine_err) => HttpError::Internal {
                error: "Video encoding failed".to_string(),
                details: Some(engine_err.to_string()),
            },
            RenderError::Io(io_err) => HttpError::Internal {
                error: "Internal error".to_string(),
                details: Some(io_err.to_string()),
            },
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Version endpoint
pub async fn version_check() -> &'static str {
    concat!("subburn v", env!("CARGO_PKG_VERSION"))
}

/// Render endpoint
/// POST /render
pub async fn render_video(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, HttpError> {
    let request: RenderRequest = serde_json::from_slice(&body)
        .map_err(|e| HttpError::BadRequest(format!("Error parsing the request: {e}")))?;

    let video_path = request
        .video_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or(RenderError::NoVideo)?;
    let source = Path::new(video_path);
    if !source.is_file() {
        return Err(RenderError::VideoNotFound(video_path.to_string()).into());
    }

    let raw_subtitles = request.subtitles.as_ref().ok_or(RenderError::NoSubtitles)?;
    let payloads = decode_subtitles(raw_subtitles)?;

    let frame = Frame::new(
        parse_dimension(request.video_width.as_ref(), Frame::DEFAULT_WIDTH),
        parse_dimension(request.video_height.as_ref(), Frame::DEFAULT_HEIGHT),
    );
    let defaults = request.defaults.unwrap_or_default();
    let segments = normalize_segments(payloads, &defaults);

    let rendered = state.pipeline.render(source, &segments, &frame).await?;

    let file = tokio::fs::File::open(&rendered.path)
        .await
        .map_err(|e| HttpError::Internal {
            error: "Failed to send video".to_string(),
            details: Some(e.to_string()),
        })?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(rendered.size_bytes));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"video_with_subtitles.mp4\""),
    );

    let body = video_stream_body(file, state.config.stream_chunk_bytes, rendered.guard);
    Ok((headers, body).into_response())
}

/// The editor posts `subtitles` as a JSON-encoded string form field; direct
/// API callers send the array inline. Accept both.
fn decode_subtitles(raw: &Value) -> Result<Vec<SubtitlePayload>, RenderError> {
    let parsed = match raw {
        Value::String(encoded) => serde_json::from_str(encoded),
        other => serde_json::from_value(other.clone()),
    };
    parsed.map_err(|e| RenderError::InvalidSubtitles(e.to_string()))
}

/// Frame dimensions arrive as numbers or numeric strings; anything else
/// falls back to the default.
fn parse_dimension(value: Option<&Value>, fallback: u32) -> u32 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.filter(|v| *v > 0).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension(Some(&json!(1920)), 1280), 1920);
        assert_eq!(parse_dimension(Some(&json!("1080")), 720), 1080);
        assert_eq!(parse_dimension(Some(&json!("wide")), 1280), 1280);
        assert_eq!(parse_dimension(Some(&json!(0)), 1280), 1280);
        assert_eq!(parse_dimension(Some(&json!(-5)), 1280), 1280);
        assert_eq!(parse_dimension(None, 720), 720);
    }

    #[test]
    fn test_decode_subtitles_inline_array() {
        let raw = json!([{ "start": 0.0, "end": 1.0, "text": "hi" }]);
        let payloads = decode_subtitles(&raw).unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].text.as_deref(), Some("hi"));
    }

    #[test]
    fn test_decode_subtitles_json_string() {
        let raw = json!("[{\"start\": 0.5, \"end\": 2.0, \"text\": \"enc\"}]");
        let payloads = decode_subtitles(&raw).unwrap();
        assert_eq!(payloads[0].start, Some(0.5));
    }

    #[test]
    fn test_decode_subtitles_malformed() {
        assert!(matches!(
            decode_subtitles(&json!("not json at all")),
            Err(RenderError::InvalidSubtitles(_))
        ));
        assert!(matches!(
            decode_subtitles(&json!({"not": "an array"})),
            Err(RenderError::InvalidSubtitles(_))
        ));
    }

    #[test]
    fn test_render_error_status_mapping() {
        let bad: HttpError = RenderError::NoVideo.into();
        assert!(matches!(bad, HttpError::BadRequest(_)));

        let engine: HttpError =
            RenderError::Engine(crate::core::ffmpeg::FFmpegError::Timeout).into();
        match engine {
            HttpError::Internal { details, .. } => {
                assert!(details.unwrap().contains("Timeout"))
            }
            other => panic!("expected Internal, got {other:?}"),
        }
    }
}
