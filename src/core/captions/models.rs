//! Caption Data Models
//!
//! Defines data structures for caption segments and the frame they are
//! composed against, plus the normalization pass that restores invariants
//! on raw request payloads.
//!
//! # Overview
//!
//! A render request carries one immutable snapshot: a frame size and a list
//! of segments. Each segment has timing, a normalized position box, and
//! optional style overrides resolved against request-level defaults. The
//! normalization pass clamps or drops degenerate values instead of failing
//! the request; a single bad segment never aborts a render.

use serde::{Deserialize, Serialize};

use tracing::warn;

/// Reserved text of a never-edited placeholder segment. Segments carrying
/// exactly this text are authoring scratch entries and are excluded from the
/// encoded track.
pub const PLACEHOLDER_TEXT: &str = "New subtitle at this time";

/// Hard default caption font size in pixels.
const DEFAULT_FONT_SIZE: u32 = 48;

/// Largest accepted caption font size; larger values clamp down to this.
const MAX_FONT_SIZE: u32 = 512;

/// Hard default box size when a payload omits or mangles it.
const DEFAULT_BOX_WIDTH: f64 = 0.8;
const DEFAULT_BOX_HEIGHT: f64 = 0.18;

// =============================================================================
// Frame
// =============================================================================

/// Pixel canvas of the source video. All normalized coordinates resolve
/// against this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub const DEFAULT_WIDTH: u32 = 1280;
    pub const DEFAULT_HEIGHT: u32 = 720;

    /// Creates a frame, substituting the defaults for zero dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: if width == 0 { Self::DEFAULT_WIDTH } else { width },
            height: if height == 0 { Self::DEFAULT_HEIGHT } else { height },
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }
}

// =============================================================================
// Color
// =============================================================================

/// RGB color value (0-255 for each component).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Creates a color from RGB components.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a `#RRGGBB` hex string (leading `#` optional).
    /// Returns `None` for anything that is not exactly six hex digits.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::rgb(r, g, b))
    }

    /// Channel-reversed hex as the ASS override tags expect (`BBGGRR`).
    /// Opacity is implicit: the tag's missing alpha byte means opaque.
    pub fn to_ass_bgr(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.b, self.g, self.r)
    }
}

// =============================================================================
// Styles
// =============================================================================

/// Raw style fields as they appear on the wire: every field optional, either
/// as a per-segment override or as the request-level defaults object.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOverrides {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub text_color: Option<String>,
    pub is_bold: Option<bool>,
    pub is_italic: Option<bool>,
    pub is_underline: Option<bool>,
    pub is_shadow: Option<bool>,
}

/// Fully resolved style for one segment: override field, else request
/// default, else hard default. `color: None` means "no color override tag";
/// the track's style table supplies the primary colour in that case.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionStyle {
    pub font_family: String,
    pub font_size: u32,
    pub color: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub shadow: bool,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: DEFAULT_FONT_SIZE,
            color: None,
            bold: false,
            italic: false,
            underline: false,
            shadow: false,
        }
    }
}

// =============================================================================
// Segments
// =============================================================================

/// One caption segment as deserialized from the request payload.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitlePayload {
    pub id: Option<String>,
    /// Start time in seconds.
    pub start: Option<f64>,
    /// End time in seconds.
    pub end: Option<f64>,
    pub text: Option<String>,
    /// Center position as a fraction of the frame.
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Box size as a fraction of the frame.
    pub width: Option<f64>,
    pub height: Option<f64>,
    #[serde(flatten)]
    pub style: StyleOverrides,
}

/// A validated segment with invariants restored. Produced only by
/// [`normalize_segments`].
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub id: String,
    pub start_sec: f64,
    pub end_sec: f64,
    pub text: String,
    /// Clamped center position, each in `[0,1]`.
    pub x: f64,
    pub y: f64,
    pub style: CaptionStyle,
}

/// Validates and normalizes raw payloads into render-ready segments.
///
/// Degenerate segments are repaired or dropped, never fatal:
/// - negative start times clamp to zero;
/// - segments whose end does not exceed their start *after centisecond
///   truncation* are zero-duration at track resolution and are dropped;
/// - box sizes clamp into `(0,1]` and the center is clamped so the box stays
///   inside the frame;
/// - style values out of range clamp to the nearest legal bound, and
///   malformed colors fall back to the request default.
pub fn normalize_segments(
    payloads: Vec<SubtitlePayload>,
    defaults: &StyleOverrides,
) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(payloads.len());

    for (index, payload) in payloads.into_iter().enumerate() {
        let id = payload
            .id
            .clone()
            .unwrap_or_else(|| format!("segment_{index}"));

        let start_sec = sanitize(payload.start).unwrap_or(0.0).max(0.0);
        let end_sec = sanitize(payload.end).unwrap_or(0.0);
        if truncate_cs(end_sec) <= truncate_cs(start_sec) {
            warn!(segment = %id, start_sec, end_sec, "dropping zero-duration segment");
            continue;
        }

        let box_w = clamp_box(payload.width, DEFAULT_BOX_WIDTH);
        let box_h = clamp_box(payload.height, DEFAULT_BOX_HEIGHT);
        let x = clamp_center(payload.x, 0.5, box_w);
        let y = clamp_center(payload.y, 0.8, box_h);

        segments.push(Segment {
            id,
            start_sec,
            end_sec,
            text: payload.text.unwrap_or_default(),
            x,
            y,
            style: resolve_style(&payload.style, defaults),
        });
    }

    segments
}

/// Drops NaN and infinities so clamping math stays well defined.
fn sanitize(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Total centiseconds after floor truncation, the track's time resolution.
fn truncate_cs(seconds: f64) -> u64 {
    (seconds.max(0.0) * 100.0).floor() as u64
}

/// Clamps a box dimension into `(0,1]`; non-positive or missing values take
/// the hard default.
fn clamp_box(value: Option<f64>, fallback: f64) -> f64 {
    match sanitize(value) {
        Some(v) if v > 0.0 => v.min(1.0),
        _ => fallback,
    }
}

/// Clamps a center coordinate so the box `[c - size/2, c + size/2]` stays
/// inside `[0,1]`.
fn clamp_center(value: Option<f64>, fallback: f64, box_size: f64) -> f64 {
    let center = sanitize(value).unwrap_or(fallback);
    // box_size is already in (0,1], so half <= 0.5 and the range is valid.
    let half = box_size / 2.0;
    center.clamp(half, 1.0 - half)
}

fn resolve_style(overrides: &StyleOverrides, defaults: &StyleOverrides) -> CaptionStyle {
    let hard = CaptionStyle::default();

    let font_family = overrides
        .font_family
        .clone()
        .or_else(|| defaults.font_family.clone())
        .unwrap_or(hard.font_family);

    let font_size = sanitize(overrides.font_size)
        .or_else(|| sanitize(defaults.font_size))
        .map(|size| (size.round().max(1.0) as u32).min(MAX_FONT_SIZE))
        .unwrap_or(hard.font_size);

    let color = resolve_color(overrides.text_color.as_deref())
        .or_else(|| resolve_color(defaults.text_color.as_deref()));

    CaptionStyle {
        font_family,
        font_size,
        color,
        bold: overrides.is_bold.or(defaults.is_bold).unwrap_or(false),
        italic: overrides.is_italic.or(defaults.is_italic).unwrap_or(false),
        underline: overrides
            .is_underline
            .or(defaults.is_underline)
            .unwrap_or(false),
        shadow: overrides.is_shadow.or(defaults.is_shadow).unwrap_or(false),
    }
}

/// Malformed color strings degrade to "no override" rather than erroring.
fn resolve_color(value: Option<&str>) -> Option<Color> {
    let raw = value?;
    match Color::from_hex(raw) {
        Some(color) => Some(color),
        None => {
            warn!(color = raw, "ignoring malformed color value");
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
