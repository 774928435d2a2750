//! Caption System Module
//!
//! Provides the caption model and the subtitle-track encoder:
//!
//! ```text
//! models.rs - data structures, payload validation and normalization
//! ass.rs    - ASS track generation (time codes, positions, style tags)
//! ```
//!
//! The module is pure: it never touches the filesystem or the engine, so
//! the whole encode path is testable without a video in sight.

mod ass;
mod models;

pub use ass::encode_track;
pub use models::{
    normalize_segments, CaptionStyle, Color, Frame, Segment, StyleOverrides, SubtitlePayload,
    PLACEHOLDER_TEXT,
};
