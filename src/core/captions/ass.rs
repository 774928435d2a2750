//! ASS Track Encoder
//!
//! Turns a validated segment list and a frame size into a complete ASS
//! (Advanced SubStation Alpha) document: a script-info block declaring the
//! canvas resolution, a style table, and one dialogue event per surviving
//! segment with inline override tags prefixed to the escaped text.
//!
//! The encoder is a pure function of its inputs. Per-segment style problems
//! were already absorbed during normalization, so nothing in here can fail.

use super::models::{Frame, Segment, PLACEHOLDER_TEXT};

/// Events reference the high-resolution style; `Default` stays in the table
/// for players that resolve unknown style names to the first entry.
const EVENT_STYLE: &str = "HighRes";

/// Inline font sizes are scaled up for crisper glyph rasterization against
/// the high-resolution style.
const FONT_SCALE: f64 = 1.5;

/// Encodes the track document. Segment order is preserved as given:
/// later identical-looking entries are disambiguated only by position, so
/// the encoder must never reorder.
pub fn encode_track(segments: &[Segment], frame: &Frame) -> String {
    let mut doc = track_header(frame);
    for segment in segments {
        if segment.text == PLACEHOLDER_TEXT {
            continue;
        }
        doc.push_str(&dialogue_line(segment, frame));
    }
    doc
}

fn track_header(frame: &Frame) -> String {
    format!(
        "[Script Info]\n\
         ScriptType: v4.00+\n\
         PlayResX: {w}\n\
         PlayResY: {h}\n\
         WrapStyle: 1\n\
         ScaledBorderAndShadow: yes\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: Default,Arial,48,&H00FFFFFF,&H000000FF,&H00000000,&H64000000,-1,0,0,0,100,100,0,0,1,2,2,2,30,30,30,1\n\
         Style: HighRes,Arial,72,&H00FFFFFF,&H000000FF,&H00000000,&H64000000,-1,0,0,0,100,100,0,0,1,3,3,2,40,40,40,1\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        w = frame.width,
        h = frame.height,
    )
}

fn dialogue_line(segment: &Segment, frame: &Frame) -> String {
    let start = format_ass_time(segment.start_sec);
    let end = format_ass_time(segment.end_sec);
    let overrides = override_tags(segment, frame);
    format!(
        "Dialogue: 0,{start},{end},{EVENT_STYLE},,0,0,0,,{overrides}{text}\n",
        text = escape_text(&segment.text),
    )
}

/// Composes the inline override tags for one segment. Escaping is never
/// applied here; these are generated control sequences, not caption text.
fn override_tags(segment: &Segment, frame: &Frame) -> String {
    let x = (segment.x * f64::from(frame.width)).round() as i64;
    let y = (segment.y * f64::from(frame.height)).round() as i64;
    let mut tags = format!("{{\\an2\\pos({x},{y})}}");

    if let Some(font) = map_font_family(&segment.style.font_family) {
        tags.push_str(&format!("{{\\fn{font}}}"));
    }
    if let Some(color) = segment.style.color {
        tags.push_str(&format!("{{\\c&H{}&}}", color.to_ass_bgr()));
    }

    let scaled_size = (f64::from(segment.style.font_size) * FONT_SCALE).round() as u32;
    tags.push_str(&format!("{{\\fs{scaled_size}}}"));

    if segment.style.bold {
        tags.push_str("{\\b1}");
    }
    if segment.style.italic {
        tags.push_str("{\\i1}");
    }
    if segment.style.underline {
        tags.push_str("{\\u1}");
    }
    if segment.style.shadow {
        tags.push_str("{\\shad4}");
    }

    tags
}

/// Maps logical font family names to concrete fonts the renderer can find.
/// `sans-serif` yields no tag at all: the style table's Arial covers it.
fn map_font_family(family: &str) -> Option<String> {
    match family {
        "sans-serif" => None,
        "serif" => Some("Times New Roman".to_string()),
        "monospace" => Some("Courier New".to_string()),
        other if other.contains("Comic") => Some("Comic Sans MS".to_string()),
        other if other.contains("Impact") => Some("Impact".to_string()),
        other => Some(other.to_string()),
    }
}

/// Formats seconds as an ASS timestamp (`H:MM:SS.CS`), floor-truncating to
/// centiseconds. Truncation never rounds up, so an encoded end never exceeds
/// the segment's declared end.
pub(crate) fn format_ass_time(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).floor() as u64;
    let h = total_cs / 360_000;
    let m = (total_cs % 360_000) / 6_000;
    let s = (total_cs % 6_000) / 100;
    let cs = total_cs % 100;
    format!("{h}:{m:02}:{s:02}.{cs:02}")
}

/// Escapes the ASS control characters in caption text. Newlines become the
/// forced-line-break token; carriage returns are stripped.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\n' => out.push_str("\\N"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::captions::{CaptionStyle, Color};

    fn segment(start: f64, end: f64, text: &str) -> Segment {
        Segment {
            id: "test".to_string(),
            start_sec: start,
            end_sec: end,
            text: text.to_string(),
            x: 0.5,
            y: 0.8,
            style: CaptionStyle::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Timestamp formatting
    // -------------------------------------------------------------------------

    #[test]
    fn test_format_ass_time() {
        assert_eq!(format_ass_time(0.0), "0:00:00.00");
        assert_eq!(format_ass_time(1.5), "0:00:01.50");
        assert_eq!(format_ass_time(90.0), "0:01:30.00");
        assert_eq!(format_ass_time(5400.0), "1:30:00.00");
        assert_eq!(format_ass_time(-3.0), "0:00:00.00");
    }

    #[test]
    fn test_format_ass_time_truncates_never_rounds_up() {
        assert_eq!(format_ass_time(1.999), "0:00:01.99");
        assert_eq!(format_ass_time(59.996), "0:00:59.99");
        assert_eq!(format_ass_time(2.009), "0:00:02.00");
    }

    #[test]
    fn test_encoded_end_always_exceeds_encoded_start() {
        // Survivors of normalization differ by at least one centisecond.
        for (start, end) in [(0.0, 0.01), (1.004, 1.011), (59.99, 60.0)] {
            let s = format_ass_time(start);
            let e = format_ass_time(end);
            assert!(e > s, "{e} should sort after {s}");
        }
    }

    // -------------------------------------------------------------------------
    // Escaping
    // -------------------------------------------------------------------------

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("plain"), "plain");
        assert_eq!(escape_text("a\\b"), "a\\\\b");
        assert_eq!(escape_text("{tag}"), "\\{tag\\}");
        assert_eq!(escape_text("two\nlines"), "two\\Nlines");
        assert_eq!(escape_text("crlf\r\nhere"), "crlf\\Nhere");
    }

    #[test]
    fn test_escaping_applied_exactly_once() {
        let track = encode_track(&[segment(0.0, 2.0, "back\\slash")], &Frame::default());
        // One backslash in, exactly two out: double-escaping would produce four.
        let dialogue = track.lines().last().unwrap();
        assert!(dialogue.ends_with("back\\\\slash"));
        assert!(!dialogue.contains("back\\\\\\\\slash"));
    }

    // -------------------------------------------------------------------------
    // Dialogue composition
    // -------------------------------------------------------------------------

    #[test]
    fn test_centered_position_on_720p_frame() {
        let frame = Frame::new(1280, 720);
        let track = encode_track(&[segment(0.0, 2.0, "Hi")], &frame);
        let dialogue = track.lines().last().unwrap();
        assert!(dialogue.starts_with("Dialogue: 0,0:00:00.00,0:00:02.00,HighRes,,0,0,0,,"));
        assert!(dialogue.contains("{\\an2\\pos(640,576)}"));
        assert!(dialogue.ends_with("Hi"));
    }

    #[test]
    fn test_color_override_reverses_channels() {
        let mut seg = segment(0.0, 2.0, "red");
        seg.style.color = Some(Color::rgb(255, 0, 0));
        let track = encode_track(&[seg], &Frame::default());
        assert!(track.contains("{\\c&H0000FF&}"));
    }

    #[test]
    fn test_no_color_tag_without_override() {
        let track = encode_track(&[segment(0.0, 2.0, "plain")], &Frame::default());
        assert!(!track.contains("\\c&H"));
    }

    #[test]
    fn test_style_flags_emit_toggle_tags_only_when_set() {
        let mut styled = segment(0.0, 2.0, "styled");
        styled.style.bold = true;
        styled.style.italic = true;
        styled.style.underline = true;
        styled.style.shadow = true;
        let track = encode_track(&[styled, segment(3.0, 4.0, "plain")], &Frame::default());

        let lines: Vec<&str> = track.lines().filter(|l| l.starts_with("Dialogue:")).collect();
        assert!(lines[0].contains("{\\b1}"));
        assert!(lines[0].contains("{\\i1}"));
        assert!(lines[0].contains("{\\u1}"));
        assert!(lines[0].contains("{\\shad4}"));
        for tag in ["{\\b1}", "{\\i1}", "{\\u1}", "{\\shad4}", "\\b0", "\\i0", "\\u0"] {
            assert!(!lines[1].contains(tag), "plain line should not carry {tag}");
        }
    }

    #[test]
    fn test_font_size_scaled_for_high_resolution() {
        let track = encode_track(&[segment(0.0, 2.0, "x")], &Frame::default());
        // Default 48px scales by 1.5 to 72.
        assert!(track.contains("{\\fs72}"));
    }

    #[test]
    fn test_font_family_mapping() {
        let mut serif = segment(0.0, 2.0, "serif");
        serif.style.font_family = "serif".to_string();
        let mut mono = segment(3.0, 4.0, "mono");
        mono.style.font_family = "monospace".to_string();
        let mut comic = segment(5.0, 6.0, "comic");
        comic.style.font_family = "Comic Sans".to_string();
        let sans = segment(7.0, 8.0, "sans");

        let track = encode_track(&[serif, mono, comic, sans], &Frame::default());
        assert!(track.contains("{\\fnTimes New Roman}"));
        assert!(track.contains("{\\fnCourier New}"));
        assert!(track.contains("{\\fnComic Sans MS}"));
        let sans_line = track.lines().last().unwrap();
        assert!(!sans_line.contains("\\fn"));
    }

    // -------------------------------------------------------------------------
    // Exclusion, ordering, header
    // -------------------------------------------------------------------------

    #[test]
    fn test_placeholder_segments_excluded() {
        let mut placeholder = segment(0.0, 2.0, PLACEHOLDER_TEXT);
        placeholder.style.bold = true;
        let track = encode_track(
            &[placeholder, segment(3.0, 4.0, "real")],
            &Frame::default(),
        );
        assert!(!track.contains(PLACEHOLDER_TEXT));
        let dialogues = track.lines().filter(|l| l.starts_with("Dialogue:")).count();
        assert_eq!(dialogues, 1);
    }

    #[test]
    fn test_input_order_preserved() {
        let track = encode_track(
            &[
                segment(5.0, 6.0, "second shown first"),
                segment(0.0, 1.0, "first shown second"),
            ],
            &Frame::default(),
        );
        let dialogues: Vec<&str> = track.lines().filter(|l| l.starts_with("Dialogue:")).collect();
        assert!(dialogues[0].contains("second shown first"));
        assert!(dialogues[1].contains("first shown second"));
    }

    #[test]
    fn test_empty_list_yields_header_only() {
        let frame = Frame::new(1920, 1080);
        let track = encode_track(&[], &frame);
        assert!(track.contains("[Script Info]"));
        assert!(track.contains("PlayResX: 1920"));
        assert!(track.contains("PlayResY: 1080"));
        assert!(track.contains("[V4+ Styles]"));
        assert!(track.contains("[Events]"));
        assert!(!track.contains("Dialogue:"));
    }

    #[test]
    fn test_header_declares_frame_dimensions() {
        let track = encode_track(&[], &Frame::new(640, 360));
        assert!(track.contains("PlayResX: 640"));
        assert!(track.contains("PlayResY: 360"));
    }
}
