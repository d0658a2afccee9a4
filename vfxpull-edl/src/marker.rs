//! VFX marker extraction from marker-block comment lines.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vfxpull_timecode::{timecode_to_frames, FrameRate, ZERO_TIMECODE};

use crate::error::Result;

/// A VFX marker anchored at a record-timeline frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub vfx_code: String,
    pub marker_tc: String,
    pub marker_frames: u64,
    pub description: String,
}

/// Markers parsed from a batch of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerExtraction {
    pub markers: Vec<Marker>,
    /// Lines that carried the VFX prefix but could not be parsed.
    pub malformed: usize,
}

fn timecode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{2}:\d{2}:\d{2}:\d{2}").expect("timecode pattern is valid"))
}

// Three or more colon-separated numbers: a timecode, possibly a broken one.
// Ratios and clock times such as `2.39:1` or `12:30` do not qualify.
fn loose_timecode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b\d+(?::\d+){2,}\b").expect("loose timecode pattern is valid")
    })
}

fn restated_timecode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i:(?:tc|at)\s*)?\d{2}:\d{2}:\d{2}:\d{2}")
            .expect("restated timecode pattern is valid")
    })
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | ':' | '|' | '@' | '\u{2013}' | '\u{2014}')
}

/// Parse every line carrying `prefix` into a [`Marker`].
///
/// Lines without the prefix are ignored. A line that has the prefix but
/// fails to parse is counted in `malformed` and skipped.
pub fn extract_markers(lines: &[String], rate: FrameRate, prefix: &str) -> MarkerExtraction {
    let mut out = MarkerExtraction::default();
    if prefix.is_empty() {
        return out;
    }

    for line in lines {
        if !line.contains(prefix) {
            continue;
        }
        match parse_marker_line(line, rate, prefix) {
            Ok(marker) => out.markers.push(marker),
            Err(e) => {
                debug!(line = %line.trim(), error = %e, "Skipping malformed marker line");
                out.malformed += 1;
            }
        }
    }

    out
}

/// Parse a single marker comment line.
///
/// The marker timecode is the first `HH:MM:SS:FF` in the line, or
/// `00:00:00:00` when the line has none. A timecode-like token with the
/// wrong shape ahead of the VFX code is an error.
pub fn parse_marker_line(line: &str, rate: FrameRate, prefix: &str) -> Result<Marker> {
    let code_start = line.find(prefix).unwrap_or(0);
    let head = &line[..code_start];

    let marker_tc = match loose_timecode_regex().find(head) {
        // A timecode ahead of the code must be well formed.
        Some(m) => {
            timecode_to_frames(m.as_str(), rate)?;
            m.as_str().to_string()
        }
        None => timecode_regex()
            .find(line)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| ZERO_TIMECODE.to_string()),
    };
    let marker_frames = timecode_to_frames(&marker_tc, rate)?;

    let comment = &line[code_start..];
    let token = comment.split_whitespace().next().unwrap_or_default();
    let vfx_code = token
        .trim_end_matches(|c: char| matches!(c, ':' | ',' | ';' | '-' | '|'))
        .to_string();

    let rest = &comment[token.len()..];
    let description = clean_description(rest);

    Ok(Marker {
        vfx_code,
        marker_tc,
        marker_frames,
        description,
    })
}

fn clean_description(rest: &str) -> String {
    // Resolve-style trailing fields (`|D:1`) end the note.
    let rest = rest.split(" |").next().unwrap_or_default();
    let mut text = rest.trim_start_matches(is_separator);
    if let Some(m) = restated_timecode_regex().find(text) {
        text = text[m.end()..].trim_start_matches(is_separator);
    }
    text.trim_end_matches(|c: char| c.is_whitespace() || c == '-')
        .to_string()
}
