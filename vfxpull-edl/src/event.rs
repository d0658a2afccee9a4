//! CMX 3600 cut-event and marker-block extraction.
//!
//! A single pass over the EDL text collects two things: the straight video
//! cuts (`V` track, `C` edit) with their source and record timecodes, and
//! the raw comment lines found inside the marker metadata block. Everything
//! else is ignored line by line; nothing here fails the whole parse.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vfxpull_timecode::{timecode_to_frames, FrameRate};

/// Track descriptor prefix for picture events.
pub const VIDEO_TRACK: char = 'V';
/// Edit-type code for a straight cut.
pub const CUT_CODE: &str = "C";
/// Comment carrying the clip name of the preceding event.
const FROM_CLIP_NAME: &str = "FROM CLIP NAME:";

/// A straight video cut taken from one EDL event line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutEvent {
    /// Event number as written in the EDL.
    pub id: u32,
    /// Reel or clip token from the event line.
    pub reel: String,
    /// `* FROM CLIP NAME:` value if present, otherwise the reel.
    pub clip_name: String,
    /// Track descriptor (`V`, `V2`, ...).
    pub track: String,
    pub source_tc_in: String,
    pub source_tc_out: String,
    pub record_tc_in: String,
    pub record_tc_out: String,
    pub source_in_frames: u64,
    pub record_in_frames: u64,
    /// Exclusive: the first frame after the event.
    pub record_out_frames: u64,
    /// 1-based line number in the EDL text.
    pub line: usize,
}

impl CutEvent {
    /// Record-side length in frames.
    pub fn duration_frames(&self) -> u64 {
        self.record_out_frames.saturating_sub(self.record_in_frames)
    }

    /// Whether `frame` lies in `[record_in, record_out)`.
    pub fn contains(&self, frame: u64) -> bool {
        frame >= self.record_in_frames && frame < self.record_out_frames
    }
}

/// Tokens delimiting the marker metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTokens {
    pub start: String,
    pub end: String,
    pub sigil: String,
}

impl Default for BlockTokens {
    fn default() -> Self {
        Self {
            start: "* Marker Metadata".into(),
            end: "* End Marker Metadata".into(),
            sigil: "*".into(),
        }
    }
}

/// Result of scanning one EDL document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub title: Option<String>,
    /// Straight video cuts, sorted by `record_in_frames`.
    pub events: Vec<CutEvent>,
    /// Raw comment lines collected inside the marker block.
    pub marker_lines: Vec<String>,
}

// Event line: 001  REEL  V  C  [dur]  SRC_IN SRC_OUT REC_IN REC_OUT
fn event_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(\d+)\s+(\S+)\s+(\S+)\s+(\S+)(?:\s+(\d+))?\s+(\d[\d:;]*)\s+(\d[\d:;]*)\s+(\d[\d:;]*)\s+(\d[\d:;]*)\s*$",
        )
        .expect("event pattern is valid")
    })
}

/// Scan EDL text for straight video cuts and marker-block comment lines.
///
/// Events whose timecodes fail to convert, or whose record out is not after
/// record in, are dropped. Returned events are sorted by record-in frame.
pub fn extract_events(input: &str, rate: FrameRate, tokens: &BlockTokens) -> Extraction {
    let mut title: Option<String> = None;
    let mut events: Vec<CutEvent> = Vec::new();
    let mut marker_lines: Vec<String> = Vec::new();

    let mut in_block = false;
    let mut block_has_content = false;
    // Index of the last kept event, for FROM CLIP NAME comments.
    let mut last_event: Option<usize> = None;

    for (line_idx, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        // The end token usually contains the start token's words, so it goes first.
        if !tokens.end.is_empty() && raw_line.contains(tokens.end.as_str()) {
            in_block = false;
            continue;
        }
        if raw_line.contains(tokens.start.as_str()) {
            in_block = true;
            block_has_content = false;
            continue;
        }

        let is_comment = line.starts_with(tokens.sigil.as_str());
        if in_block {
            if is_comment {
                marker_lines.push(raw_line.to_string());
                block_has_content = true;
                continue;
            }
            if block_has_content {
                debug!(line = line_idx + 1, "Marker block closed implicitly");
                in_block = false;
            }
        }

        if is_comment {
            if let Some(name) = clip_name_comment(line) {
                if let Some(idx) = last_event {
                    events[idx].clip_name = name.to_string();
                }
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("TITLE:") {
            title = Some(rest.trim().to_string());
            continue;
        }

        let Some(caps) = event_regex().captures(line) else {
            continue;
        };
        last_event = None;

        let track = &caps[3];
        let edit_type = &caps[4];
        if !track.starts_with(VIDEO_TRACK) || edit_type != CUT_CODE {
            debug!(line = line_idx + 1, track, edit_type, "Skipping non-cut event");
            continue;
        }

        let convert = |tc: &str| match timecode_to_frames(tc, rate) {
            Ok(frames) => Some(frames),
            Err(e) => {
                debug!(line = line_idx + 1, error = %e, "Skipping event with bad timecode");
                None
            }
        };
        let (Some(source_in), Some(_), Some(record_in), Some(record_out)) = (
            convert(&caps[6]),
            convert(&caps[7]),
            convert(&caps[8]),
            convert(&caps[9]),
        ) else {
            continue;
        };

        if record_out <= record_in {
            debug!(
                line = line_idx + 1,
                record_in, record_out, "Skipping zero or negative duration event"
            );
            continue;
        }

        let reel = caps[2].to_string();
        events.push(CutEvent {
            id: caps[1].parse().unwrap_or(0),
            clip_name: reel.clone(),
            reel,
            track: track.to_string(),
            source_tc_in: caps[6].to_string(),
            source_tc_out: caps[7].to_string(),
            record_tc_in: caps[8].to_string(),
            record_tc_out: caps[9].to_string(),
            source_in_frames: source_in,
            record_in_frames: record_in,
            record_out_frames: record_out,
            line: line_idx + 1,
        });
        last_event = Some(events.len() - 1);
    }

    events.sort_by_key(|e| e.record_in_frames);

    Extraction {
        title,
        events,
        marker_lines,
    }
}

fn clip_name_comment(comment: &str) -> Option<&str> {
    let body = comment.trim_start_matches('*').trim_start();
    body.strip_prefix(FROM_CLIP_NAME)
        .map(str::trim)
        .filter(|name| !name.is_empty())
}
