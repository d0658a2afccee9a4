//! CMX3600 EDL parsing for VFX shot pulls.
//!
//! Reads a conform EDL, finds the straight video cuts and the VFX markers
//! stored in its marker metadata block, and merges each marker with the
//! run of contiguous cuts under it into a [`ShotRecord`]. Shot tables can be
//! exported, read back, and diffed against a previous run.
//!
//! # Example
//!
//! ```
//! use vfxpull_edl::{parse_edl, diff_shots, DiffStatus};
//!
//! let edl = "\
//! TITLE: EP039
//! 001  A001C003 V     C        10:00:00:00 10:00:02:01 01:00:10:00 01:00:12:00
//! * Marker Metadata
//! * 01:00:10:00 HH_103_039_020 - Remove shadow
//! * End Marker Metadata
//! ";
//!
//! let output = parse_edl(edl, 24.0).unwrap();
//! let shot = &output.shots[0];
//! assert_eq!(shot.episode, "039");
//! assert_eq!(shot.record_range(), "01:00:10:00 - 01:00:12:00");
//! assert_eq!(shot.duration_frames, 48);
//!
//! let report = diff_shots(&output.shots, &[]);
//! assert_eq!(report.entries[0].status, DiffStatus::New);
//! ```

mod cache;
mod config;
mod correlate;
mod diff;
mod episode;
mod error;
mod event;
mod marker;
mod parser;
mod table;

pub use cache::{CacheKey, CacheStats, ParseCache};
pub use config::{ParserConfig, DEFAULT_VFX_PREFIX};
pub use correlate::{
    best_match, correlate, group_range, Correlation, ShotRecord, DEFAULT_TOLERANCE_FRAMES,
};
pub use diff::{
    diff_shots, diff_table, diff_tables, DiffEntry, DiffReport, DiffStatus, DiffSummary,
    FieldChange,
};
pub use episode::{EpisodeRule, PatternEpisodeRule, SegmentEpisodeRule, DEFAULT_EPISODE_PATTERN};
pub use error::{Error, Result};
pub use event::{extract_events, BlockTokens, CutEvent, Extraction};
pub use marker::{extract_markers, parse_marker_line, Marker, MarkerExtraction};
pub use parser::{parse_edl, EdlParser, ParseOutput, ParseStats, ParseWarning};
pub use table::{
    read_table, write_table, ShotTable, TableOptions, BASE_COLUMNS, COL_DESCRIPTION, COL_DURATION,
    COL_EPISODE, COL_SOURCE_TC_IN, COL_SOURCE_TC_OUT, COL_TC_IN_OUT, COL_VFX_CODE,
};

pub use vfxpull_timecode::FrameRate;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
