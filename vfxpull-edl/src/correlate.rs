//! Marker-to-cut correlation and contiguous shot grouping.
//!
//! Conform EDLs often split one VFX shot across several cut events (speed
//! changes, reframes, retimes). Each marker is matched to its best cut,
//! then the shot is extended across every following cut that starts within
//! `tolerance` frames of the running out point.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vfxpull_timecode::{frames_to_timecode, FrameRate};

use crate::episode::EpisodeRule;
use crate::event::CutEvent;
use crate::marker::Marker;

/// Default gap, in frames, still treated as contiguous.
pub const DEFAULT_TOLERANCE_FRAMES: u64 = 2;

/// One VFX shot: a marker merged with its run of contiguous cuts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub vfx_code: String,
    pub episode: String,
    pub record_tc_in: String,
    pub record_tc_out: String,
    pub source_tc_in: String,
    pub source_tc_out: String,
    pub duration_frames: u64,
    pub description: String,
}

impl ShotRecord {
    /// Combined `"in - out"` record range, as shown in the `TC IN/OUT` column.
    pub fn record_range(&self) -> String {
        format!("{} - {}", self.record_tc_in, self.record_tc_out)
    }
}

/// Output of [`correlate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correlation {
    /// Shots in marker input order.
    pub shots: Vec<ShotRecord>,
    /// VFX codes of markers with no candidate event.
    pub unmatched: Vec<String>,
}

/// Index of the event best matching `frame`.
///
/// Distance is zero when the frame is inside `[record_in, record_out)`,
/// otherwise the absolute distance to `record_in`. Ties go to the event
/// with the later record in, which places a marker sitting on a cut point
/// in the following shot. `events` must be sorted by record in.
pub fn best_match(events: &[CutEvent], frame: u64) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (idx, event) in events.iter().enumerate() {
        let distance = if event.contains(frame) {
            0
        } else {
            frame.abs_diff(event.record_in_frames)
        };
        match best {
            Some((best_idx, best_distance))
                if distance > best_distance
                    || (distance == best_distance
                        && event.record_in_frames < events[best_idx].record_in_frames) => {}
            _ => best = Some((idx, distance)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Merged `[in, out)` frame range starting at `events[start]`.
///
/// Absorbs following events while each starts no later than
/// `out + tolerance`; stops at the first larger gap.
pub fn group_range(events: &[CutEvent], start: usize, tolerance: u64) -> (u64, u64) {
    let first = &events[start];
    let group_in = first.record_in_frames;
    let mut group_out = first.record_out_frames;

    for next in &events[start + 1..] {
        if next.record_in_frames > group_out.saturating_add(tolerance) {
            break;
        }
        group_out = group_out.max(next.record_out_frames);
    }

    (group_in, group_out)
}

/// Build one [`ShotRecord`] per marker that has a matching event.
pub fn correlate(
    events: &[CutEvent],
    markers: &[Marker],
    rate: FrameRate,
    tolerance: u64,
    episodes: &dyn EpisodeRule,
) -> Correlation {
    let mut out = Correlation::default();
    let fps = rate.as_f64();

    for marker in markers {
        let Some(idx) = best_match(events, marker.marker_frames) else {
            out.unmatched.push(marker.vfx_code.clone());
            continue;
        };

        let first = &events[idx];
        let (group_in, group_out) = group_range(events, idx, tolerance);
        let duration_frames = group_out.saturating_sub(group_in);

        // Source duration follows the grouped record duration.
        let source_tc_out =
            frames_to_timecode((first.source_in_frames + duration_frames) as f64, fps);

        debug!(
            vfx_code = %marker.vfx_code,
            event = first.id,
            group_in,
            group_out,
            "Marker matched"
        );

        out.shots.push(ShotRecord {
            vfx_code: marker.vfx_code.clone(),
            episode: episodes.episode(&marker.vfx_code),
            record_tc_in: frames_to_timecode(group_in as f64, fps),
            record_tc_out: frames_to_timecode(group_out as f64, fps),
            source_tc_in: first.source_tc_in.clone(),
            source_tc_out,
            duration_frames,
            description: marker.description.clone(),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::PatternEpisodeRule;
    use pretty_assertions::assert_eq;
    use vfxpull_timecode::timecode_to_frames;

    fn event(id: u32, source_in: &str, record_in: u64, record_out: u64) -> CutEvent {
        let rate = FrameRate::FPS_24;
        CutEvent {
            id,
            reel: format!("R{id}"),
            clip_name: format!("R{id}"),
            track: "V".into(),
            source_tc_in: source_in.into(),
            source_tc_out: source_in.into(),
            record_tc_in: frames_to_timecode(record_in as f64, 24.0),
            record_tc_out: frames_to_timecode(record_out as f64, 24.0),
            source_in_frames: timecode_to_frames(source_in, rate).unwrap(),
            record_in_frames: record_in,
            record_out_frames: record_out,
            line: id as usize,
        }
    }

    fn marker(code: &str, frames: u64) -> Marker {
        Marker {
            vfx_code: code.into(),
            marker_tc: frames_to_timecode(frames as f64, 24.0),
            marker_frames: frames,
            description: String::new(),
        }
    }

    #[test]
    fn test_best_match_inside() {
        let events = vec![event(1, "00:00:00:00", 0, 10), event(2, "00:00:00:00", 10, 20)];
        assert_eq!(best_match(&events, 5), Some(0));
        assert_eq!(best_match(&events, 15), Some(1));
    }

    #[test]
    fn test_best_match_on_cut_point_prefers_following() {
        // Frame 10 is inside event 2 only (event 1 is exclusive at 10).
        let events = vec![event(1, "00:00:00:00", 0, 10), event(2, "00:00:00:00", 10, 20)];
        assert_eq!(best_match(&events, 10), Some(1));
    }

    #[test]
    fn test_best_match_tie_prefers_later() {
        // Frame 15 sits in a gap, 5 from event 2's in and 5 from event 3's in.
        let events = vec![
            event(1, "00:00:00:00", 0, 8),
            event(2, "00:00:00:00", 10, 12),
            event(3, "00:00:00:00", 20, 30),
        ];
        assert_eq!(best_match(&events, 15), Some(2));
    }

    #[test]
    fn test_best_match_nearest_before() {
        let events = vec![event(1, "00:00:00:00", 100, 110)];
        assert_eq!(best_match(&events, 50), Some(0));
        assert_eq!(best_match(&[], 50), None);
    }

    #[test]
    fn test_group_range_within_tolerance() {
        let events = vec![
            event(1, "00:00:00:00", 0, 10),
            event(2, "00:00:00:00", 11, 20),
            event(3, "00:00:00:00", 22, 30),
            event(4, "00:00:00:00", 40, 50),
        ];
        assert_eq!(group_range(&events, 0, 2), (0, 30));
        assert_eq!(group_range(&events, 0, 0), (0, 10));
        assert_eq!(group_range(&events, 3, 2), (40, 50));
    }

    #[test]
    fn test_group_range_keeps_max_out() {
        // A short overlapping cut must not pull the out point back.
        let events = vec![
            event(1, "00:00:00:00", 0, 30),
            event(2, "00:00:00:00", 5, 10),
            event(3, "00:00:00:00", 31, 40),
        ];
        assert_eq!(group_range(&events, 0, 2), (0, 40));
    }

    #[test]
    fn test_correlate_fields() {
        let events = vec![
            event(1, "10:00:00:00", 86640, 86664),
            event(2, "12:00:00:00", 86665, 86688),
        ];
        let markers = vec![marker("HH_103_039_020", 86640), marker("HH_103_039_030", 86700)];
        let rule = PatternEpisodeRule::default();
        let result = correlate(&events, &markers, FrameRate::FPS_24, 2, &rule);

        assert!(result.unmatched.is_empty());
        assert_eq!(result.shots.len(), 2);
        let shot = &result.shots[0];
        assert_eq!(shot.episode, "039");
        assert_eq!(shot.record_tc_in, "01:00:10:00");
        assert_eq!(shot.record_tc_out, "01:00:12:00");
        assert_eq!(shot.duration_frames, 48);
        assert_eq!(shot.source_tc_in, "10:00:00:00");
        assert_eq!(shot.source_tc_out, "10:00:02:00");

        // Second marker is past both events: nearest record in is event 2.
        let shot = &result.shots[1];
        assert_eq!(shot.source_tc_in, "12:00:00:00");
        assert_eq!(shot.duration_frames, 23);
    }

    #[test]
    fn test_correlate_without_events() {
        let markers = vec![marker("HH_103_039_020", 0)];
        let rule = PatternEpisodeRule::default();
        let result = correlate(&[], &markers, FrameRate::FPS_24, 2, &rule);
        assert!(result.shots.is_empty());
        assert_eq!(result.unmatched, vec!["HH_103_039_020".to_string()]);
    }
}
