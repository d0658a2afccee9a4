//! Timecode arithmetic for EDL shot extraction.
//!
//! This crate converts between `HH:MM:SS:FF` text and absolute 0-indexed
//! frame counts at an arbitrary real-valued frame rate:
//!
//! - **Frame rates**: any positive rate, including fractional NTSC rates
//!   applied uniformly (no drop-frame counting)
//! - **Timecode**: parsing, formatting, and ordering of `HH:MM:SS:FF`
//! - **Conversion**: `timecode -> frames` and `frames -> timecode`, with the
//!   frame digits quantized to the rounded display rate
//!
//! # Quick Start
//!
//! ```rust
//! use vfxpull_timecode::{frames_to_timecode, timecode_to_frames, FrameRate, Timecode};
//!
//! let frames = timecode_to_frames("01:00:10:00", FrameRate::FPS_24).unwrap();
//! assert_eq!(frames, 86640);
//! assert_eq!(frames_to_timecode(frames as f64, 24.0), "01:00:10:00");
//!
//! // Fractional rates keep integer frame digits 00..=23
//! let tc: Timecode = "01:00:10:05".parse().unwrap();
//! let frames = tc.to_frames(FrameRate::FPS_23_976);
//! assert_eq!(Timecode::from_frames(frames, FrameRate::FPS_23_976), tc);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod error;
pub mod rate;
pub mod smpte;

// Re-export main types
pub use error::{Result, TimecodeError};
pub use rate::FrameRate;
pub use smpte::{frames_to_timecode, timecode_to_frames, Timecode, ZERO_TIMECODE};

/// Frame count between two timecodes at `rate` (negative if `end` is
/// before `start`).
#[must_use]
pub fn duration_frames(start: &Timecode, end: &Timecode, rate: FrameRate) -> i64 {
    end.to_frames(rate) as i64 - start.to_frames(rate) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duration_frames() {
        let start: Timecode = "01:00:10:00".parse().unwrap();
        let end: Timecode = "01:00:12:00".parse().unwrap();
        assert_eq!(duration_frames(&start, &end, FrameRate::FPS_24), 48);
        assert_eq!(duration_frames(&end, &start, FrameRate::FPS_24), -48);
    }

    #[test]
    fn test_parse_and_format_roundtrip() {
        for original in ["00:00:00:00", "12:34:56:07", "23:59:59:23", "01:00:10:00"] {
            let frames = timecode_to_frames(original, FrameRate::FPS_24).unwrap();
            assert_eq!(frames_to_timecode(frames as f64, 24.0), original);
        }
    }

    #[test]
    fn test_timecode_comparison() {
        let tc1 = Timecode::new(0, 0, 0, 0);
        let tc2 = Timecode::new(0, 0, 0, 1);
        let tc3 = Timecode::new(0, 0, 1, 0);

        assert!(tc1 < tc2);
        assert!(tc2 < tc3);
        assert!(tc1 < tc3);
    }

    #[test]
    fn test_frame_rate_conversions() {
        let frame_rates = [
            FrameRate::FPS_23_976,
            FrameRate::FPS_24,
            FrameRate::FPS_25,
            FrameRate::FPS_29_97,
            FrameRate::FPS_30,
            FrameRate::FPS_48,
            FrameRate::FPS_50,
            FrameRate::FPS_59_94,
            FrameRate::FPS_60,
        ];

        for fps in frame_rates {
            let tc = Timecode::new(0, 1, 0, 0);
            let frames = tc.to_frames(fps);
            let expected = (60.0 * fps.as_f64()).round() as u64;
            assert_eq!(frames, expected, "Frame rate {} gave {} frames", fps, frames);
        }
    }
}
