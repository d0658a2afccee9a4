//! `HH:MM:SS:FF` timecode and absolute frame conversion.
//!
//! Frame counts are 0-indexed. Seconds are scaled by the raw frame rate,
//! while the `FF` digits count against the rounded display rate, so a
//! 23.976 timeline still displays frames `00..=23`.

use crate::error::{Result, TimecodeError};
use crate::rate::FrameRate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Zero timecode, returned by the fail-safe conversions.
pub const ZERO_TIMECODE: &str = "00:00:00:00";

/// A non-drop-frame `HH:MM:SS:FF` timecode.
///
/// Field order makes the derived ordering match timeline order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timecode {
    /// Hours (not wrapped at 24)
    pub hours: u32,
    /// Minutes (0-59)
    pub minutes: u32,
    /// Seconds (0-59)
    pub seconds: u32,
    /// Frames (0 to display fps - 1)
    pub frames: u32,
}

impl Timecode {
    /// Create a timecode from its components.
    #[must_use]
    pub fn new(hours: u32, minutes: u32, seconds: u32, frames: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            frames,
        }
    }

    /// Whole seconds before the frame component.
    #[must_use]
    pub fn total_seconds(&self) -> u64 {
        self.hours as u64 * 3600 + self.minutes as u64 * 60 + self.seconds as u64
    }

    /// Absolute frame count: `round(total_seconds * rate + frames)`.
    #[must_use]
    pub fn to_frames(&self, rate: FrameRate) -> u64 {
        let exact = self.total_seconds() as f64 * rate.as_f64() + self.frames as f64;
        exact.round() as u64
    }

    /// Build a timecode from an absolute frame count.
    ///
    /// Seconds come from flooring `frames / rate` with the raw rate. The
    /// frame digits are what remains, rounded; if that reaches the display
    /// rate the second count rolls forward.
    #[must_use]
    pub fn from_frames(frames: u64, rate: FrameRate) -> Self {
        let fps = rate.as_f64();
        let display = rate.display_fps();

        let total_seconds = (frames as f64 / fps).floor() as u64;
        let remainder = frames as f64 - total_seconds as f64 * fps;
        let frame_digits = remainder.round().max(0.0) as u64;
        let total_seconds = total_seconds.saturating_add(frame_digits / display);
        let frame_digits = frame_digits % display;

        Self {
            hours: u32::try_from(total_seconds / 3600).unwrap_or(u32::MAX),
            minutes: ((total_seconds % 3600) / 60) as u32,
            seconds: (total_seconds % 60) as u32,
            frames: frame_digits as u32,
        }
    }

}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 4 {
            return Err(TimecodeError::invalid_format(format!(
                "expected HH:MM:SS:FF, got '{}' ({} fields)",
                s.trim(),
                parts.len()
            )));
        }

        let field = |name: &str, text: &str| -> Result<u32> {
            let text = text.trim();
            if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TimecodeError::invalid_component(name, text));
            }
            text.parse()
                .map_err(|_| TimecodeError::invalid_component(name, text))
        };

        Ok(Self {
            hours: field("hours", parts[0])?,
            minutes: field("minutes", parts[1])?,
            seconds: field("seconds", parts[2])?,
            frames: field("frames", parts[3])?,
        })
    }
}

/// Parse a timecode string and convert it to an absolute frame count.
///
/// Fails unless the text has exactly four non-negative integer fields.
/// Callers that process untrusted lines treat the error as "skip".
///
/// # Example
/// ```rust
/// use vfxpull_timecode::{timecode_to_frames, FrameRate};
///
/// assert_eq!(timecode_to_frames("00:00:02:00", FrameRate::FPS_24).unwrap(), 48);
/// assert!(timecode_to_frames("01:00:10", FrameRate::FPS_24).is_err());
/// ```
pub fn timecode_to_frames(tc: &str, rate: FrameRate) -> Result<u64> {
    Ok(tc.parse::<Timecode>()?.to_frames(rate))
}

/// Convert an absolute frame count back to `HH:MM:SS:FF` text.
///
/// Fails safe: a non-finite `frames`, a `rate` that is not a positive
/// finite number, or a second count beyond `u64` yields `00:00:00:00`.
/// Negative frame counts clamp to zero.
///
/// # Example
/// ```rust
/// use vfxpull_timecode::frames_to_timecode;
///
/// assert_eq!(frames_to_timecode(48.0, 24.0), "00:00:02:00");
/// assert_eq!(frames_to_timecode(48.0, 0.0), "00:00:00:00");
/// ```
#[must_use]
pub fn frames_to_timecode(frames: f64, rate: f64) -> String {
    if !frames.is_finite() {
        return ZERO_TIMECODE.to_string();
    }
    let Ok(rate) = FrameRate::new(rate) else {
        return ZERO_TIMECODE.to_string();
    };
    let seconds = frames / rate.as_f64();
    if !seconds.is_finite() || seconds >= u64::MAX as f64 {
        return ZERO_TIMECODE.to_string();
    }
    let frames = frames.round().max(0.0) as u64;
    Timecode::from_frames(frames, rate).to_string()
}
