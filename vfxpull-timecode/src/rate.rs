//! Real-valued frame rates.
//!
//! A [`FrameRate`] is a plain positive scale factor between timecode and
//! frame counts. Fractional NTSC rates such as 23.976 are kept as-is and
//! applied uniformly; there is no drop-frame counting. Timecode display
//! uses the rounded rate ([`FrameRate::display_fps`]) for the frame digits.

use crate::error::{Result, TimecodeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A positive, finite frame rate in frames per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct FrameRate(f64);

impl FrameRate {
    /// 23.976 fps (NTSC film, applied as 23.976 exactly).
    pub const FPS_23_976: Self = Self(23.976);
    /// 24 fps (film)
    pub const FPS_24: Self = Self(24.0);
    /// 25 fps (PAL)
    pub const FPS_25: Self = Self(25.0);
    /// 29.97 fps (NTSC, applied as 29.97 exactly).
    pub const FPS_29_97: Self = Self(29.97);
    /// 30 fps
    pub const FPS_30: Self = Self(30.0);
    /// 48 fps (HFR film)
    pub const FPS_48: Self = Self(48.0);
    /// 50 fps (PAL)
    pub const FPS_50: Self = Self(50.0);
    /// 59.94 fps (NTSC, applied as 59.94 exactly).
    pub const FPS_59_94: Self = Self(59.94);
    /// 60 fps
    pub const FPS_60: Self = Self(60.0);

    /// Create a frame rate, rejecting zero, negative, and non-finite values.
    pub fn new(fps: f64) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(TimecodeError::invalid_frame_rate(fps));
        }
        Ok(Self(fps))
    }

    /// Create a frame rate from a rational (e.g. 24000/1001).
    pub fn from_rational(numerator: u32, denominator: u32) -> Result<Self> {
        if denominator == 0 {
            return Err(TimecodeError::invalid_frame_rate(format!(
                "{numerator}/{denominator}"
            )));
        }
        Self::new(numerator as f64 / denominator as f64)
    }

    /// The raw rate used for seconds arithmetic.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// The integer frame count per displayed second (`round(rate)`).
    #[must_use]
    pub fn display_fps(&self) -> u64 {
        // Sub-0.5 rates would otherwise round to a zero-width second.
        (self.0.round() as u64).max(1)
    }

    /// Whether the rate is a whole number of frames per second.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.0.fract() == 0.0
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_24
    }
}

impl TryFrom<f64> for FrameRate {
    type Error = TimecodeError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<FrameRate> for f64 {
    fn from(rate: FrameRate) -> Self {
        rate.0
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FrameRate {
    type Err = TimecodeError;

    /// Parse `"24"`, `"23.976"`, or a rational such as `"24000/1001"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((num, den)) = s.split_once('/') {
            let numerator: u32 = num
                .trim()
                .parse()
                .map_err(|_| TimecodeError::invalid_frame_rate(s))?;
            let denominator: u32 = den
                .trim()
                .parse()
                .map_err(|_| TimecodeError::invalid_frame_rate(s))?;
            return Self::from_rational(numerator, denominator);
        }
        let fps: f64 = s.parse().map_err(|_| TimecodeError::invalid_frame_rate(s))?;
        Self::new(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rejects_invalid_rates() {
        assert!(FrameRate::new(0.0).is_err());
        assert!(FrameRate::new(-25.0).is_err());
        assert!(FrameRate::new(f64::NAN).is_err());
        assert!(FrameRate::new(f64::INFINITY).is_err());
        assert!(FrameRate::from_rational(24, 0).is_err());
    }

    #[test]
    fn test_display_fps() {
        assert_eq!(FrameRate::FPS_23_976.display_fps(), 24);
        assert_eq!(FrameRate::FPS_29_97.display_fps(), 30);
        assert_eq!(FrameRate::FPS_59_94.display_fps(), 60);
        assert_eq!(FrameRate::FPS_25.display_fps(), 25);
    }

    #[test]
    fn test_parse() {
        assert_eq!("24".parse::<FrameRate>().unwrap(), FrameRate::FPS_24);
        assert_eq!("23.976".parse::<FrameRate>().unwrap(), FrameRate::FPS_23_976);
        let ntsc: FrameRate = "30000/1001".parse().unwrap();
        assert!((ntsc.as_f64() - 29.97).abs() < 0.001);
        assert!("fast".parse::<FrameRate>().is_err());
        assert!("0".parse::<FrameRate>().is_err());
    }

    #[test]
    fn test_is_integer() {
        assert!(FrameRate::FPS_24.is_integer());
        assert!(!FrameRate::FPS_23_976.is_integer());
    }

    #[test]
    fn test_serde_validates() {
        let rate: FrameRate = serde_json::from_str("25.0").unwrap();
        assert_eq!(rate, FrameRate::FPS_25);
        assert!(serde_json::from_str::<FrameRate>("-1.0").is_err());
    }
}
