//! Episode extraction rules.
//!
//! VFX code conventions are project specific, so the episode lookup is a
//! trait. [`PatternEpisodeRule`] covers the common `SHOW_BLOCK_EPISODE_SHOT`
//! layout and can be pointed at any other pattern.

use std::fmt;

use regex::Regex;

use crate::error::{Error, Result};

/// Default pattern: third underscore segment of `SHOW_BLOCK_EPISODE_SHOT`.
pub const DEFAULT_EPISODE_PATTERN: &str = r"^[A-Za-z0-9]+_\d+_(\d+)(?:_|$)";

/// Derives an episode code from a VFX code.
pub trait EpisodeRule: Send + Sync + fmt::Debug {
    /// Episode for `vfx_code`, or an empty string when none applies.
    fn episode(&self, vfx_code: &str) -> String;
}

/// Regex capture with an underscore-segment fallback.
///
/// 1. The first capture group of `pattern`, if it matches.
/// 2. Otherwise the second `_`-delimited segment of the code.
/// 3. Otherwise an empty string.
#[derive(Debug, Clone)]
pub struct PatternEpisodeRule {
    pattern: Regex,
}

impl PatternEpisodeRule {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| Error::InvalidConfig {
            message: format!("episode pattern: {e}"),
        })?;
        if pattern.captures_len() < 2 {
            return Err(Error::InvalidConfig {
                message: "episode pattern needs a capture group".into(),
            });
        }
        Ok(Self { pattern })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for PatternEpisodeRule {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_EPISODE_PATTERN).expect("default episode pattern is valid"),
        }
    }
}

impl EpisodeRule for PatternEpisodeRule {
    fn episode(&self, vfx_code: &str) -> String {
        if let Some(m) = self.pattern.captures(vfx_code).and_then(|c| c.get(1)) {
            return m.as_str().to_string();
        }
        vfx_code
            .split('_')
            .nth(1)
            .map(str::to_string)
            .unwrap_or_default()
    }
}

/// Fixed underscore segment, e.g. `SegmentEpisodeRule(2)` for `A_B_EP_D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentEpisodeRule(pub usize);

impl EpisodeRule for SegmentEpisodeRule {
    fn episode(&self, vfx_code: &str) -> String {
        vfx_code
            .split('_')
            .nth(self.0)
            .map(str::to_string)
            .unwrap_or_default()
    }
}
