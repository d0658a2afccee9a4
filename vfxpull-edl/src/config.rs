//! Parser configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::correlate::DEFAULT_TOLERANCE_FRAMES;
use crate::episode::{PatternEpisodeRule, DEFAULT_EPISODE_PATTERN};
use crate::error::{Error, Result};
use crate::event::BlockTokens;

/// Default VFX code prefix.
pub const DEFAULT_VFX_PREFIX: &str = "HH_";

/// Settings for [`EdlParser`](crate::EdlParser).
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```json
/// { "vfx_prefix": "SHW_", "tolerance_frames": 0 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Largest gap in frames between cuts still grouped into one shot.
    pub tolerance_frames: u64,
    /// Prefix identifying VFX marker codes.
    pub vfx_prefix: String,
    pub marker_block_start: String,
    pub marker_block_end: String,
    pub comment_sigil: String,
    /// Regex whose first capture group is the episode.
    pub episode_pattern: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let tokens = BlockTokens::default();
        Self {
            tolerance_frames: DEFAULT_TOLERANCE_FRAMES,
            vfx_prefix: DEFAULT_VFX_PREFIX.into(),
            marker_block_start: tokens.start,
            marker_block_end: tokens.end,
            comment_sigil: tokens.sigil,
            episode_pattern: DEFAULT_EPISODE_PATTERN.into(),
        }
    }
}

impl ParserConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.vfx_prefix.is_empty() {
            return Err(Error::InvalidConfig {
                message: "VFX prefix must not be empty".into(),
            });
        }
        if self.marker_block_start.is_empty() {
            return Err(Error::InvalidConfig {
                message: "Marker block start token must not be empty".into(),
            });
        }
        if self.comment_sigil.is_empty() {
            return Err(Error::InvalidConfig {
                message: "Comment sigil must not be empty".into(),
            });
        }
        PatternEpisodeRule::new(&self.episode_pattern)?;
        Ok(())
    }

    pub fn block_tokens(&self) -> BlockTokens {
        BlockTokens {
            start: self.marker_block_start.clone(),
            end: self.marker_block_end.clone(),
            sigil: self.comment_sigil.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.tolerance_frames, 2);
        assert_eq!(config.vfx_prefix, "HH_");
        assert_eq!(config.block_tokens(), BlockTokens::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = ParserConfig::from_json_str(r#"{"vfx_prefix":"SHW_","tolerance_frames":0}"#)
            .unwrap();
        assert_eq!(config.vfx_prefix, "SHW_");
        assert_eq!(config.tolerance_frames, 0);
        assert_eq!(config.marker_block_start, "* Marker Metadata");
    }

    #[test]
    fn test_invalid_configs() {
        let err = ParserConfig::from_json_str(r#"{"vfx_prefix":""}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));

        let err = ParserConfig::from_json_str(r#"{"episode_pattern":"(oops"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));

        let err = ParserConfig::from_json_str(r#"{"comment_sigil":""}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));

        let err = ParserConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ParserConfig::from_file("/nonexistent/vfxpull.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
