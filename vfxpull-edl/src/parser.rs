//! End-to-end EDL parsing: extraction, correlation and warnings.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vfxpull_timecode::FrameRate;

use crate::cache::{CacheKey, CacheStats, ParseCache};
use crate::config::ParserConfig;
use crate::correlate::{correlate, ShotRecord};
use crate::episode::{EpisodeRule, PatternEpisodeRule};
use crate::error::{Error, Result};
use crate::event::{extract_events, BlockTokens};
use crate::marker::extract_markers;

/// Non-fatal conditions found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// No straight video cut events were found.
    NoEvents,
    /// No VFX markers were found in the marker block.
    NoMarkers,
    /// Markers that had no event to attach to.
    UnmatchedMarkers { codes: Vec<String> },
    /// Marker lines that carried the prefix but could not be parsed.
    MalformedMarkers { count: usize },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEvents => write!(f, "no video cut events found"),
            Self::NoMarkers => write!(f, "no VFX markers found"),
            Self::UnmatchedMarkers { codes } => {
                write!(f, "{} marker(s) with no matching event: {}", codes.len(), codes.join(", "))
            }
            Self::MalformedMarkers { count } => write!(f, "{count} malformed marker line(s) skipped"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub events: usize,
    pub marker_lines: usize,
    pub markers: usize,
    pub shots: usize,
}

/// Everything produced by one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOutput {
    pub title: Option<String>,
    pub shots: Vec<ShotRecord>,
    pub warnings: Vec<ParseWarning>,
    pub stats: ParseStats,
}

impl ParseOutput {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Configured EDL parser.
///
/// Parsing is a pure function of the text and frame rate. An attached
/// [`ParseCache`] only avoids repeated work.
#[derive(Debug)]
pub struct EdlParser {
    config: ParserConfig,
    tokens: BlockTokens,
    episodes: Box<dyn EpisodeRule>,
    cache: Option<ParseCache>,
}

impl EdlParser {
    pub fn new(config: ParserConfig) -> Result<Self> {
        config.validate()?;
        let episodes = PatternEpisodeRule::new(&config.episode_pattern)?;
        Ok(Self {
            tokens: config.block_tokens(),
            config,
            episodes: Box::new(episodes),
            cache: None,
        })
    }

    /// Replace the episode rule built from `episode_pattern`.
    pub fn with_episode_rule(mut self, rule: impl EpisodeRule + 'static) -> Self {
        self.episodes = Box::new(rule);
        self
    }

    /// Keep up to `capacity` results, keyed by text and rate.
    pub fn with_cache(mut self, capacity: usize) -> Self {
        self.cache = Some(ParseCache::new(capacity));
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ParseCache::stats)
    }

    /// Parse EDL text. Never fails; problems are reported as warnings.
    pub fn parse(&self, text: &str, rate: FrameRate) -> ParseOutput {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        match &self.cache {
            Some(cache) => {
                let key = CacheKey::new(text, rate.as_f64());
                let output = cache.get_or_insert_with(key, || self.parse_uncached(text, rate));
                ParseOutput::clone(&output)
            }
            None => self.parse_uncached(text, rate),
        }
    }

    /// Decode UTF-8 bytes and parse them.
    pub fn parse_bytes(&self, bytes: &[u8], rate: FrameRate) -> Result<ParseOutput> {
        let text = std::str::from_utf8(bytes).map_err(|e| Error::Encoding {
            offset: e.valid_up_to(),
        })?;
        Ok(self.parse(text, rate))
    }

    fn parse_uncached(&self, text: &str, rate: FrameRate) -> ParseOutput {
        let extraction = extract_events(text, rate, &self.tokens);
        let markers = extract_markers(&extraction.marker_lines, rate, &self.config.vfx_prefix);
        let correlation = correlate(
            &extraction.events,
            &markers.markers,
            rate,
            self.config.tolerance_frames,
            self.episodes.as_ref(),
        );

        let mut warnings = Vec::new();
        if extraction.events.is_empty() {
            warn!("No video cut events found");
            warnings.push(ParseWarning::NoEvents);
        }
        if markers.markers.is_empty() {
            warn!(prefix = %self.config.vfx_prefix, "No VFX markers found");
            warnings.push(ParseWarning::NoMarkers);
        }
        if markers.malformed > 0 {
            warn!(count = markers.malformed, "Skipped malformed marker lines");
            warnings.push(ParseWarning::MalformedMarkers {
                count: markers.malformed,
            });
        }
        if !correlation.unmatched.is_empty() {
            warn!(count = correlation.unmatched.len(), "Markers without a matching event");
            warnings.push(ParseWarning::UnmatchedMarkers {
                codes: correlation.unmatched,
            });
        }

        let stats = ParseStats {
            events: extraction.events.len(),
            marker_lines: extraction.marker_lines.len(),
            markers: markers.markers.len(),
            shots: correlation.shots.len(),
        };
        info!(
            events = stats.events,
            markers = stats.markers,
            shots = stats.shots,
            fps = %rate,
            "Parsed EDL"
        );

        ParseOutput {
            title: extraction.title,
            shots: correlation.shots,
            warnings,
            stats,
        }
    }
}

impl Default for EdlParser {
    fn default() -> Self {
        Self {
            config: ParserConfig::default(),
            tokens: BlockTokens::default(),
            episodes: Box::new(PatternEpisodeRule::default()),
            cache: None,
        }
    }
}

/// Parse EDL text with the default configuration.
///
/// Fails only when `frame_rate` is not a positive finite number.
pub fn parse_edl(text: &str, frame_rate: f64) -> Result<ParseOutput> {
    let rate = FrameRate::new(frame_rate)?;
    Ok(EdlParser::default().parse(text, rate))
}
