//! Error types for timecode operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for timecode operations.
pub type Result<T> = std::result::Result<T, TimecodeError>;

/// Errors that can occur during timecode operations.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
pub enum TimecodeError {
    /// Invalid timecode format in string.
    #[error("Invalid timecode format: {message}")]
    InvalidFormat {
        /// Description of the format error.
        message: String,
    },

    /// Invalid timecode component value.
    #[error("Invalid timecode component: {component} = '{value}'")]
    InvalidComponent {
        /// Name of the invalid component (hours, minutes, seconds, frames).
        component: String,
        /// The text that failed to parse.
        value: String,
    },

    /// Frame rate that is zero, negative, or not a finite number.
    #[error("Invalid frame rate: {value}")]
    InvalidFrameRate {
        /// The rejected rate, as given.
        value: String,
    },
}

impl TimecodeError {
    /// Create an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an invalid component error.
    pub fn invalid_component(component: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidComponent {
            component: component.into(),
            value: value.into(),
        }
    }

    /// Create an invalid frame rate error.
    pub fn invalid_frame_rate(value: impl ToString) -> Self {
        Self::InvalidFrameRate {
            value: value.to_string(),
        }
    }
}
