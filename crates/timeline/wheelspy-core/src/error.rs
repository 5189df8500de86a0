//! Error types for the timeline engine.
//!
//! Every error is a usage or programming error surfaced to the caller at the
//! point it is detected. Nothing here is retried.

use serde::{Deserialize, Serialize};

use crate::ids::{NodeId, TargetId};

/// Broad family of a [`TimelineError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed range arguments, overlapping ranges, unknown selectors.
    Construction,
    /// A style value string that cannot be read as `<number><unit>`.
    Parse,
    /// A unit conversion whose probe measurements do not produce a ratio.
    Measurement,
    /// A configuration patch that failed to deserialize.
    Config,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TimelineError {
    /// `start` must be finite and strictly smaller than a finite `end`.
    #[error("start value should be smaller than end (got [{start}, {end}])")]
    InvalidRange { start: f64, end: f64 },

    /// The requested interval intersects a range already on the target.
    #[error("already has keyframe in range [{start},{end}]!")]
    OverlappingRange { start: f64, end: f64 },

    #[error("no element matches selector '{selector}'")]
    UnknownSelector { selector: String },

    #[error("unknown target {0:?}")]
    UnknownTarget(TargetId),

    #[error("Bad value: {value}")]
    BadValue { value: String },

    #[error("error get value of {property} on {node}")]
    Measurement { property: String, node: NodeId },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}

impl TimelineError {
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRange { .. }
            | Self::OverlappingRange { .. }
            | Self::UnknownSelector { .. }
            | Self::UnknownTarget(_) => ErrorKind::Construction,
            Self::BadValue { .. } => ErrorKind::Parse,
            Self::Measurement { .. } => ErrorKind::Measurement,
            Self::InvalidConfig { .. } => ErrorKind::Config,
        }
    }

    pub(crate) fn bad_value(value: impl Into<String>) -> Self {
        Self::BadValue {
            value: value.into(),
        }
    }
}

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
