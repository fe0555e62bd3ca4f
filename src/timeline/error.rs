use std::{fmt::Display, sync::Arc};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimelineError {
    /// Failure coming from the aggregate provider. Display and source are the provider's own.
    #[error(transparent)]
    ProviderUnavailable(anyhow::Error),
    #[error("malformed aggregate row for category {category:?}: {reason}")]
    MalformedAggregateRow {
        category: Arc<str>,
        reason: MalformedReason,
    },
    #[error("invalid day argument: {0}")]
    InvalidDayArgument(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    UnparseableTimestamp(String),
    /// Timestamp is on the requested day but not on a ten-minute boundary.
    UnalignedTimestamp(String),
    NegativeDuration(i64),
    /// The category's seconds for the day don't fit into `u64`.
    DurationOverflow,
    EmptyCategory,
    EmptyColor,
}

impl Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::UnparseableTimestamp(v) => write!(f, "can't parse timestamp {v:?}"),
            MalformedReason::UnalignedTimestamp(v) => {
                write!(f, "timestamp {v:?} doesn't start a ten minute slot")
            }
            MalformedReason::NegativeDuration(v) => write!(f, "negative duration {v}"),
            MalformedReason::DurationOverflow => write!(f, "total duration overflows"),
            MalformedReason::EmptyCategory => write!(f, "empty category"),
            MalformedReason::EmptyColor => write!(f, "empty color"),
        }
    }
}
