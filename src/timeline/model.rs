use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One row handed over by an [AggregateProvider](crate::provider::AggregateProvider): the summed
/// active seconds of a single category inside a single native ten-minute bucket.
/// `active_seconds` is signed so that a negative duration from a provider can be reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAggregate {
    pub category: Arc<str>,
    pub active_seconds: i64,
    /// Local time truncated to minute granularity. For example `2024-04-05 09:10:00`.
    pub slot_timestamp: String,
    pub color: Arc<str>,
}

impl RawAggregate {
    pub fn new(
        category: impl Into<Arc<str>>,
        active_seconds: i64,
        slot_timestamp: impl Into<String>,
        color: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            category: category.into(),
            active_seconds,
            slot_timestamp: slot_timestamp.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRow {
    /// Slot label, `HH:MM`.
    pub time: Arc<str>,
    pub category: Arc<str>,
    /// Seconds placed into this slot for the category.
    pub value: u64,
    /// Seconds placed by categories that come earlier in the display order.
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySeries {
    pub category: Arc<str>,
    pub color: Arc<str>,
    pub rows: Vec<TimelineRow>,
    /// Seconds still waiting for a slot once the day ran out.
    pub unplaced_seconds: u64,
}

impl CategorySeries {
    pub fn placed_seconds(&self) -> u64 {
        self.rows.iter().map(|row| row.value).sum()
    }
}

/// Render-ready stacked series for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSeries {
    pub labels: Vec<Arc<str>>,
    pub categories: Vec<CategorySeries>,
}

impl TimelineSeries {
    /// Total seconds placed into the slot at `index` across all categories.
    pub fn slot_total(&self, index: usize) -> u64 {
        self.categories
            .iter()
            .filter_map(|category| category.rows.get(index))
            .map(|row| row.value)
            .sum()
    }
}
