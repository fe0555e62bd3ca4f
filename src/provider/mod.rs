//! Sources of [RawAggregate] rows for the timeline engine.

pub mod heartbeats;

use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::timeline::{day::DayRange, model::RawAggregate};

/// Returns, for every category and native ten-minute bucket of the day, the summed non-idle
/// seconds. Rows for one bucket are expected in a stable order.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AggregateProvider: Send + Sync {
    async fn fetch_raw_aggregates(&self, range: &DayRange) -> Result<Vec<RawAggregate>>;
}
