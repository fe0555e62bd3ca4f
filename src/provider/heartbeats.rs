use std::{collections::BTreeMap, fmt::Debug};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, TimeZone, Timelike};
use futures::{stream, StreamExt, TryStreamExt};
use tracing::{error, instrument, trace};

use crate::{
    storage::{
        entities::{CategoryEntity, HeartbeatEntity},
        heartbeat_storage::HeartbeatStorage,
    },
    timeline::{day::DayRange, model::RawAggregate},
};

use super::AggregateProvider;

const BUCKET_MINUTES: u32 = 10;
const BUCKET_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Builds raw aggregates out of stored heartbeats. `tz` decides where local buckets start.
pub struct HeartbeatAggregateProvider<S, Tz> {
    storage: S,
    tz: Tz,
}

impl<S: HeartbeatStorage, Tz: TimeZone> HeartbeatAggregateProvider<S, Tz> {
    pub fn new(storage: S, tz: Tz) -> Self {
        Self { storage, tz }
    }
}

#[async_trait]
impl<S, Tz> AggregateProvider for HeartbeatAggregateProvider<S, Tz>
where
    S: HeartbeatStorage + Send + Sync,
    Tz: TimeZone + Debug + Send + Sync,
{
    #[instrument(skip(self))]
    async fn fetch_raw_aggregates(&self, range: &DayRange) -> Result<Vec<RawAggregate>> {
        let heartbeats = load_heartbeats(&self.storage, range).await?;
        trace!("Loaded {} heartbeats", heartbeats.len());
        Ok(aggregate_heartbeats(heartbeats, range, &self.tz))
    }
}

/// Reads every UTC record file the local day overlaps.
async fn load_heartbeats(
    storage: &(impl HeartbeatStorage + Sync),
    range: &DayRange,
) -> Result<Vec<HeartbeatEntity>> {
    stream::iter(range.utc_dates())
        .map(|date| async move {
            storage
                .get_data_for(date)
                .await
                .inspect_err(|e| error!("Failed to read records for {date} {e}"))
        })
        .buffered(4)
        .try_concat()
        .await
}

/// Sums active time per category for every local ten-minute bucket. Only heartbeats that aren't
/// idle and lie completely inside the day are counted. Rows come out ordered by bucket, and inside
/// a bucket by the first heartbeat of each category.
pub fn aggregate_heartbeats<Tz: TimeZone>(
    mut heartbeats: Vec<HeartbeatEntity>,
    range: &DayRange,
    tz: &Tz,
) -> Vec<RawAggregate> {
    heartbeats.sort_by_key(|v| v.start);

    let mut buckets = BTreeMap::<NaiveDateTime, Vec<(CategoryEntity, i64)>>::new();
    for heartbeat in heartbeats {
        if heartbeat.idle || !range.contains(heartbeat.start) || heartbeat.end > range.end {
            continue;
        }
        let bucket = truncate_to_bucket(heartbeat.start.with_timezone(tz).naive_local());
        let category = heartbeat.category();
        let seconds = heartbeat.duration().num_seconds();

        let entries = buckets.entry(bucket).or_default();
        match entries.iter_mut().find(|(existing, _)| existing.name == category.name) {
            Some((_, total)) => *total += seconds,
            None => entries.push((category, seconds)),
        }
    }

    buckets
        .into_iter()
        .flat_map(|(bucket, entries)| {
            let timestamp = bucket.format(BUCKET_FORMAT).to_string();
            entries.into_iter().map(move |(category, seconds)| {
                RawAggregate::new(category.name, seconds, timestamp.clone(), category.color)
            })
        })
        .collect()
}

fn truncate_to_bucket(moment: NaiveDateTime) -> NaiveDateTime {
    moment
        - Duration::minutes((moment.minute() % BUCKET_MINUTES) as i64)
        - Duration::seconds(moment.second() as i64)
        - Duration::nanoseconds(moment.nanosecond() as i64)
}
