//! Builds a stacked 24 hour timeline out of raw per-category aggregates.
//!
//! The pipeline is:
//!  - [slots] matches provider rows to the 144 ten-minute slots of the day.
//!  - [carryover] clamps every slot to [slots::SLOT_CAPACITY_SECONDS] and pushes the overflow
//!    into later slots of the same category.
//!  - [stack] computes stacked offsets for rendering.
//!
//! All state is owned by a single call, so concurrent requests don't interact.

pub mod carryover;
pub mod day;
pub mod error;
pub mod model;
pub mod slots;
pub mod stack;

use std::fmt::Debug;

use chrono::{NaiveDate, TimeZone};
use tracing::{debug, instrument, warn};

use crate::provider::AggregateProvider;

use carryover::redistribute;
use day::{resolve_day_millis, DayRange};
use error::TimelineError;
use model::{RawAggregate, TimelineSeries};
use slots::{bucketize, slot_labels, BucketedDay};
use stack::build_stack;

/// A single category can't be active for longer than the day itself.
pub const MAX_DAY_SECONDS: u64 = 24 * 60 * 60;

pub struct TimelineEngine<P, Tz> {
    provider: P,
    tz: Tz,
}

impl<P: AggregateProvider, Tz: TimeZone + Debug> TimelineEngine<P, Tz> {
    pub fn new(provider: P, tz: Tz) -> Self {
        Self { provider, tz }
    }

    /// Fetches aggregates for the local `day` and turns them into a [TimelineSeries].
    /// Provider failures are returned as is, without retries.
    #[instrument(skip(self))]
    pub async fn get_timeline(&self, day: NaiveDate) -> Result<TimelineSeries, TimelineError> {
        let range = DayRange::new(day, &self.tz)?;
        let rows = self
            .provider
            .fetch_raw_aggregates(&range)
            .await
            .map_err(TimelineError::ProviderUnavailable)?;
        debug!("Fetched {} aggregate rows", rows.len());
        build_timeline(day, &rows)
    }

    /// Same as [Self::get_timeline] for the day containing `millis` since the epoch.
    pub async fn get_timeline_at(&self, millis: i64) -> Result<TimelineSeries, TimelineError> {
        let day = resolve_day_millis(millis, &self.tz)?;
        self.get_timeline(day).await
    }
}

pub fn build_timeline(
    day: NaiveDate,
    rows: &[RawAggregate],
) -> Result<TimelineSeries, TimelineError> {
    let bucketed = bucketize(day, rows)?;
    report_anomalies(day, &bucketed);

    let placement = redistribute(&bucketed);
    for (category, unplaced) in bucketed.categories.iter().zip(&placement.unplaced) {
        if *unplaced > 0 {
            debug!(
                "{}s of {} didn't fit into {day}",
                unplaced, category.name
            );
        }
    }

    Ok(build_stack(slot_labels(), &bucketed.categories, &placement))
}

/// Overlapping windows can push a slot over its width, which is expected. A category exceeding the
/// whole day isn't, and points at broken collection.
fn report_anomalies(day: NaiveDate, bucketed: &BucketedDay) {
    let mut totals = vec![0u64; bucketed.categories.len()];
    for (id, seconds) in bucketed.slots.iter().flatten() {
        totals[*id] = totals[*id].saturating_add(*seconds);
    }
    for (category, total) in bucketed.categories.iter().zip(totals) {
        if total > MAX_DAY_SECONDS {
            warn!(
                "Category {} has {total}s recorded on {day}, more than a day can hold",
                category.name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Result};
    use chrono::{NaiveDate, Utc};

    use crate::{
        provider::MockAggregateProvider,
        timeline::{
            build_timeline,
            error::{MalformedReason, TimelineError},
            model::RawAggregate,
            slots::{SLOTS_PER_DAY, SLOT_CAPACITY_SECONDS},
            TimelineEngine,
        },
        utils::logging::TEST_LOGGING,
    };

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();

    fn row(category: &str, seconds: i64, time: &str) -> RawAggregate {
        RawAggregate::new(category, seconds, format!("2024-04-05 {time}:00"), "#abcdef")
    }

    fn engine_with(rows: Vec<RawAggregate>) -> TimelineEngine<MockAggregateProvider, Utc> {
        let mut provider = MockAggregateProvider::new();
        provider
            .expect_fetch_raw_aggregates()
            .withf(|range| range.day == TEST_DATE)
            .times(1)
            .returning(move |_| Ok(rows.clone()));
        TimelineEngine::new(provider, Utc)
    }

    #[tokio::test]
    async fn overflow_is_carried_into_next_slot() -> Result<()> {
        *TEST_LOGGING;
        let series = engine_with(vec![row("work", 700, "00:00")])
            .get_timeline(TEST_DATE)
            .await?;

        assert_eq!(series.categories.len(), 1);
        let work = &series.categories[0];
        assert_eq!(&*work.category, "work");
        assert_eq!(work.rows[0].value, 600);
        assert_eq!(work.rows[1].value, 100);
        assert_eq!(work.placed_seconds(), 700);
        Ok(())
    }

    #[tokio::test]
    async fn competing_categories_share_a_slot() -> Result<()> {
        *TEST_LOGGING;
        let series = engine_with(vec![row("work", 400, "09:00"), row("chat", 400, "09:00")])
            .get_timeline(TEST_DATE)
            .await?;

        let (work, chat) = (&series.categories[0], &series.categories[1]);
        assert_eq!((work.rows[54].value, work.rows[54].offset), (400, 0));
        assert_eq!((chat.rows[54].value, chat.rows[54].offset), (200, 400));
        assert_eq!((chat.rows[55].value, chat.rows[55].offset), (200, 0));
        Ok(())
    }

    #[tokio::test]
    async fn empty_day_has_labels_and_no_categories() -> Result<()> {
        *TEST_LOGGING;
        let series = engine_with(vec![]).get_timeline(TEST_DATE).await?;

        assert_eq!(series.labels.len(), SLOTS_PER_DAY);
        assert!(series.categories.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn provider_failure_is_propagated() {
        *TEST_LOGGING;
        let mut provider = MockAggregateProvider::new();
        provider
            .expect_fetch_raw_aggregates()
            .times(1)
            .returning(|_| Err(anyhow!("storage unavailable")));

        let result = TimelineEngine::new(provider, Utc)
            .get_timeline(TEST_DATE)
            .await;

        let Err(error @ TimelineError::ProviderUnavailable(_)) = result else {
            panic!("expected provider failure");
        };
        assert_eq!(error.to_string(), "storage unavailable");
    }

    #[tokio::test]
    async fn invalid_day_is_rejected_before_fetching() {
        *TEST_LOGGING;
        let mut provider = MockAggregateProvider::new();
        provider.expect_fetch_raw_aggregates().never();

        let result = TimelineEngine::new(provider, Utc)
            .get_timeline(NaiveDate::MAX)
            .await;

        assert!(matches!(result, Err(TimelineError::InvalidDayArgument(_))));
    }

    #[tokio::test]
    async fn day_is_resolved_from_milliseconds() -> Result<()> {
        *TEST_LOGGING;
        // 2024-04-05 12:00:00 UTC
        let series = engine_with(vec![row("work", 60, "12:00")])
            .get_timeline_at(1_712_318_400_000)
            .await?;

        assert_eq!(series.categories[0].rows[72].value, 60);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_rows_fail_the_whole_request() {
        *TEST_LOGGING;
        let result = engine_with(vec![row("work", 60, "12:00"), row("chat", 30, "12:03")])
            .get_timeline(TEST_DATE)
            .await;

        assert!(matches!(
            result,
            Err(TimelineError::MalformedAggregateRow {
                reason: MalformedReason::UnalignedTimestamp(_),
                ..
            })
        ));
    }

    #[test]
    fn durations_too_large_to_sum_are_malformed() {
        *TEST_LOGGING;
        let rows = vec![row("work", i64::MAX, "09:00"); 3];

        let result = build_timeline(TEST_DATE, &rows);

        assert!(matches!(
            result,
            Err(TimelineError::MalformedAggregateRow {
                reason: MalformedReason::DurationOverflow,
                ..
            })
        ));
    }

    #[test]
    fn huge_durations_that_fit_are_carried_without_overflow() -> Result<()> {
        *TEST_LOGGING;
        let rows = vec![row("work", i64::MAX, "09:00"), row("work", i64::MAX, "23:50")];

        let series = build_timeline(TEST_DATE, &rows)?;

        let work = &series.categories[0];
        assert_eq!(work.placed_seconds(), (SLOTS_PER_DAY - 54) as u64 * SLOT_CAPACITY_SECONDS);
        assert_eq!(
            work.placed_seconds() + work.unplaced_seconds,
            2 * i64::MAX as u64
        );
        Ok(())
    }

    /// Deterministic pseudo random rows, so the properties below run over something irregular.
    fn noisy_rows() -> Vec<RawAggregate> {
        let categories = ["work", "chat", "games", "docs"];
        let mut seed = 0x2545_f491_u64;
        let mut rows = vec![];
        for slot in 0..SLOTS_PER_DAY {
            for category in categories {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                if (seed >> 33) % 3 == 0 {
                    continue;
                }
                let seconds = ((seed >> 40) % 500) as i64;
                let minutes = slot * 10;
                rows.push(row(
                    category,
                    seconds,
                    &format!("{:02}:{:02}", minutes / 60, minutes % 60),
                ));
            }
        }
        rows
    }

    #[test]
    fn series_respects_capacity_and_stacking() -> Result<()> {
        let rows = noisy_rows();
        let series = build_timeline(TEST_DATE, &rows)?;

        for slot in 0..SLOTS_PER_DAY {
            let total = series.slot_total(slot);
            assert!(total <= SLOT_CAPACITY_SECONDS);

            let mut previous_offset = 0;
            for category in &series.categories {
                assert!(category.rows[slot].offset >= previous_offset);
                previous_offset = category.rows[slot].offset;
            }
            let last = &series.categories.last().unwrap().rows[slot];
            assert_eq!(last.offset + last.value, total);
        }

        for category in &series.categories {
            let recorded = rows
                .iter()
                .filter(|v| v.category == category.category)
                .map(|v| v.active_seconds as u64)
                .sum::<u64>();
            assert_eq!(category.placed_seconds() + category.unplaced_seconds, recorded);
        }
        Ok(())
    }

    #[test]
    fn repeated_runs_are_identical() -> Result<()> {
        let rows = noisy_rows();
        let first = serde_json::to_string(&build_timeline(TEST_DATE, &rows)?)?;
        let second = serde_json::to_string(&build_timeline(TEST_DATE, &rows)?)?;
        assert_eq!(first, second);
        Ok(())
    }
}
