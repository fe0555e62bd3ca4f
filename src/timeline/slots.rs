//! Splits a day into fixed ten-minute slots and sorts provider rows into them.

use std::{collections::HashMap, sync::Arc};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use tracing::trace;

use super::{
    error::{MalformedReason, TimelineError},
    model::RawAggregate,
};

/// Width of a slot, which is also the most a slot can hold.
pub const SLOT_CAPACITY_SECONDS: u64 = 600;
pub const SLOTS_PER_DAY: usize = 144;
const SLOT_MINUTES: u32 = 10;

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

pub type CategoryId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: Arc<str>,
    /// First color seen for the category.
    pub color: Arc<str>,
    /// Index of the first slot the category showed up in.
    pub first_slot: usize,
}

/// Provider rows matched to slots. Categories are ordered by first appearance and every slot keeps
/// its rows in provider order.
#[derive(Debug, Default)]
pub struct BucketedDay {
    pub categories: Vec<Category>,
    pub slots: Vec<Vec<(CategoryId, u64)>>,
}

/// `00:00`, `00:10`, ... `23:50`.
pub fn slot_labels() -> Vec<Arc<str>> {
    (0..SLOTS_PER_DAY)
        .map(|slot| {
            let minutes = slot as u32 * SLOT_MINUTES;
            format!("{:02}:{:02}", minutes / 60, minutes % 60).into()
        })
        .collect()
}

pub fn bucketize(day: NaiveDate, rows: &[RawAggregate]) -> Result<BucketedDay, TimelineError> {
    let mut matched = Vec::with_capacity(rows.len());
    for row in rows {
        let (slot, seconds) = validate_row(day, row).map_err(|reason| {
            TimelineError::MalformedAggregateRow {
                category: row.category.clone(),
                reason,
            }
        })?;
        match slot {
            Some(slot) => matched.push((slot, seconds, row)),
            None => trace!("Ignoring row outside of {day}: {row:?}"),
        }
    }
    // Stable, so rows of the same slot stay in provider order.
    matched.sort_by_key(|(slot, ..)| *slot);

    let mut bucketed = BucketedDay {
        categories: vec![],
        slots: vec![vec![]; SLOTS_PER_DAY],
    };
    let mut ids = HashMap::<Arc<str>, CategoryId>::new();
    let mut day_totals = Vec::<u64>::new();

    for (slot, seconds, row) in matched {
        let id = *ids.entry(row.category.clone()).or_insert_with(|| {
            bucketed.categories.push(Category {
                name: row.category.clone(),
                color: row.color.clone(),
                first_slot: slot,
            });
            day_totals.push(0);
            bucketed.categories.len() - 1
        });

        // Every later sum of a category's seconds is bounded by its day total.
        day_totals[id] = day_totals[id].checked_add(seconds).ok_or_else(|| {
            TimelineError::MalformedAggregateRow {
                category: row.category.clone(),
                reason: MalformedReason::DurationOverflow,
            }
        })?;

        let entries = &mut bucketed.slots[slot];
        match entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, total)) => *total += seconds,
            None => entries.push((id, seconds)),
        }
    }

    Ok(bucketed)
}

fn validate_row(
    day: NaiveDate,
    row: &RawAggregate,
) -> Result<(Option<usize>, u64), MalformedReason> {
    if row.category.is_empty() {
        return Err(MalformedReason::EmptyCategory);
    }
    if row.color.is_empty() {
        return Err(MalformedReason::EmptyColor);
    }
    let seconds = u64::try_from(row.active_seconds)
        .map_err(|_| MalformedReason::NegativeDuration(row.active_seconds))?;
    Ok((slot_index(day, &row.slot_timestamp)?, seconds))
}

/// Slot the timestamp belongs to, or `None` when it's on another date.
pub fn slot_index(day: NaiveDate, timestamp: &str) -> Result<Option<usize>, MalformedReason> {
    let moment = TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(timestamp, format).ok())
        .ok_or_else(|| MalformedReason::UnparseableTimestamp(timestamp.to_owned()))?;

    if moment.date() != day {
        return Ok(None);
    }
    if moment.minute() % SLOT_MINUTES != 0 {
        return Err(MalformedReason::UnalignedTimestamp(timestamp.to_owned()));
    }
    Ok(Some(
        ((moment.hour() * 60 + moment.minute()) / SLOT_MINUTES) as usize,
    ))
}
