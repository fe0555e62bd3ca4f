use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use super::error::TimelineError;

/// A local calendar day expressed as the half-open UTC interval `[start, end)` between its
/// midnight and the next day's midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub day: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayRange {
    pub fn new<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Result<Self, TimelineError> {
        let next = day.succ_opt().ok_or_else(|| {
            TimelineError::InvalidDayArgument(format!("{day} has no following day"))
        })?;
        Ok(Self {
            day,
            start: local_midnight(day, tz)?,
            end: local_midnight(next, tz)?,
        })
    }

    pub fn contains(&self, moment: DateTime<Utc>) -> bool {
        self.start <= moment && moment < self.end
    }

    /// UTC dates that overlap the range. Records are stored per UTC day, so a local day usually
    /// touches two of them.
    pub fn utc_dates(&self) -> impl Iterator<Item = NaiveDate> {
        let last = (self.end - Duration::nanoseconds(1)).date_naive();
        self.start
            .date_naive()
            .iter_days()
            .take_while(move |date| *date <= last)
    }
}

/// Resolves a point in time given in epoch milliseconds to the local date it falls on.
pub fn resolve_day_millis<Tz: TimeZone>(millis: i64, tz: &Tz) -> Result<NaiveDate, TimelineError> {
    DateTime::from_timestamp_millis(millis)
        .map(|moment| moment.with_timezone(tz).date_naive())
        .ok_or_else(|| TimelineError::InvalidDayArgument(format!("{millis}ms is out of range")))
}

fn local_midnight<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>, TimelineError> {
    // Ambiguous midnight (clocks turned back) resolves to the earlier instant.
    tz.from_local_datetime(&day.and_time(NaiveTime::MIN))
        .earliest()
        .map(|v| v.to_utc())
        .ok_or_else(|| {
            TimelineError::InvalidDayArgument(format!("midnight of {day} doesn't exist locally"))
        })
}
