use chrono::NaiveDate;

/// This is the standard way of converting a date to a record file name in daystack.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
