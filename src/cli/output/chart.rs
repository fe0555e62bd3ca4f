use std::fmt::{self, Write};

use ansi_term::{Colour, Style};

use crate::timeline::{model::TimelineSeries, slots::SLOT_CAPACITY_SECONDS};

use super::{format_seconds, parse_hex_color};

const BAR_WIDTH: u64 = 60;
const SECONDS_PER_CELL: u64 = SLOT_CAPACITY_SECONDS / BAR_WIDTH;
const CELL: &str = "█";

fn style_for(color: &str) -> Style {
    parse_hex_color(color)
        .map(Colour::normal)
        .unwrap_or_default()
}

/// Draws one stacked bar per slot that has any activity, preceded by a legend.
pub fn render_chart(series: &TimelineSeries) -> Result<String, fmt::Error> {
    let mut out = String::new();
    if series.categories.is_empty() {
        out.push_str("No activity recorded\n");
        return Ok(out);
    }

    for category in &series.categories {
        writeln!(
            out,
            "{} {}\t{}",
            style_for(&category.color).paint(CELL),
            category.category,
            format_seconds(category.placed_seconds())
        )?;
    }
    out.push('\n');

    for (index, label) in series.labels.iter().enumerate() {
        let total = series.slot_total(index);
        if total == 0 {
            continue;
        }
        let mut bar = String::new();
        for category in &series.categories {
            let row = &category.rows[index];
            // Cell bounds come from the running offset so rounding never widens the bar.
            let cells = (row.offset + row.value) / SECONDS_PER_CELL - row.offset / SECONDS_PER_CELL;
            if cells > 0 {
                write!(
                    bar,
                    "{}",
                    style_for(&category.color).paint(CELL.repeat(cells as usize))
                )?;
            }
        }
        let padding = BAR_WIDTH - total / SECONDS_PER_CELL;
        writeln!(
            out,
            "{label} │{bar}{}│ {}",
            " ".repeat(padding as usize),
            format_seconds(total)
        )?;
    }

    for category in series.categories.iter().filter(|v| v.unplaced_seconds > 0) {
        writeln!(
            out,
            "{}: {} didn't fit before midnight",
            category.category,
            format_seconds(category.unplaced_seconds)
        )?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;

    use crate::timeline::{build_timeline, model::RawAggregate};

    use super::{render_chart, CELL};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();

    #[test]
    fn chart_has_a_bar_per_active_slot() -> Result<()> {
        let series = build_timeline(
            TEST_DATE,
            &[
                RawAggregate::new("work", 400, "2024-04-05 09:00:00", "#ff0000"),
                RawAggregate::new("chat", 400, "2024-04-05 09:00:00", "#0000ff"),
                RawAggregate::new("late", 700, "2024-04-05 23:50:00", "unknown"),
            ],
        )?;

        let chart = render_chart(&series)?;

        let line = |label: &str| {
            chart
                .lines()
                .find(|v| v.starts_with(label))
                .unwrap_or_default()
                .to_owned()
        };
        assert_eq!(line("09:00 ").matches(CELL).count(), 60);
        assert!(line("09:00 ").ends_with("10m0s"));
        assert_eq!(line("09:10 ").matches(CELL).count(), 20);
        assert!(line("09:20 ").is_empty());
        assert!(chart.contains("late: 1m40s didn't fit before midnight"));
        Ok(())
    }

    #[test]
    fn empty_series_says_so() -> Result<()> {
        let series = build_timeline(TEST_DATE, &[])?;
        assert_eq!(render_chart(&series)?, "No activity recorded\n");
        Ok(())
    }
}
