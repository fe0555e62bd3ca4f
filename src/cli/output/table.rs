use std::fmt::{self, Write};

use crate::timeline::model::TimelineSeries;

/// Tab separated `time category value offset` rows, skipping empty values.
pub fn render_table(series: &TimelineSeries) -> Result<String, fmt::Error> {
    let mut out = String::from("time\tcategory\tvalue\toffset\n");
    for index in 0..series.labels.len() {
        for row in series
            .categories
            .iter()
            .filter_map(|category| category.rows.get(index))
            .filter(|row| row.value > 0)
        {
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                row.time, row.category, row.value, row.offset
            )?;
        }
    }
    Ok(out)
}
