use std::sync::Arc;

use super::{
    carryover::Placement,
    model::{CategorySeries, TimelineRow, TimelineSeries},
    slots::Category,
};

/// Turns final slot values into stacked rows. Categories are stacked in order of their first
/// appearance during the day.
pub fn build_stack(
    labels: Vec<Arc<str>>,
    categories: &[Category],
    placement: &Placement,
) -> TimelineSeries {
    // `first_slot` is the ordering key. Ids may come in any order, `bucketize` just happens to hand
    // them out chronologically.
    let mut order = (0..categories.len()).collect::<Vec<_>>();
    order.sort_by_key(|id| categories[*id].first_slot);

    let mut series = order
        .iter()
        .map(|id| CategorySeries {
            category: categories[*id].name.clone(),
            color: categories[*id].color.clone(),
            rows: Vec::with_capacity(labels.len()),
            unplaced_seconds: placement.unplaced.get(*id).copied().unwrap_or(0),
        })
        .collect::<Vec<_>>();

    for (index, label) in labels.iter().enumerate() {
        let values = placement.slots.get(index);
        let mut offset = 0;
        for (category, id) in series.iter_mut().zip(&order) {
            let value = values.and_then(|v| v.get(*id)).copied().unwrap_or(0);
            category.rows.push(TimelineRow {
                time: label.clone(),
                category: category.category.clone(),
                value,
                offset,
            });
            offset += value;
        }
    }

    TimelineSeries {
        labels,
        categories: series,
    }
}
