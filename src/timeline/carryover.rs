//! Keeps every slot within [SLOT_CAPACITY_SECONDS] without losing time. Whatever doesn't fit into
//! a slot is carried into the following slots for the same category.

use super::slots::{BucketedDay, CategoryId, SLOT_CAPACITY_SECONDS};

/// Final per-slot values, indexed as `slots[slot][category]`.
#[derive(Debug, PartialEq, Eq)]
pub struct Placement {
    pub slots: Vec<Vec<u64>>,
    /// Seconds per category that didn't fit before the end of the day.
    pub unplaced: Vec<u64>,
}

/// Seconds per category waiting for a later slot. Lives for a single request.
struct LeftoverPool {
    pending: Vec<u64>,
}

impl LeftoverPool {
    fn new(categories: usize) -> Self {
        Self {
            pending: vec![0; categories],
        }
    }

    fn take(&mut self, id: CategoryId) -> u64 {
        std::mem::take(&mut self.pending[id])
    }

    fn put(&mut self, id: CategoryId, seconds: u64) {
        self.pending[id] = seconds;
    }

    /// Offers pending time to the slot in category order.
    fn drain_into(&mut self, slot: &mut SlotFill) {
        for (id, pending) in self.pending.iter_mut().enumerate() {
            if *pending > 0 {
                *pending -= slot.place(id, *pending);
            }
        }
    }
}

struct SlotFill {
    values: Vec<u64>,
    filled: u64,
}

impl SlotFill {
    fn new(categories: usize) -> Self {
        Self {
            values: vec![0; categories],
            filled: 0,
        }
    }

    /// Places as much of `seconds` as the slot still has room for and returns the placed amount.
    fn place(&mut self, id: CategoryId, seconds: u64) -> u64 {
        let placed = seconds.min(SLOT_CAPACITY_SECONDS - self.filled);
        self.values[id] += placed;
        self.filled += placed;
        placed
    }
}

pub fn redistribute(bucketed: &BucketedDay) -> Placement {
    let categories = bucketed.categories.len();
    let mut leftover = LeftoverPool::new(categories);
    let mut slots = Vec::with_capacity(bucketed.slots.len());

    for fresh in &bucketed.slots {
        let mut slot = SlotFill::new(categories);

        for &(id, seconds) in fresh {
            // Can't overflow, `bucketize` rejects categories whose day total doesn't fit.
            let value = seconds + leftover.take(id);
            let placed = slot.place(id, value);
            leftover.put(id, value - placed);
        }
        leftover.drain_into(&mut slot);

        slots.push(slot.values);
    }

    Placement {
        slots,
        unplaced: leftover.pending,
    }
}
