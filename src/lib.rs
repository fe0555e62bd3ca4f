//! Turns recorded activity into a stacked 24 hour timeline. Every day is split into 144 ten-minute
//! slots, each holding at most ten minutes of activity. Time that doesn't fit into its slot is
//! carried into the following ones instead of being dropped.
//!

pub mod cli;
pub mod provider;
pub mod storage;
pub mod timeline;
pub mod utils;
