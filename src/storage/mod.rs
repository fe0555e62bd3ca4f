//!  Storage is organized through [heartbeat_storage::HeartbeatStorageImpl].
//!  The basic idea is:
//!   - There is a directory with all the records.
//!   - Records are stored using special record files, which store data for a UTC day.
//!   - Every line of a record file is a single heartbeat with its resolved categories.

pub mod entities;
pub mod heartbeat_storage;
