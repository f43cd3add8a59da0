//! Aggregate statistics: the snapshot record and its replace-only store.

pub mod model;
pub mod store;

pub use model::{StatsSnapshot, TopComment, TrafficTrend, safe_ratio};
pub use store::SnapshotStore;
