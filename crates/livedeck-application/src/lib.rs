//! Application layer for livedeck.
//!
//! Runs the stream reconciliation core: the connection supervisor that owns
//! the push-stream subscription, the alert timers, and the composition of
//! both around one shared dashboard.

pub mod alerts;
pub mod live;
pub mod shared;
pub mod supervisor;

pub use alerts::AlertScheduler;
pub use live::LiveDashboard;
pub use shared::{SharedDashboard, read_dashboard, shared_dashboard, view, write_dashboard};
pub use supervisor::ConnectionSupervisor;
