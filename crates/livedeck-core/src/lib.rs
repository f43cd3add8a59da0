//! Stream reconciliation core for the livestream selling dashboard.
//!
//! Raw push-stream frames flow through the [`sanitizer`] and the
//! [`event::classifier`] into the stores owned by [`dashboard::Dashboard`]:
//! the bounded [`interaction`] log, the [`stats`] snapshot store, the
//! [`fragment`] accumulators and the [`alert`] rotor. Network collaborators are
//! described by the traits in [`ports`].

pub mod alert;
pub mod connection;
pub mod control;
pub mod dashboard;
pub mod error;
pub mod event;
pub mod fragment;
pub mod interaction;
pub mod ports;
pub mod sanitizer;
pub mod serde_helpers;
pub mod stats;

// Re-export common types
pub use connection::{ConnectionPhase, ConnectionState, ControlParams, ReconnectPolicy};
pub use dashboard::{Dashboard, DashboardSettings, DashboardView, IngestOutcome, SubscriptionToken};
pub use error::{LivedeckError, Result};
