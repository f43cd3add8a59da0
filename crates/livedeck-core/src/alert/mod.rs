//! Alert conditions and the rotor that cycles display focus through them.

pub mod model;
pub mod rotor;

pub use model::{Alert, AlertConditions, AlertKind, Severity};
pub use rotor::{AlertRotor, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_ROTATE_INTERVAL_SECS, RotorState};
