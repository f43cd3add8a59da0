//! Connection lifecycle state shared between the supervisor and readers.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of the push-stream subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

impl ConnectionPhase {
    /// True while a subscription is open or being opened.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}

/// Producer parameters sent with the "begin producing" control call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlParams {
    /// Seconds between produced interactions.
    pub poll_interval: f64,
    /// Number of interactions to produce before the producer stops on its own.
    pub batch_count: u64,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            poll_interval: 1.0,
            batch_count: 999_999,
        }
    }
}

/// Snapshot of the supervisor's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub phase: ConnectionPhase,
    /// A subscription handle is held (even while reconnecting underneath).
    pub subscribed: bool,
    /// A "begin producing" call was issued and not yet matched by a stop.
    pub producing: bool,
    pub control_params: ControlParams,
    /// Consecutive failed transport opens since the last successful one.
    pub reconnect_attempts: u32,
}

/// Reconnect behaviour after the transport drops.
///
/// Delays double from `initial_backoff_ms` up to `max_backoff_ms` and reset
/// after a successful open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt number `attempt` (1-based).
    pub fn delay_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1).min(32);
        self.initial_backoff_ms
            .max(1)
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms.max(self.initial_backoff_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = ReconnectPolicy {
            enabled: true,
            initial_backoff_ms: 500,
            max_backoff_ms: 3_000,
        };
        let delays: Vec<u64> = (1..=5).map(|n| policy.delay_ms(n)).collect();
        assert_eq!(delays, vec![500, 1_000, 2_000, 3_000, 3_000]);
    }

    #[test]
    fn huge_attempt_counts_do_not_overflow() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_ms(u32::MAX), policy.max_backoff_ms);
    }

    #[test]
    fn live_phases() {
        assert!(ConnectionPhase::Connecting.is_live());
        assert!(ConnectionPhase::Connected.is_live());
        assert!(!ConnectionPhase::Closing.is_live());
        assert!(!ConnectionPhase::Disconnected.is_live());
    }
}
