use serde::{Deserialize, Serialize};

use super::model::Alert;

/// Default seconds between rotation ticks.
pub const DEFAULT_ROTATE_INTERVAL_SECS: u64 = 5;
/// Default seconds between alert polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RotorState {
    Empty,
    Rotating { active_index: usize },
}

/// Cycles display focus through the active alerts.
///
/// `refresh` replaces the list (driven by polling); `tick` advances the cursor
/// (driven by its own timer). The two cadences are independent.
#[derive(Debug, Clone, Default)]
pub struct AlertRotor {
    alerts: Vec<Alert>,
    cursor: usize,
}

impl AlertRotor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the alert list.
    ///
    /// Empty → non-empty starts at index 0. A replaced non-empty list keeps
    /// the cursor, clamped to the new length.
    pub fn refresh(&mut self, alerts: Vec<Alert>) {
        let was_empty = self.alerts.is_empty();
        self.alerts = alerts;
        if self.alerts.is_empty() || was_empty {
            self.cursor = 0;
        } else {
            self.cursor = self.cursor.min(self.alerts.len() - 1);
        }
    }

    /// Advances the cursor by one, wrapping. No-op while empty.
    pub fn tick(&mut self) {
        if !self.alerts.is_empty() {
            self.cursor = (self.cursor + 1) % self.alerts.len();
        }
    }

    pub fn state(&self) -> RotorState {
        if self.alerts.is_empty() {
            RotorState::Empty
        } else {
            RotorState::Rotating {
                active_index: self.cursor,
            }
        }
    }

    /// The alert currently in focus.
    pub fn active(&self) -> Option<&Alert> {
        self.alerts.get(self.cursor)
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::model::{AlertKind, Severity};

    fn alerts(n: usize) -> Vec<Alert> {
        (0..n)
            .map(|i| Alert::new(AlertKind::Other, Severity::Info, format!("alert {i}")))
            .collect()
    }

    fn index(rotor: &AlertRotor) -> Option<usize> {
        match rotor.state() {
            RotorState::Empty => None,
            RotorState::Rotating { active_index } => Some(active_index),
        }
    }

    #[test]
    fn three_ticks_cycle_back_to_start() {
        let mut rotor = AlertRotor::new();
        rotor.refresh(alerts(3));
        let mut seen = vec![index(&rotor)];
        for _ in 0..3 {
            rotor.tick();
            seen.push(index(&rotor));
        }
        assert_eq!(seen, vec![Some(0), Some(1), Some(2), Some(0)]);
    }

    #[test]
    fn emptying_stops_rotation() {
        let mut rotor = AlertRotor::new();
        rotor.refresh(alerts(2));
        rotor.refresh(Vec::new());
        assert_eq!(rotor.state(), RotorState::Empty);
        rotor.tick();
        assert_eq!(rotor.state(), RotorState::Empty);
        assert!(rotor.active().is_none());
    }

    #[test]
    fn tick_while_empty_is_noop() {
        let mut rotor = AlertRotor::new();
        rotor.tick();
        rotor.tick();
        rotor.refresh(alerts(2));
        assert_eq!(index(&rotor), Some(0));
    }

    #[test]
    fn shrinking_list_clamps_cursor() {
        let mut rotor = AlertRotor::new();
        rotor.refresh(alerts(4));
        rotor.tick();
        rotor.tick();
        rotor.tick();
        assert_eq!(index(&rotor), Some(3));
        rotor.refresh(alerts(2));
        assert_eq!(index(&rotor), Some(1));
    }

    #[test]
    fn same_size_refresh_keeps_cursor() {
        let mut rotor = AlertRotor::new();
        rotor.refresh(alerts(3));
        rotor.tick();
        rotor.refresh(alerts(3));
        assert_eq!(index(&rotor), Some(1));
        assert_eq!(rotor.active().unwrap().message, "alert 1");
    }

    #[test]
    fn refilling_after_empty_resets_to_zero() {
        let mut rotor = AlertRotor::new();
        rotor.refresh(alerts(3));
        rotor.tick();
        rotor.refresh(Vec::new());
        rotor.refresh(alerts(3));
        assert_eq!(index(&rotor), Some(0));
    }
}
