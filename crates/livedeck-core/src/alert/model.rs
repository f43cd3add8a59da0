use serde::{Deserialize, Serialize};

use crate::serde_helpers::{null_as_default, scalar_as_string};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    TrafficChange,
    InterestShift,
    VipPresence,
    Engagement,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Positive,
    #[default]
    #[serde(other)]
    Info,
}

/// One condition reported by the alert-conditions collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type", alias = "kind", default, deserialize_with = "null_as_default")]
    pub kind: AlertKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub severity: Severity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

impl Alert {
    pub fn new(kind: AlertKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
        }
    }
}

/// Body of one alert poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertConditions {
    #[serde(default, deserialize_with = "null_as_default")]
    pub alerts: Vec<Alert>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub timestamp: Option<String>,
    /// Advisory talking points computed alongside the alerts.
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,
}
