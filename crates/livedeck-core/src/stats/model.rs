use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::serde_helpers::null_as_default;

/// One complete aggregate-statistics record.
///
/// Every field defaults to zero or empty, so `StatsSnapshot::default()` is the
/// value shown before the first record arrives. Fields this build does not
/// model are kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSnapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub total_users_ever: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub current_users: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub guest_users: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub registered_users: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_likes: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_shares: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_comments: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub top_comments: Vec<TopComment>,
    /// Viewer count change per minute.
    #[serde(deserialize_with = "null_as_default")]
    pub traffic_rate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub traffic_sources: BTreeMap<String, u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub user_tags: BTreeMap<String, u64>,
    /// Percentage, 0..=100.
    #[serde(deserialize_with = "null_as_default")]
    pub old_customer_ratio: f64,
    /// Percentage, 0..=100.
    #[serde(deserialize_with = "null_as_default")]
    pub long_stay_ratio: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub user_interests: BTreeMap<String, u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub traffic_history: Vec<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub traffic_timestamps: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub script_recommendations: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopComment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
}

/// Direction of the viewer count over the reported window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficTrend {
    Rising,
    Falling,
    Steady,
}

/// Division that yields 0 instead of NaN or infinity.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() { ratio } else { 0.0 }
}

impl StatsSnapshot {
    /// Share of current viewers who are guests, in percent.
    pub fn guest_share_percent(&self) -> f64 {
        safe_ratio(self.guest_users as f64, self.current_users as f64) * 100.0
    }

    /// Share of current viewers who are registered members, in percent.
    pub fn registered_share_percent(&self) -> f64 {
        safe_ratio(self.registered_users as f64, self.current_users as f64) * 100.0
    }

    pub fn likes_per_comment(&self) -> f64 {
        safe_ratio(self.total_likes as f64, self.total_comments as f64)
    }

    pub fn shares_per_viewer(&self) -> f64 {
        safe_ratio(self.total_shares as f64, self.current_users as f64)
    }

    /// Trend of the viewer count, taken from the reported rate.
    pub fn traffic_trend(&self) -> TrafficTrend {
        if !self.traffic_rate.is_finite() || self.traffic_rate == 0.0 {
            TrafficTrend::Steady
        } else if self.traffic_rate > 0.0 {
            TrafficTrend::Rising
        } else {
            TrafficTrend::Falling
        }
    }

    /// Traffic sources ordered by count, highest first.
    pub fn ranked_sources(&self) -> Vec<(&str, u64)> {
        ranked(&self.traffic_sources)
    }

    /// Interest keywords ordered by count, highest first.
    pub fn ranked_interests(&self) -> Vec<(&str, u64)> {
        ranked(&self.user_interests)
    }

    /// User tags ordered by count, highest first.
    pub fn ranked_tags(&self) -> Vec<(&str, u64)> {
        ranked(&self.user_tags)
    }
}

fn ranked(map: &BTreeMap<String, u64>) -> Vec<(&str, u64)> {
    let mut entries: Vec<(&str, u64)> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    // stable sort keeps key order for equal counts
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}
