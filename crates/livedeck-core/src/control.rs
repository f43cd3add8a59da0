//! Request and response bodies of the side-channel control calls.

use serde::{Deserialize, Serialize};

use crate::connection::ControlParams;
use crate::serde_helpers::{null_as_default, scalar_as_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProducerAction {
    Start,
    Stop,
}

/// Body of the batch-control call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchControlRequest {
    pub action: ProducerAction,
    pub interval: f64,
    pub count: u64,
}

impl BatchControlRequest {
    pub fn start(params: &ControlParams) -> Self {
        Self {
            action: ProducerAction::Start,
            interval: params.poll_interval,
            count: params.batch_count,
        }
    }

    pub fn stop(params: &ControlParams) -> Self {
        Self {
            action: ProducerAction::Stop,
            interval: params.poll_interval,
            count: params.batch_count,
        }
    }
}

/// Producer status returned by batch-control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProducerStatus {
    Started,
    AlreadyRunning,
    Stopped,
    NotRunning,
    InvalidAction,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BatchControlResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ProducerStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptSelection {
    pub script_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionRequest {
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRequest {
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationUpdate {
    pub recommendation: String,
}

/// Acknowledgement of a submitted question or comment.
///
/// `stream_id` names the fragment stream that will carry the answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub stream_id: Option<String>,
}
