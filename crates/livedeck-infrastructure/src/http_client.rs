//! LiveApiClient - HTTP implementation of the dashboard ports.
//!
//! One client covers the three collaborators of the core: the event stream
//! (`GET /api/stream`), the control calls and the alert-conditions poll.
//! Control calls and polls use a request timeout; the stream client does not,
//! since the subscription is expected to stay open indefinitely.

use async_trait::async_trait;
use futures::{StreamExt, stream};
use livedeck_core::alert::AlertConditions;
use livedeck_core::control::{
    BatchControlRequest, BatchControlResponse, CommentRequest, ProducerStatus, QuestionRequest,
    RecommendationUpdate, ScriptSelection, SubmissionReceipt,
};
use livedeck_core::event::RawEvent;
use livedeck_core::ports::{AlertSource, ControlClient, EventSource, EventStream};
use livedeck_core::sanitizer;
use livedeck_core::{LivedeckError, Result};
use reqwest::{Client, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::LivedeckConfig;
use crate::sse::SseDecoder;

pub const STREAM_PATH: &str = "/api/stream";
pub const BATCH_CONTROL_PATH: &str = "/api/batch-control";
pub const SET_SCRIPT_PATH: &str = "/api/set-script";
pub const ASK_QUESTION_PATH: &str = "/api/ask-question";
pub const COMMENT_REPLY_PATH: &str = "/api/comment-reply";
pub const UPDATE_RECOMMENDATION_PATH: &str = "/api/update-recommendation";
pub const RESET_STATS_PATH: &str = "/api/reset-stats";
pub const ALERT_CONDITIONS_PATH: &str = "/api/alert-conditions";

/// HTTP client for the producer service.
#[derive(Clone)]
pub struct LiveApiClient {
    client: Client,
    stream_client: Client,
    base_url: String,
}

impl LiveApiClient {
    /// Creates a client with default reqwest settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            stream_client: Client::new(),
            base_url: normalize_base_url(base_url.into()),
        }
    }

    /// Builds a client from the loaded configuration.
    pub fn from_config(config: &LivedeckConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| LivedeckError::config(format!("Failed to build HTTP client: {err}")))?;
        let stream_client = Client::builder()
            .connect_timeout(config.request_timeout())
            .build()
            .map_err(|err| LivedeckError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            stream_client,
            base_url: normalize_base_url(config.server.base_url.clone()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, action: &str, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        tracing::debug!("[LiveApiClient] POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| LivedeckError::control(action, format!("request failed: {err}")))?;

        let text = read_body(action, response).await?;
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        sanitizer::decode(text).map_err(|err| LivedeckError::control(action, err.to_string()))
    }

    async fn post_ack<B>(&self, action: &str, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + Sync + ?Sized,
    {
        let _: serde_json::Value = self.post_json(action, path, body).await?;
        Ok(())
    }
}

#[async_trait]
impl EventSource for LiveApiClient {
    async fn open(&self) -> Result<EventStream> {
        let url = self.endpoint(STREAM_PATH);
        tracing::debug!("[LiveApiClient] Opening event stream at {}", url);

        let response = self
            .stream_client
            .get(&url)
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|err| LivedeckError::transport(format!("stream connect failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LivedeckError::transport(format!(
                "stream rejected with {}: {}",
                status,
                error_message(&body)
            )));
        }

        let frames = response
            .bytes_stream()
            .scan(SseDecoder::new(), |decoder, chunk| {
                let items: Vec<Result<RawEvent>> = match chunk {
                    Ok(bytes) => decoder.feed(&bytes).into_iter().map(Ok).collect(),
                    Err(err) => vec![Err(LivedeckError::transport(format!(
                        "stream read failed: {err}"
                    )))],
                };
                futures::future::ready(Some(items))
            })
            .flat_map(stream::iter);

        Ok(frames.boxed())
    }
}

#[async_trait]
impl ControlClient for LiveApiClient {
    async fn batch_control(&self, request: BatchControlRequest) -> Result<ProducerStatus> {
        let response: BatchControlResponse = self
            .post_json("batch_control", BATCH_CONTROL_PATH, &request)
            .await?;
        tracing::debug!(
            "[LiveApiClient] batch-control {:?} -> {:?}",
            request.action,
            response.status
        );
        Ok(response.status)
    }

    async fn set_script(&self, script_id: i64) -> Result<()> {
        self.post_ack("set_script", SET_SCRIPT_PATH, &ScriptSelection { script_id })
            .await
    }

    async fn submit_question(&self, question: &str) -> Result<SubmissionReceipt> {
        let body = QuestionRequest {
            question: question.to_string(),
        };
        self.post_json("submit_question", ASK_QUESTION_PATH, &body)
            .await
    }

    async fn submit_comment(&self, comment: &str) -> Result<SubmissionReceipt> {
        let body = CommentRequest {
            comment: comment.to_string(),
        };
        self.post_json("submit_comment", COMMENT_REPLY_PATH, &body)
            .await
    }

    async fn update_recommendation(&self, recommendation: &str) -> Result<()> {
        let body = RecommendationUpdate {
            recommendation: recommendation.to_string(),
        };
        self.post_ack("update_recommendation", UPDATE_RECOMMENDATION_PATH, &body)
            .await
    }

    async fn reset_stats(&self) -> Result<()> {
        self.post_ack("reset_stats", RESET_STATS_PATH, &serde_json::json!({}))
            .await
    }
}

#[async_trait]
impl AlertSource for LiveApiClient {
    async fn poll_alerts(&self) -> Result<AlertConditions> {
        let url = self.endpoint(ALERT_CONDITIONS_PATH);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| LivedeckError::transport(format!("alert poll failed: {err}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| LivedeckError::transport(format!("alert poll read failed: {err}")))?;
        if !status.is_success() {
            return Err(map_http_error("poll_alerts", status, &text));
        }
        sanitizer::decode(&text)
    }
}

async fn read_body(action: &str, response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|err| LivedeckError::control(action, format!("failed to read response: {err}")))?;
    if !status.is_success() {
        return Err(map_http_error(action, status, &text));
    }
    Ok(text)
}

fn map_http_error(action: &str, status: StatusCode, body: &str) -> LivedeckError {
    LivedeckError::control(action, format!("HTTP {}: {}", status.as_u16(), error_message(body)))
}

/// Pulls a human-readable message out of an error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "message", "status"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn normalize_base_url(base_url: String) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}
