//! Collaborator interfaces.
//!
//! The core never talks to the network itself. These traits describe what it
//! needs from the outside; `livedeck-infrastructure` provides the HTTP
//! implementations and tests provide in-memory ones.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::alert::AlertConditions;
use crate::control::{BatchControlRequest, ProducerStatus, SubmissionReceipt};
use crate::error::Result;
use crate::event::RawEvent;

/// A stream of raw frames. An `Err` item or the end of the stream both mean
/// the transport is gone.
pub type EventStream = BoxStream<'static, Result<RawEvent>>;

/// Opens the push-stream subscription.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn open(&self) -> Result<EventStream>;
}

/// Side-channel control calls.
#[async_trait]
pub trait ControlClient: Send + Sync {
    /// Starts or stops the interaction producer.
    async fn batch_control(&self, request: BatchControlRequest) -> Result<ProducerStatus>;

    /// Selects the active script template.
    async fn set_script(&self, script_id: i64) -> Result<()>;

    /// Submits a free-form question; the answer streams as `question_response`.
    async fn submit_question(&self, question: &str) -> Result<SubmissionReceipt>;

    /// Submits a viewer comment for a suggested reply; streams as `comment_reply`.
    async fn submit_comment(&self, comment: &str) -> Result<SubmissionReceipt>;

    /// Updates the context used for script recommendations.
    async fn update_recommendation(&self, recommendation: &str) -> Result<()>;

    /// Resets the producer's aggregate statistics.
    async fn reset_stats(&self) -> Result<()>;
}

/// Periodic alert-conditions poll.
#[async_trait]
pub trait AlertSource: Send + Sync {
    async fn poll_alerts(&self) -> Result<AlertConditions>;
}
