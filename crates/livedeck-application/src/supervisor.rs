//! ConnectionSupervisor - owns the push-stream subscription and the producer.
//!
//! Lifecycle: `Disconnected -> Connecting -> Connected -> Closing -> Disconnected`.
//!
//! - `start()` opens a subscription token on the dashboard, spawns the reader
//!   task and issues "begin producing". Calling it while live is a no-op.
//! - `stop()` invalidates the token first, so nothing from the old
//!   subscription reaches the stores once it returns, then cancels the reader
//!   and issues "stop producing" if a start was issued. Calling it twice is
//!   the same as calling it once.
//! - Transport drops are handled inside the reader with exponential backoff.
//!   A reconnect reuses the same token and never re-issues "begin producing".

use futures::StreamExt;
use livedeck_core::control::{BatchControlRequest, SubmissionReceipt};
use livedeck_core::event::{FragmentChannel, RawEvent};
use livedeck_core::ports::{ControlClient, EventSource};
use livedeck_core::{
    ConnectionPhase, ConnectionState, ControlParams, IngestOutcome, ReconnectPolicy, Result,
    SubscriptionToken,
};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::shared::{SharedDashboard, write_dashboard};

const TARGET: &str = "livedeck::supervisor";

/// Reader task handle; present from `start()` until `stop()` joins it.
#[derive(Default)]
struct Lifecycle {
    cancel: Option<CancellationToken>,
    reader: Option<JoinHandle<()>>,
}

pub struct ConnectionSupervisor {
    dashboard: SharedDashboard,
    source: Arc<dyn EventSource>,
    control: Arc<dyn ControlClient>,
    policy: ReconnectPolicy,
    state: Arc<RwLock<ConnectionState>>,
    /// Serializes start/stop/reconfigure.
    lifecycle: Mutex<Lifecycle>,
}

impl ConnectionSupervisor {
    pub fn new(
        dashboard: SharedDashboard,
        source: Arc<dyn EventSource>,
        control: Arc<dyn ControlClient>,
        params: ControlParams,
        policy: ReconnectPolicy,
    ) -> Self {
        let state = ConnectionState {
            control_params: params,
            ..Default::default()
        };
        Self {
            dashboard,
            source,
            control,
            policy,
            state: Arc::new(RwLock::new(state)),
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.state().phase
    }

    pub fn dashboard(&self) -> &SharedDashboard {
        &self.dashboard
    }

    /// Opens the subscription and starts the producer.
    ///
    /// "begin producing" is only issued when no producer is running, so a
    /// restart after a dropped subscription resubscribes without stacking starts.
    ///
    /// A failed "begin producing" call is returned, but the subscription stays
    /// open; `stop()` still tears it down.
    pub async fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;

        let (params, producing) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.phase != ConnectionPhase::Disconnected {
                tracing::debug!(target: TARGET, "start() ignored while {:?}", state.phase);
                return Ok(());
            }
            state.phase = ConnectionPhase::Connecting;
            state.subscribed = true;
            state.reconnect_attempts = 0;
            (state.control_params, state.producing)
        };

        // A reader that gave up on its own (reconnect disabled) has already exited.
        if let Some(reader) = lifecycle.reader.take() {
            let _ = reader.await;
        }

        let token = write_dashboard(&self.dashboard).open_subscription();
        let cancel = CancellationToken::new();
        let reader = tokio::spawn(run_reader(
            Reader {
                dashboard: Arc::clone(&self.dashboard),
                source: Arc::clone(&self.source),
                state: Arc::clone(&self.state),
                policy: self.policy,
            },
            token,
            cancel.clone(),
        ));
        lifecycle.cancel = Some(cancel);
        lifecycle.reader = Some(reader);
        tracing::info!(target: TARGET, "Subscription {} opening", token.value());

        // The producer outlived a dropped subscription; it is still running.
        if producing {
            tracing::info!(target: TARGET, "Producer already running, start not re-issued");
            return Ok(());
        }

        match self
            .control
            .batch_control(BatchControlRequest::start(&params))
            .await
        {
            Ok(status) => {
                self.update_state(|state| state.producing = true);
                tracing::info!(target: TARGET, "Producer start: {:?}", status);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(target: TARGET, "Producer start failed: {}", err);
                Err(err)
            }
        }
    }

    /// Closes the subscription and stops the producer.
    ///
    /// Completes even if the subscription never connected. A failed
    /// "stop producing" call is returned and leaves `producing` set, so a
    /// later `stop()` retries it.
    pub async fn stop(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;

        let (producing, params) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.phase == ConnectionPhase::Disconnected
                && !state.producing
                && lifecycle.reader.is_none()
            {
                return Ok(());
            }
            state.phase = ConnectionPhase::Closing;
            (state.producing, state.control_params)
        };

        write_dashboard(&self.dashboard).close_subscription();

        if let Some(cancel) = lifecycle.cancel.take() {
            cancel.cancel();
        }
        if let Some(reader) = lifecycle.reader.take()
            && let Err(err) = reader.await
            && !err.is_cancelled()
        {
            tracing::warn!(target: TARGET, "Reader task ended abnormally: {}", err);
        }

        let result = if producing {
            self.control
                .batch_control(BatchControlRequest::stop(&params))
                .await
                .map(|status| tracing::info!(target: TARGET, "Producer stop: {:?}", status))
        } else {
            Ok(())
        };
        if let Err(err) = &result {
            tracing::warn!(target: TARGET, "Producer stop failed: {}", err);
        }

        self.update_state(|state| {
            state.phase = ConnectionPhase::Disconnected;
            state.subscribed = false;
            state.reconnect_attempts = 0;
            if result.is_ok() {
                state.producing = false;
            }
        });
        tracing::info!(target: TARGET, "Subscription closed");
        result
    }

    /// Applies new producer parameters.
    ///
    /// While subscribed or producing this is a full stop followed by a start
    /// with the new parameters; otherwise the parameters are stored for the
    /// next start.
    pub async fn reconfigure(&self, params: ControlParams) -> Result<()> {
        let was_live = {
            let state = self.state();
            state.subscribed || state.producing
        };
        if !was_live {
            self.update_state(|state| state.control_params = params);
            return Ok(());
        }

        let stopped = self.stop().await;
        self.update_state(|state| state.control_params = params);
        let started = self.start().await;
        stopped.and(started)
    }

    // ============================================================================
    // Side-channel calls
    // ============================================================================

    /// Submits a question and registers its answer stream as pending.
    pub async fn submit_question(&self, question: &str) -> Result<SubmissionReceipt> {
        let receipt = self.control.submit_question(question).await?;
        self.register_pending(FragmentChannel::QuestionResponse, &receipt, question);
        Ok(receipt)
    }

    /// Submits a viewer comment and registers its reply stream as pending.
    pub async fn submit_comment(&self, comment: &str) -> Result<SubmissionReceipt> {
        let receipt = self.control.submit_comment(comment).await?;
        self.register_pending(FragmentChannel::CommentReply, &receipt, comment);
        Ok(receipt)
    }

    pub async fn set_script(&self, script_id: i64) -> Result<()> {
        self.control.set_script(script_id).await
    }

    pub async fn update_recommendation(&self, recommendation: &str) -> Result<()> {
        self.control.update_recommendation(recommendation).await
    }

    /// Resets the producer's statistics and clears the local interaction log.
    pub async fn reset_stats(&self) -> Result<()> {
        self.control.reset_stats().await?;
        write_dashboard(&self.dashboard).reset_interactions();
        Ok(())
    }

    fn register_pending(&self, channel: FragmentChannel, receipt: &SubmissionReceipt, key: &str) {
        if let Some(stream_id) = &receipt.stream_id {
            write_dashboard(&self.dashboard).register_pending(channel, stream_id.clone(), key);
        }
    }

    fn update_state(&self, f: impl FnOnce(&mut ConnectionState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }
}

/// Everything the reader task needs, detached from the supervisor.
struct Reader {
    dashboard: SharedDashboard,
    source: Arc<dyn EventSource>,
    state: Arc<RwLock<ConnectionState>>,
    policy: ReconnectPolicy,
}

impl Reader {
    /// Moves the phase unless teardown has already begun.
    fn transition(&self, phase: ConnectionPhase, attempts: u32) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.phase.is_live() {
            state.phase = phase;
            state.reconnect_attempts = attempts;
        }
    }

    /// Gives up after a drop with reconnect disabled. `producing` stays set
    /// so `stop()` still issues the matching stop.
    fn abandon(&self, token: SubscriptionToken) {
        let mut dashboard = write_dashboard(&self.dashboard);
        if dashboard.is_current(token) {
            dashboard.close_subscription();
        }
        drop(dashboard);

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.phase.is_live() {
            state.phase = ConnectionPhase::Disconnected;
            state.subscribed = false;
        }
    }

    fn deliver(&self, token: SubscriptionToken, raw: &RawEvent) -> IngestOutcome {
        write_dashboard(&self.dashboard).ingest(token, raw)
    }
}

async fn run_reader(reader: Reader, token: SubscriptionToken, cancel: CancellationToken) {
    let mut attempt: u32 = 0;

    loop {
        let opened = tokio::select! {
            _ = cancel.cancelled() => return,
            opened = reader.source.open() => opened,
        };

        match opened {
            Ok(mut frames) => {
                attempt = 0;
                reader.transition(ConnectionPhase::Connected, 0);
                tracing::info!(target: TARGET, "Subscription {} connected", token.value());

                loop {
                    let next = tokio::select! {
                        _ = cancel.cancelled() => return,
                        next = frames.next() => next,
                    };
                    match next {
                        Some(Ok(raw)) => {
                            if reader.deliver(token, &raw) == IngestOutcome::Stale {
                                return;
                            }
                        }
                        Some(Err(err)) => {
                            tracing::warn!(target: TARGET, "Stream error: {}", err);
                            break;
                        }
                        None => {
                            tracing::info!(target: TARGET, "Stream ended by server");
                            break;
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(target: TARGET, "Failed to open stream: {}", err);
            }
        }

        if !reader.policy.enabled {
            tracing::info!(target: TARGET, "Reconnect disabled; subscription {} dropped", token.value());
            reader.abandon(token);
            return;
        }

        attempt = attempt.saturating_add(1);
        reader.transition(ConnectionPhase::Connecting, attempt);
        let delay = Duration::from_millis(reader.policy.delay_ms(attempt));
        tracing::info!(
            target: TARGET,
            "Reconnecting in {}ms (attempt {})",
            delay.as_millis(),
            attempt
        );

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
