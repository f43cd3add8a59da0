//! The dashboard coordinator.
//!
//! `Dashboard` owns every store and is the only thing that writes to them.
//! The delivery task hands it raw frames tagged with the subscription token
//! they arrived on; frames from a token that is no longer current are dropped,
//! which is what makes `stop()` final even with a delivery in flight.

use serde::Serialize;
use std::sync::Arc;

use crate::alert::{Alert, AlertConditions, AlertRotor, RotorState};
use crate::error::LivedeckError;
use crate::event::{DomainEvent, FragmentChannel, RawEvent, StreamFragment, classify};
use crate::fragment::{
    Accumulation, DEFAULT_ACCUMULATOR_CAPACITY, FragmentAccumulator, FragmentOutcome,
};
use crate::interaction::{DEFAULT_LOG_CAPACITY, InteractionLog, LogEntry};
use crate::stats::{SnapshotStore, StatsSnapshot};

/// Identifies one subscription instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SubscriptionToken(u64);

impl SubscriptionToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Store sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub log_capacity: usize,
    pub accumulator_capacity: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            accumulator_capacity: DEFAULT_ACCUMULATOR_CAPACITY,
        }
    }
}

/// What happened to one raw frame.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Applied to a store; carries the event name.
    Applied(&'static str),
    /// Classified, but nothing to do (unknown variant, unrendered interaction,
    /// fragment for a completed stream).
    Ignored(&'static str),
    /// Payload could not be decoded; the frame was dropped.
    Dropped(LivedeckError),
    /// Arrived on a subscription that is no longer current.
    Stale,
}

/// Running totals of ingest outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestCounters {
    pub applied: u64,
    pub ignored: u64,
    pub dropped: u64,
    pub stale: u64,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    interactions: InteractionLog,
    stats: SnapshotStore,
    recommendations: FragmentAccumulator,
    comment_replies: FragmentAccumulator,
    question_responses: FragmentAccumulator,
    alerts: AlertRotor,
    advisories: Vec<String>,
    subscription: Option<SubscriptionToken>,
    next_token: u64,
    counters: IngestCounters,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardSettings::default())
    }
}

impl Dashboard {
    pub fn new(settings: DashboardSettings) -> Self {
        Self {
            interactions: InteractionLog::new(settings.log_capacity),
            stats: SnapshotStore::new(),
            recommendations: FragmentAccumulator::new(settings.accumulator_capacity),
            comment_replies: FragmentAccumulator::new(settings.accumulator_capacity),
            question_responses: FragmentAccumulator::new(settings.accumulator_capacity),
            alerts: AlertRotor::new(),
            advisories: Vec::new(),
            subscription: None,
            next_token: 1,
            counters: IngestCounters::default(),
        }
    }

    // ============================================================================
    // Subscription binding
    // ============================================================================

    /// Issues a new token and makes it current. Any previous token goes stale.
    pub fn open_subscription(&mut self) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token);
        self.next_token += 1;
        self.subscription = Some(token);
        token
    }

    /// Invalidates the current token. Safe to call repeatedly.
    pub fn close_subscription(&mut self) {
        self.subscription = None;
    }

    pub fn is_current(&self, token: SubscriptionToken) -> bool {
        self.subscription == Some(token)
    }

    // ============================================================================
    // Writes
    // ============================================================================

    /// Classifies and applies one raw frame received on `token`.
    ///
    /// Never fails: malformed payloads are dropped and logged, unknown
    /// variants are ignored, stale frames are discarded.
    pub fn ingest(&mut self, token: SubscriptionToken, raw: &RawEvent) -> IngestOutcome {
        if !self.is_current(token) {
            self.counters.stale += 1;
            tracing::debug!(
                target: "livedeck::stream",
                token = token.value(),
                "Dropping frame from stale subscription"
            );
            return IngestOutcome::Stale;
        }

        match classify(raw) {
            Ok(event) => self.apply(event),
            Err(err) => {
                self.counters.dropped += 1;
                tracing::warn!(
                    target: "livedeck::stream",
                    label = raw.event.as_deref().unwrap_or("message"),
                    "Dropping malformed event: {}",
                    err
                );
                IngestOutcome::Dropped(err)
            }
        }
    }

    /// Routes a classified event to its store.
    pub fn apply(&mut self, event: DomainEvent) -> IngestOutcome {
        let name = event.name();
        let applied = match event {
            DomainEvent::Interaction(envelope) => self.interactions.record(envelope).is_some(),
            DomainEvent::Stats(snapshot) => {
                self.stats.replace(snapshot);
                true
            }
            DomainEvent::RecommendationFragment(fragment) => {
                self.ingest_fragment(FragmentChannel::Recommendation, fragment)
            }
            DomainEvent::CommentReplyFragment(fragment) => {
                self.ingest_fragment(FragmentChannel::CommentReply, fragment)
            }
            DomainEvent::QuestionResponseFragment(fragment) => {
                self.ingest_fragment(FragmentChannel::QuestionResponse, fragment)
            }
            DomainEvent::Unknown { label } => {
                tracing::debug!(
                    target: "livedeck::stream",
                    label = label.as_deref().unwrap_or("<none>"),
                    "Ignoring unrecognized event"
                );
                false
            }
        };

        if applied {
            self.counters.applied += 1;
            IngestOutcome::Applied(name)
        } else {
            self.counters.ignored += 1;
            IngestOutcome::Ignored(name)
        }
    }

    fn ingest_fragment(&mut self, channel: FragmentChannel, fragment: StreamFragment) -> bool {
        let stream_id = fragment.stream_id.clone();
        let outcome = self.accumulator_mut(channel).ingest(fragment);
        match outcome {
            FragmentOutcome::Ignored => {
                tracing::debug!(
                    target: "livedeck::stream",
                    channel = channel.as_str(),
                    stream_id = %stream_id,
                    "Fragment after completion ignored"
                );
                false
            }
            FragmentOutcome::Completed => {
                tracing::debug!(
                    target: "livedeck::stream",
                    channel = channel.as_str(),
                    stream_id = %stream_id,
                    "Stream complete"
                );
                true
            }
            FragmentOutcome::Created | FragmentOutcome::Appended => true,
        }
    }

    /// Records a stream announced by a submit call. Never overwrites one already started.
    pub fn register_pending(
        &mut self,
        channel: FragmentChannel,
        stream_id: impl Into<String>,
        correlation_key: impl Into<String>,
    ) -> bool {
        self.accumulator_mut(channel)
            .register(stream_id, correlation_key)
    }

    /// Replaces the alert list and advisories with a fresh poll result.
    pub fn apply_alert_conditions(&mut self, conditions: AlertConditions) {
        self.alerts.refresh(conditions.alerts);
        self.advisories = conditions.recommendations;
    }

    /// Advances alert rotation by one step.
    pub fn rotate_alerts(&mut self) {
        self.alerts.tick();
    }

    /// Clears the interaction log.
    pub fn reset_interactions(&mut self) {
        self.interactions.reset();
    }

    // ============================================================================
    // Reads
    // ============================================================================

    pub fn interactions(&self) -> &InteractionLog {
        &self.interactions
    }

    pub fn stats(&self) -> Arc<StatsSnapshot> {
        self.stats.current()
    }

    pub fn snapshot_store(&self) -> &SnapshotStore {
        &self.stats
    }

    pub fn accumulator(&self, channel: FragmentChannel) -> &FragmentAccumulator {
        match channel {
            FragmentChannel::Recommendation => &self.recommendations,
            FragmentChannel::CommentReply => &self.comment_replies,
            FragmentChannel::QuestionResponse => &self.question_responses,
        }
    }

    fn accumulator_mut(&mut self, channel: FragmentChannel) -> &mut FragmentAccumulator {
        match channel {
            FragmentChannel::Recommendation => &mut self.recommendations,
            FragmentChannel::CommentReply => &mut self.comment_replies,
            FragmentChannel::QuestionResponse => &mut self.question_responses,
        }
    }

    pub fn alerts(&self) -> &AlertRotor {
        &self.alerts
    }

    pub fn advisories(&self) -> &[String] {
        &self.advisories
    }

    pub fn counters(&self) -> IngestCounters {
        self.counters
    }

    /// Owned, self-consistent copy of everything a renderer needs.
    pub fn view(&self) -> DashboardView {
        DashboardView {
            interactions: self.interactions.snapshot(),
            stats: self.stats.current(),
            recommendations: self.recommendations.current_answers(),
            comment_replies: self.comment_replies.current_answers(),
            question_responses: self.question_responses.current_answers(),
            alert_state: self.alerts.state(),
            active_alert: self.alerts.active().cloned(),
            alert_count: self.alerts.len(),
            advisories: self.advisories.clone(),
            counters: self.counters,
        }
    }
}

/// Read-only copy of the dashboard taken under one lock acquisition.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub interactions: Vec<LogEntry>,
    pub stats: Arc<StatsSnapshot>,
    pub recommendations: Vec<Accumulation>,
    pub comment_replies: Vec<Accumulation>,
    pub question_responses: Vec<Accumulation>,
    pub alert_state: RotorState,
    pub active_alert: Option<Alert>,
    pub alert_count: usize,
    pub advisories: Vec<String>,
    pub counters: IngestCounters,
}
