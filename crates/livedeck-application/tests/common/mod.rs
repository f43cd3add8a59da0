//! Hand-written mocks of the dashboard ports.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc;
use livedeck_core::alert::AlertConditions;
use livedeck_core::control::{BatchControlRequest, ProducerAction, ProducerStatus, SubmissionReceipt};
use livedeck_core::event::RawEvent;
use livedeck_core::ports::{AlertSource, ControlClient, EventSource, EventStream};
use livedeck_core::{LivedeckError, Result};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub type FrameSender = mpsc::UnboundedSender<Result<RawEvent>>;

pub fn interaction_frame(user: &str, kind: &str, comment: &str) -> RawEvent {
    RawEvent::message(format!(
        r#"{{"live_interaction": {{"user_id": "{user}", "interaction": "{kind}", "comment": "{comment}"}}, "user_profile": null}}"#
    ))
}

/// Polls `condition` until it holds or two seconds pass.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

// Mock EventSource: each open() hands out the next queued stream.
// With the queue empty, open() either fails or returns a stream that never ends.
pub struct MockEventSource {
    streams: Mutex<VecDeque<mpsc::UnboundedReceiver<Result<RawEvent>>>>,
    opens: AtomicUsize,
    fail_when_empty: bool,
}

impl MockEventSource {
    pub fn new() -> Self {
        Self {
            streams: Mutex::new(VecDeque::new()),
            opens: AtomicUsize::new(0),
            fail_when_empty: false,
        }
    }

    /// A source whose opens fail until a stream is queued.
    pub fn unreachable() -> Self {
        Self {
            fail_when_empty: true,
            ..Self::new()
        }
    }

    /// Queues a stream for the next open() and returns its sender.
    pub fn push_stream(&self) -> FrameSender {
        let (tx, rx) = mpsc::unbounded();
        self.streams.lock().unwrap().push_back(rx);
        tx
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn open(&self) -> Result<EventStream> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        match self.streams.lock().unwrap().pop_front() {
            Some(rx) => Ok(rx.boxed()),
            None if self.fail_when_empty => Err(LivedeckError::transport("connection refused")),
            None => Ok(futures::stream::pending().boxed()),
        }
    }
}

// Mock ControlClient: records every call as a short string.
pub struct MockControl {
    calls: Mutex<Vec<String>>,
    fail_start: bool,
    fail_stop: Mutex<bool>,
    next_stream: AtomicUsize,
}

impl MockControl {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_start: false,
            fail_stop: Mutex::new(false),
            next_stream: AtomicUsize::new(1),
        }
    }

    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::new()
        }
    }

    pub fn set_fail_stop(&self, fail: bool) {
        *self.fail_stop.lock().unwrap() = fail;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ControlClient for MockControl {
    async fn batch_control(&self, request: BatchControlRequest) -> Result<ProducerStatus> {
        let action = match request.action {
            ProducerAction::Start => "start",
            ProducerAction::Stop => "stop",
        };
        self.record(format!("{action}:{}:{}", request.interval, request.count));

        match request.action {
            ProducerAction::Start if self.fail_start => {
                Err(LivedeckError::control("batch_control", "HTTP 500: boom"))
            }
            ProducerAction::Start => Ok(ProducerStatus::Started),
            ProducerAction::Stop if *self.fail_stop.lock().unwrap() => {
                Err(LivedeckError::control("batch_control", "HTTP 503: unavailable"))
            }
            ProducerAction::Stop => Ok(ProducerStatus::Stopped),
        }
    }

    async fn set_script(&self, script_id: i64) -> Result<()> {
        self.record(format!("set_script:{script_id}"));
        Ok(())
    }

    async fn submit_question(&self, question: &str) -> Result<SubmissionReceipt> {
        self.record(format!("ask:{question}"));
        let n = self.next_stream.fetch_add(1, Ordering::SeqCst);
        Ok(SubmissionReceipt {
            status: "processing".into(),
            stream_id: Some(format!("q-{n}")),
        })
    }

    async fn submit_comment(&self, comment: &str) -> Result<SubmissionReceipt> {
        self.record(format!("reply:{comment}"));
        let n = self.next_stream.fetch_add(1, Ordering::SeqCst);
        Ok(SubmissionReceipt {
            status: "processing".into(),
            stream_id: Some(format!("c-{n}")),
        })
    }

    async fn update_recommendation(&self, recommendation: &str) -> Result<()> {
        self.record(format!("recommend:{recommendation}"));
        Ok(())
    }

    async fn reset_stats(&self) -> Result<()> {
        self.record("reset_stats".into());
        Ok(())
    }
}

// Mock AlertSource: replays queued poll results, then repeats the last success.
pub struct MockAlertSource {
    responses: Mutex<VecDeque<Result<AlertConditions>>>,
    last: Mutex<AlertConditions>,
    polls: AtomicUsize,
}

impl MockAlertSource {
    pub fn new(responses: Vec<Result<AlertConditions>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(AlertConditions::default()),
            polls: AtomicUsize::new(0),
        }
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlertSource for MockAlertSource {
    async fn poll_alerts(&self) -> Result<AlertConditions> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(conditions)) => {
                *self.last.lock().unwrap() = conditions.clone();
                Ok(conditions)
            }
            Some(Err(err)) => Err(err),
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }
}
