mod common;

use async_trait::async_trait;
use common::{MockAlertSource, MockControl, MockEventSource, interaction_frame, wait_until};
use livedeck_application::LiveDashboard;
use livedeck_core::alert::{Alert, AlertConditions, AlertKind, Severity};
use livedeck_core::control::{BatchControlRequest, ProducerStatus, SubmissionReceipt};
use livedeck_core::ports::{AlertSource, ControlClient, EventSource, EventStream};
use livedeck_core::{ConnectionPhase, Result};
use livedeck_infrastructure::LivedeckConfig;
use std::sync::Arc;

// One object serving every port, the way the HTTP client does.
struct MockService {
    events: MockEventSource,
    control: MockControl,
    alerts: MockAlertSource,
}

#[async_trait]
impl EventSource for MockService {
    async fn open(&self) -> Result<EventStream> {
        self.events.open().await
    }
}

#[async_trait]
impl ControlClient for MockService {
    async fn batch_control(&self, request: BatchControlRequest) -> Result<ProducerStatus> {
        self.control.batch_control(request).await
    }

    async fn set_script(&self, script_id: i64) -> Result<()> {
        self.control.set_script(script_id).await
    }

    async fn submit_question(&self, question: &str) -> Result<SubmissionReceipt> {
        self.control.submit_question(question).await
    }

    async fn submit_comment(&self, comment: &str) -> Result<SubmissionReceipt> {
        self.control.submit_comment(comment).await
    }

    async fn update_recommendation(&self, recommendation: &str) -> Result<()> {
        self.control.update_recommendation(recommendation).await
    }

    async fn reset_stats(&self) -> Result<()> {
        self.control.reset_stats().await
    }
}

#[async_trait]
impl AlertSource for MockService {
    async fn poll_alerts(&self) -> Result<AlertConditions> {
        self.alerts.poll_alerts().await
    }
}

#[tokio::test]
async fn start_and_stop_drive_stream_and_alerts() {
    let service = Arc::new(MockService {
        events: MockEventSource::new(),
        control: MockControl::new(),
        alerts: MockAlertSource::new(vec![Ok(AlertConditions {
            alerts: vec![Alert::new(AlertKind::VipPresence, Severity::Positive, "VIP joined")],
            ..Default::default()
        })]),
    });
    let tx = service.events.push_stream();

    let mut config = LivedeckConfig::default();
    config.dashboard.log_capacity = 2;
    let live = LiveDashboard::with_client(&config, service.clone());

    live.start().await.unwrap();
    for user in ["u1", "u2", "u3"] {
        tx.unbounded_send(Ok(interaction_frame(user, "enter", ""))).unwrap();
    }

    assert!(wait_until(|| live.view().counters.applied >= 3).await);
    assert!(wait_until(|| live.view().alert_count == 1).await);

    let view = live.view();
    let texts: Vec<&str> = view.interactions.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["u2 entered", "u3 entered"]);
    assert_eq!(view.active_alert.unwrap().message, "VIP joined");
    assert_eq!(live.connection().phase, ConnectionPhase::Connected);

    live.stop().await.unwrap();
    assert_eq!(live.connection().phase, ConnectionPhase::Disconnected);
    assert_eq!(
        service.control.calls(),
        vec!["start:1:999999", "stop:1:999999"]
    );
}
