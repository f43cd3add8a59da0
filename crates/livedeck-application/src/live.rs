//! LiveDashboard - wires the dashboard, supervisor and alert timers together.

use anyhow::{Context, Result};
use livedeck_core::ports::{AlertSource, ControlClient, EventSource};
use livedeck_core::{ConnectionState, DashboardView};
use livedeck_infrastructure::{LiveApiClient, LivedeckConfig};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::alerts::AlertScheduler;
use crate::shared::{SharedDashboard, shared_dashboard, view};
use crate::supervisor::ConnectionSupervisor;

pub struct LiveDashboard {
    dashboard: SharedDashboard,
    supervisor: ConnectionSupervisor,
    alerts: Mutex<AlertScheduler>,
}

impl LiveDashboard {
    /// Builds a dashboard talking to the configured producer service.
    pub fn from_config(config: &LivedeckConfig) -> Result<Self> {
        let client = LiveApiClient::from_config(config)
            .with_context(|| format!("Failed to create client for {}", config.server.base_url))?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Builds a dashboard around one client implementing every port.
    pub fn with_client<C>(config: &LivedeckConfig, client: Arc<C>) -> Self
    where
        C: EventSource + ControlClient + AlertSource + 'static,
    {
        let dashboard = shared_dashboard(config.dashboard_settings());
        let supervisor = ConnectionSupervisor::new(
            Arc::clone(&dashboard),
            Arc::clone(&client) as Arc<dyn EventSource>,
            Arc::clone(&client) as Arc<dyn ControlClient>,
            config.control_params(),
            config.reconnect,
        );
        let alerts = AlertScheduler::new(
            Arc::clone(&dashboard),
            client as Arc<dyn AlertSource>,
            config.alerts.poll_interval(),
            config.alerts.rotate_interval(),
        );

        Self {
            dashboard,
            supervisor,
            alerts: Mutex::new(alerts),
        }
    }

    /// Starts the alert timers and the subscription.
    pub async fn start(&self) -> Result<()> {
        self.alerts.lock().await.start();
        self.supervisor
            .start()
            .await
            .context("Failed to start the producer")
    }

    /// Stops the subscription and the alert timers.
    pub async fn stop(&self) -> Result<()> {
        let stopped = self.supervisor.stop().await;
        self.alerts.lock().await.shutdown().await;
        stopped.context("Failed to stop the producer")
    }

    pub fn supervisor(&self) -> &ConnectionSupervisor {
        &self.supervisor
    }

    pub fn connection(&self) -> ConnectionState {
        self.supervisor.state()
    }

    pub fn view(&self) -> DashboardView {
        view(&self.dashboard)
    }
}
