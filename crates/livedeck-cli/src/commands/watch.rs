use anyhow::{Context, Result};
use livedeck_application::LiveDashboard;
use livedeck_core::alert::RotorState;
use livedeck_core::{ConnectionPhase, DashboardView};
use livedeck_infrastructure::LivedeckConfig;
use std::time::Duration;

const TARGET: &str = "livedeck::view";

pub async fn run(config: &LivedeckConfig, refresh_secs: u64, json: bool) -> Result<()> {
    let live = LiveDashboard::from_config(config)?;
    println!("🚀 Watching {} (Ctrl-C to stop)", config.server.base_url);

    // The subscription stays open even if the producer refused to start.
    if let Err(err) = live.start().await {
        tracing::warn!(target: TARGET, "{:#}", err);
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(refresh_secs.max(1)));
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
            _ = ticker.tick() => {
                let view = live.view();
                if json {
                    println!("{}", serde_json::to_string(&view)?);
                } else {
                    log_view(&view, live.connection().phase);
                }
            }
        }
    }

    live.stop().await?;
    println!("✅ Stopped");
    Ok(())
}

fn log_view(view: &DashboardView, phase: ConnectionPhase) {
    let stats = &view.stats;
    tracing::info!(
        target: TARGET,
        "[{:?}] viewers {} (guests {:.0}%), likes {}, comments {}, shares {}, traffic {:?}",
        phase,
        stats.current_users,
        stats.guest_share_percent(),
        stats.total_likes,
        stats.total_comments,
        stats.total_shares,
        stats.traffic_trend()
    );

    let sources = top_counts(&stats.ranked_sources());
    let tags = top_counts(&stats.ranked_tags());
    if !sources.is_empty() || !tags.is_empty() {
        tracing::info!(target: TARGET, "  sources: {} | tags: {}", sources, tags);
    }

    for entry in &view.interactions {
        let marker = if entry.guest { " (guest)" } else { "" };
        tracing::info!(target: TARGET, "  {} {}{}", entry.icon, entry.text, marker);
    }
    if let (Some(alert), RotorState::Rotating { active_index }) =
        (&view.active_alert, view.alert_state)
    {
        tracing::info!(
            target: TARGET,
            "  ⚠️ [{}/{}] {:?}: {}",
            active_index + 1,
            view.alert_count,
            alert.severity,
            alert.message
        );
    }
    for answer in view.question_responses.iter().take(3) {
        tracing::info!(target: TARGET, "  ❓ {} -> {}", answer.correlation_key, answer.display_text());
    }
    for answer in view.comment_replies.iter().take(3) {
        tracing::info!(target: TARGET, "  💬 {} -> {}", answer.correlation_key, answer.display_text());
    }
    if let Some(recommendation) = view.recommendations.first() {
        tracing::info!(target: TARGET, "  📝 {}", recommendation.display_text());
    }
    if view.counters.dropped > 0 {
        tracing::debug!(target: TARGET, "  dropped payloads: {}", view.counters.dropped);
    }
}

/// First three `name count` pairs, comma separated.
fn top_counts(ranked: &[(&str, u64)]) -> String {
    ranked
        .iter()
        .take(3)
        .map(|(name, count)| format!("{name} {count}"))
        .collect::<Vec<_>>()
        .join(", ")
}
