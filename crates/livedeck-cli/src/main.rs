use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use livedeck_infrastructure::LivedeckConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "livedeck")]
#[command(about = "LIVEDECK - live-operations dashboard for livestream selling", long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that take precedence over the config file and environment.
#[derive(Args)]
struct Overrides {
    /// Producer service base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Number of interaction entries kept
    #[arg(long, global = true)]
    log_capacity: Option<usize>,

    /// Seconds between produced interactions
    #[arg(long, global = true)]
    interval: Option<f64>,

    /// Number of interactions to produce
    #[arg(long, global = true)]
    count: Option<u64>,

    /// Do not reconnect after the stream drops
    #[arg(long, global = true)]
    no_reconnect: bool,
}

impl Overrides {
    fn apply(self, config: &mut LivedeckConfig) {
        if let Some(base_url) = self.base_url {
            config.server.base_url = base_url;
        }
        if let Some(capacity) = self.log_capacity {
            config.dashboard.log_capacity = capacity;
        }
        if let Some(interval) = self.interval {
            config.producer.interval = interval;
        }
        if let Some(count) = self.count {
            config.producer.count = count;
        }
        if self.no_reconnect {
            config.reconnect.enabled = false;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Subscribe to the stream and log the dashboard until Ctrl-C
    Watch {
        /// Seconds between dashboard summaries
        #[arg(long, default_value_t = 2)]
        refresh: u64,

        /// Print each summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Ask a question; the answer streams as question_response
    Ask { question: String },
    /// Request a suggested reply to a viewer comment
    Reply { comment: String },
    /// Select the active script template
    SetScript { script_id: i64 },
    /// Update the context used for script recommendations
    Recommend { recommendation: String },
    /// Reset the producer's statistics
    ResetStats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = LivedeckConfig::load()?;
    cli.overrides.apply(&mut config);
    config.validate()?;

    match cli.command {
        Commands::Watch { refresh, json } => commands::watch::run(&config, refresh, json).await?,
        Commands::Ask { question } => commands::control::ask(&config, &question).await?,
        Commands::Reply { comment } => commands::control::reply(&config, &comment).await?,
        Commands::SetScript { script_id } => {
            commands::control::set_script(&config, script_id).await?
        }
        Commands::Recommend { recommendation } => {
            commands::control::recommend(&config, &recommendation).await?
        }
        Commands::ResetStats => commands::control::reset_stats(&config).await?,
    }

    Ok(())
}
