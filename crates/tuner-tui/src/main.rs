mod action;
mod app;
mod app_state;
mod component;
mod components;
mod focus;
mod headless;
mod theme;
mod widgets;

use std::time::Duration;

use clap::Parser;
use tuner_proto::client::ApiClient;
use tuner_proto::config::Config;
use tuner_proto::dispatch::spawn_dispatcher;
use tuner_proto::platform;
use tuner_proto::sync::SyncController;

/// Terminal client for an RTP radio relay.
#[derive(Debug, Parser)]
#[command(name = "tuner", version)]
struct Cli {
    /// Relay base url (overrides `api.base_url`).
    #[arg(long)]
    api: Option<String>,

    /// Log reconciled state instead of drawing a UI.
    #[arg(long)]
    headless: bool,

    /// Do not subscribe to push updates.
    #[arg(long)]
    no_push: bool,

    /// Seconds between scheduled pulls; 0 disables polling.
    #[arg(long, value_name = "SECS")]
    poll: Option<u64>,
}

fn init_logging(headless: bool) -> anyhow::Result<()> {
    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "debug,hyper_util=warn,reqwest=warn,hyper=warn,tungstenite=warn,tokio_tungstenite=warn"
            .to_string()
    });

    if headless {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(log_filter.as_str())
            .init();
        return Ok(());
    }

    let log_path = platform::log_file();
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("tuner log: {}", log_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.headless)?;
    tracing::info!("tuner starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("config unreadable, using defaults: {}", e);
        Config::default()
    });
    if let Some(api) = cli.api {
        config.api.base_url = api;
    }
    if cli.no_push {
        config.sync.push_enabled = false;
    }
    if let Some(secs) = cli.poll {
        config.sync.poll_interval_secs = secs;
    }
    tracing::info!("relay: {}", config.api.base_url);

    // ── Engine ───────────────────────────────────────────────────────────────
    let client = ApiClient::new(&config.api.base_url, config.request_timeout())?;
    let controller = SyncController::new(client.clone(), config.sync_settings());
    let (commands, _dispatcher) = spawn_dispatcher(client);

    if cli.headless {
        return headless::run(controller).await;
    }

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(controller, commands, config.ui.volume_step);
    app.run().await?;

    // Give in-flight commands a moment to leave before the runtime stops.
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "tuner",
            "--api",
            "http://relay:9000",
            "--no-push",
            "--poll",
            "0",
        ]);
        assert_eq!(cli.api.as_deref(), Some("http://relay:9000"));
        assert!(cli.no_push);
        assert_eq!(cli.poll, Some(0));
        assert!(!cli.headless);
    }
}
