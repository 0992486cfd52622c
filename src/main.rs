use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use livelist::{
    FollowedStreamsSession, MemoryEnvironment, SessionOutcome, TracingNotifier, TwitchConfig,
};

/// Fetch the live streams followed by a Twitch account
#[derive(Debug, Parser)]
#[command(name = "livelist", version, about)]
struct Args {
    /// URL of the page the adapter runs on, including any `#access_token=` fragment
    #[arg(long, env = "LIVELIST_URL")]
    url: Url,

    /// JSON configuration file (defaults to TWITCH_CLIENT_ID and friends from the environment)
    #[arg(long, env = "LIVELIST_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let env_file_path = dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                "livelist=debug,warn".into()
            } else {
                "livelist=info,warn".into()
            }
        }))
        .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();

    match env_file_path {
        Some(path) => info!("Loaded environment variables from {}", path.display()),
        None => debug!("No .env file found. Using existing environment variables."),
    };

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TwitchConfig::load(path).await?,
        None => TwitchConfig::from_env().context("Twitch configuration is incomplete")?,
    };

    let environment = Arc::new(MemoryEnvironment::new(args.url));
    let mut session =
        FollowedStreamsSession::new(config, environment.clone(), Arc::new(TracingNotifier));

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received, cancelling");
                cancel.cancel();
            }
        })
    };

    let outcome = session.run(&cancel).await;
    ctrl_c.abort();

    match outcome {
        SessionOutcome::Redirected(url) => {
            println!("Open this URL to authorize, then run again with the URL you land on:");
            println!("{}", url);
        }
        SessionOutcome::Published(records) => {
            println!("{}", serde_json::to_string_pretty(&records)?);
            if let Some(url) = environment.replacements().last() {
                debug!(url = %url, "Token fragment removed from page URL");
            }
        }
        SessionOutcome::Cancelled => info!("Cancelled before streams were published"),
    }

    let counters = session.counters();
    info!(
        total = counters.total,
        completed = counters.completed,
        settled = session.requests_are_done(),
        "Done"
    );
    Ok(())
}
