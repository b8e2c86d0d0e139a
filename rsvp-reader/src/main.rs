//! RSVP Reader (rsvp-reader) - Main entry point
//!
//! Hosts one reader engine and its HTTP control surface.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rsvp_common::config::TomlConfig;
use rsvp_common::events::EventBus;
use rsvp_reader::api::{self, AppContext};
use rsvp_reader::chunker::TagEmphasis;
use rsvp_reader::display::BroadcastDisplay;
use rsvp_reader::engine::{EngineConfig, ReaderEngine};
use rsvp_reader::library_client::LibraryClient;
use rsvp_reader::scheduler::TokioScheduler;
use rsvp_reader::SharedState;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for rsvp-reader
#[derive(Parser, Debug)]
#[command(name = "rsvp-reader")]
#[command(about = "RSVP reader control service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "RSVP_READER_PORT")]
    port: Option<u16>,

    /// Base URL of the library service
    #[arg(short, long, env = "RSVP_LIBRARY_URL")]
    library_url: Option<String>,

    /// Explicit config file (otherwise searched for)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.reader.port = port;
    }
    if let Some(url) = args.library_url {
        config.reader.library_url = url;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("rsvp_reader={},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting RSVP Reader (rsvp-reader) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(
        "Rate {} WPM (bounds {}-{}, step {}), library at {}",
        config.reader.default_rate,
        config.reader.min_rate,
        config.reader.max_rate,
        config.reader.rate_step,
        config.reader.library_url
    );

    let bus = EventBus::default();
    let display = Arc::new(BroadcastDisplay::new(bus.clone(), &config.reader.placeholder));
    let engine = Arc::new(ReaderEngine::with_emphasis(
        EngineConfig::from(&config.reader),
        Arc::new(TokioScheduler::current()),
        display.clone(),
        Arc::new(TagEmphasis::new(&config.reader.highlight_tag)),
    ));
    let library = LibraryClient::new(&config.reader.library_url)
        .context("Failed to create library client")?;

    let ctx = AppContext {
        engine,
        state: Arc::new(SharedState::new(bus)),
        display,
        library,
    };

    api::run(ctx, config.reader.port)
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}
