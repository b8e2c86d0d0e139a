//! rsvp-library - preloaded text library service
//!
//! Loads the text library at startup and serves it read-only, alongside the
//! static reader page.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rsvp_common::config::TomlConfig;
use rsvp_common::shutdown::shutdown_signal;
use rsvp_library::{build_router, AppState, LibraryStore};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for rsvp-library
#[derive(Parser, Debug)]
#[command(name = "rsvp-library")]
#[command(about = "Preloaded text library for the RSVP reader")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "RSVP_LIBRARY_PORT")]
    port: Option<u16>,

    /// JSON file with the texts
    #[arg(short, long, env = "RSVP_TEXTS_PATH")]
    texts: Option<PathBuf>,

    /// Directory of static assets
    #[arg(short, long, env = "RSVP_STATIC_DIR")]
    static_dir: Option<PathBuf>,

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
        config.library.port = port;
    }
    if let Some(texts) = args.texts {
        config.library.texts_path = texts;
    }
    if let Some(dir) = args.static_dir {
        config.library.static_dir = dir;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("rsvp_library={},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting RSVP Library (rsvp-library) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let store = LibraryStore::load(&config.library.texts_path)
        .context("Failed to load library texts")?;

    let static_dir = if config.library.static_dir.is_dir() {
        info!("Serving static assets from {}", config.library.static_dir.display());
        Some(config.library.static_dir.clone())
    } else {
        warn!(
            "Static directory {} not found, serving library API only",
            config.library.static_dir.display()
        );
        None
    };

    let app = build_router(AppState::new(store), static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.library.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("rsvp-library listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}
