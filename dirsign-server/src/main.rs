mod api;
mod config;
mod error;
mod state;
mod tls;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use dirsign_core::platform::{OsRandom, SystemClock};
use dirsign_core::protocol::ServerProtocol;
use dirsign_core::store::SessionStore;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::Result;
use state::AppState;

#[derive(Parser)]
#[command(name = "dirsign-server", version, about = "Folder signature registration server")]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, env = "DIRSIGN_CONFIG", default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dirsign_server=info,dirsign_core=info,tower_http=info")),
        )
        .init();

    // Load .env file if present (non-fatal if missing).
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("no .env file loaded: {e}");
    }

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "server stopped");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load(&args.config)?;
    config.apply_env();

    let store = Arc::new(SessionStore::open(config.store_file())?);
    tracing::info!(path = ?store.path(), records = store.len(), "session store opened");
    let protocol = ServerProtocol::new(
        store,
        Arc::new(OsRandom::new()),
        Arc::new(SystemClock::new()),
    )?;

    let state = Arc::new(AppState {
        protocol,
        accounts: config.accounts(),
    });
    tracing::info!(
        basic_auth = state.accounts.is_some(),
        tls = config.secure.enable,
        "configuration loaded"
    );

    let router = api::build_router(state);
    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    if config.secure.enable {
        // Install the ring crypto provider for rustls before any TLS operations.
        if rustls::crypto::ring::default_provider().install_default().is_err() {
            tracing::debug!("rustls crypto provider already installed");
        }
        let tls_config = tls::load_tls_config(&config.secure.cert, &config.secure.key)?;
        tracing::info!(%addr, "HTTPS listener starting");
        tls::serve_tls(listener, tls_config, router).await
    } else {
        tracing::info!(%addr, "HTTP listener starting");
        axum::serve(listener, router).await?;
        Ok(())
    }
}
