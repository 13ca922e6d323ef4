use std::net::SocketAddr;
use std::sync::Arc;

use ayurtrace_ledger::LedgerStore;
use ayurtrace_service::{create_router, AppState};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// AyurTrace traceability ledger daemon.
#[derive(Parser)]
#[command(name = "ayurtraced", version, about)]
struct Args {
    /// Address the HTTP API binds to.
    #[arg(long, env = "AYURTRACE_LISTEN", default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Emit debug-level logs.
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState {
        store: Arc::new(LedgerStore::with_defaults()),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    tracing::info!(listen = %args.listen, "ayurtraced listening");
    axum::serve(listener, app).await?;
    Ok(())
}
