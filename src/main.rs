use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser; // for cli
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, fmt};

use portfolio_metrics::config::{Args, StoreKind};
use portfolio_metrics::rate_limit::eviction_sweeper;
use portfolio_metrics::router::build_router;
use portfolio_metrics::state::AppState;
use portfolio_metrics::store::{CounterStore, FirebaseStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // parse cli arguments
    let args = Args::parse();
    if let Err(e) = args.validate() {
        tracing::error!("invalid configuration: {e}");
        return Err(e.into());
    }

    let store = build_store(&args)?;
    let state = AppState::new(store, args.cache_ttl(), args.rate_limit, args.rate_window());

    // spawn the eviction sweeper
    let sweeper = tokio::spawn(eviction_sweeper(
        Arc::clone(&state.rate_limiter),
        args.sweep_interval(),
    ));

    let app = build_router(state, &args.origins());

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(%addr, store = ?args.store, "metrics api running");
    tracing::info!(cache_ttl = args.cache_ttl, "stats cache ttl (seconds)");
    tracing::info!(
        rate_limit = args.rate_limit,
        rate_window = args.rate_window,
        "rate limit: requests per window (seconds)"
    );
    tracing::info!(origins = ?args.origins(), "cors origins");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    tracing::info!("server shut down");
    Ok(())
}

fn build_store(args: &Args) -> Result<Arc<dyn CounterStore>, Box<dyn Error>> {
    match args.store {
        StoreKind::Memory => {
            tracing::warn!("using in-memory store, counters reset on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreKind::Firebase => {
            let url = args
                .database_url
                .as_deref()
                .ok_or("missing database url")?;
            let client = reqwest::Client::builder()
                .timeout(args.store_timeout())
                .build()?;
            let store = FirebaseStore::new(client, url, args.database_auth.clone())?;
            tracing::info!(database = %url, "using firebase realtime database");
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
