use std::{
    error::Error,
    net::{IpAddr, SocketAddr},
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{AppState, build_router, graceful_shutdown, logging_middleware};

/// The REST API server for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database, or ":memory:".
    #[arg(long, env = "DATABASE_URL", default_value = "expenses.db")]
    db_path: String,

    /// The address to listen on.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// The largest number of expenses a single listing may return.
    ///
    /// Listings are not capped when this is not set.
    #[arg(long, env = "MAX_LIST_LIMIT")]
    max_list_limit: Option<u32>,

    /// Log every request and response, including bodies.
    #[arg(long, env = "LOG_BODIES")]
    log_bodies: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from((args.host, args.port));

    let conn = Connection::open(&args.db_path)?;
    let state = AppState::new(conn, &args.db_path, args.max_list_limit)?;
    tracing::info!("Using database {}", args.db_path);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let mut router = build_router(state);
    if args.log_bodies {
        router = router.layer(middleware::from_fn(logging_middleware));
    }
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

fn setup_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
