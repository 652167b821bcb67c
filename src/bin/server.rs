use std::{env, error::Error, fs::OpenOptions, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use pnw_ledger::{
    AppState, Credentials, LedgerStore, ResourcePolicy, build_router, get_local_offset,
    graceful_shutdown, logging_middleware,
};

/// The web server for the Politics & War transaction ledger.
///
/// The cookie secret and the log-in credentials are read from the
/// environment variables `SECRET`, `LEDGER_USERNAME` and `LEDGER_PASSWORD`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the ledger's SQLite database. Created if it does not exist.
    #[arg(long, default_value = "pnw_logs.db")]
    db_path: PathBuf,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone used for transaction dates, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// Whether resources must be one of the known Politics & War resources.
    #[arg(long, value_enum, default_value_t = ResourcePolicy::Strict)]
    resource_policy: ResourcePolicy,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logging()?;

    let args = Args::parse();

    if get_local_offset(&args.timezone).is_none() {
        return Err(format!(
            "\"{}\" is not a valid, canonical timezone name",
            args.timezone
        )
        .into());
    }

    let secret = required_env_var("SECRET")?;
    let credentials = Credentials::new(
        &required_env_var("LEDGER_USERNAME")?,
        &required_env_var("LEDGER_PASSWORD")?,
    );

    let store = LedgerStore::new(&args.db_path, args.resource_policy, &args.timezone);
    let state = AppState::new(store, &secret, credentials)?;
    tracing::info!(
        "Using the ledger at {} with the {:?} resource policy",
        args.db_path.display(),
        args.resource_policy
    );

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

fn required_env_var(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("The environment variable '{name}' must be set"))
}

fn setup_logging() -> Result<(), Box<dyn Error>> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
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

    router
        .layer(middleware::from_fn(logging_middleware))
        .layer(tracing_layer)
}
