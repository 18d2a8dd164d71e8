use clap::{Parser, ValueEnum};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::sync::Arc;
use std::time::Duration;

use storefront::config::{Config, Environment};
use storefront::db::{AppState, create_pool, init_db, seed_widgets};
use storefront::handlers;
use storefront::payments::StripeClient;
use storefront::render::Renderer;
use storefront::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Storefront pages and checkout
    Web,
    /// JSON API for payment intents and widgets
    Api,
}

#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Widget storefront with Stripe-confirmed checkout")]
struct Cli {
    /// Which server to run
    #[arg(long, value_enum, default_value_t = Mode::Web)]
    mode: Mode,

    /// Port to listen on (defaults to PORT, or 4001 in api mode)
    #[arg(long)]
    port: Option<u16>,

    /// Application environment (development|production)
    #[arg(long)]
    env: Option<Environment>,

    /// SQLite database path
    #[arg(long)]
    dsn: Option<String>,

    /// URL of the API server, rendered into checkout pages
    #[arg(long)]
    api: Option<String>,

    /// Seed the catalog with sample widgets (development only)
    #[arg(long)]
    seed: bool,
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(port) = cli.port {
        config.port = port;
    } else if cli.mode == Mode::Api && std::env::var("PORT").is_err() {
        config.port = 4001;
    }
    if let Some(env) = cli.env {
        config.env = env;
    }
    if let Some(ref dsn) = cli.dsn {
        config.database_path = dsn.clone();
    }
    if let Some(ref api) = cli.api {
        config.api_url = api.clone();
    }
}

/// Drops expired sessions (and any receipts they still hold) every 5 minutes.
fn spawn_session_purge_task(sessions: SessionStore) {
    tokio::spawn(async move {
        let interval = Duration::from_secs(5 * 60);

        loop {
            tokio::time::sleep(interval).await;

            let count = sessions.purge_expired();
            if count > 0 {
                tracing::debug!("Purged {} expired sessions", count);
            }
        }
    });

    tracing::info!("Session purge task started (runs every 5 minutes)");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    apply_overrides(&mut config, &cli);

    if config.stripe.secret_key.is_empty() {
        tracing::warn!("STRIPE_SECRET_KEY is not set; payment lookups will fail");
    }

    let timeout = Duration::from_secs(config.db_timeout_secs);
    let pool = create_pool(&config.database_path, timeout).expect("Failed to create database pool");
    {
        let conn = pool.get().expect("Failed to get database connection");
        init_db(&conn).expect("Failed to initialize database schema");

        if cli.seed {
            if config.is_production() {
                tracing::warn!("--seed flag ignored: not in development mode");
            } else {
                match seed_widgets(&conn) {
                    Ok(0) => tracing::info!("Widgets already present, skipping seed"),
                    Ok(n) => tracing::info!("Seeded {} widgets", n),
                    Err(e) => tracing::warn!("Failed to seed widgets: {}", e),
                }
            }
        }
    }

    let sessions = SessionStore::new(config.session_lifetime_hours * 3600);
    let state = AppState {
        db: pool,
        processor: Arc::new(StripeClient::new(&config.stripe)),
        sessions: sessions.clone(),
        renderer: Arc::new(Renderer::new(
            config.stripe.publishable_key.clone(),
            config.api_url.clone(),
        )),
        secure_cookies: config.is_production(),
        static_dir: config.static_dir.clone().into(),
    };

    let app = match cli.mode {
        Mode::Web => {
            spawn_session_purge_task(sessions);
            handlers::web::router(state.clone())
        }
        Mode::Api => handlers::api::router(config.rate_limit),
    };
    let app = app.layer(TraceLayer::new_for_http()).with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!(
        "Starting {:?} server in {} mode on {}",
        cli.mode,
        config.env,
        addr
    );

    // Connect info is needed for per-IP rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
