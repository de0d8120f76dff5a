use masjid_core::stripe::StripeClient;
use masjid_core::{AppState, config, cors_layer, create_app, db};
use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database pool
    let pool = db::create_pool(&config).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    // Payment processor client, built once and shared
    let stripe = StripeClient::new(
        config.stripe_api_url.clone(),
        config.stripe_secret_key.clone(),
    )?;
    tracing::info!("Stripe client initialized with URL: {}", config.stripe_api_url);

    // Category broadcast channel; receivers attach per WebSocket connection
    let (category_events, _) = tokio::sync::broadcast::channel(100);

    let app_state = AppState {
        db: pool,
        stripe,
        checkout: config.checkout.clone(),
        category_events,
    };

    let app = create_app(app_state, cors_layer(&config.cors_allowed_origins));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
