use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skycast_server::config::Config;
use skycast_server::provider::weatherapi::WeatherApiClient;
use skycast_server::rate_limit::FixedWindowLimiter;
use skycast_server::routes::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skycast_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    if config.weather_api_key.is_none() {
        tracing::warn!("WEATHER_API_KEY is not set; weather endpoints will answer 500");
    }

    let limiter = Arc::new(FixedWindowLimiter::new(
        Duration::from_millis(config.rate_limit_window_ms),
        config.rate_limit_max,
    ));
    let port = config.port;
    let weather_client = Arc::new(WeatherApiClient::new(config)?);

    let state = AppState {
        weather_client,
        limiter,
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server starting on http://{}", addr);

    // ConnectInfo feeds the rate limiter's fallback key.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
