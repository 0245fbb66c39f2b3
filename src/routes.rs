use axum::extract::{Query, State};
use axum::middleware::from_fn_with_state;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::aggregate;
use crate::error::ApiError;
use crate::provider::types::{ExtendedOutlook, WeatherSnapshot};
use crate::provider::weatherapi::WeatherApiClient;
use crate::rate_limit::{self, FixedWindowLimiter};

#[derive(Clone)]
pub struct AppState {
    pub weather_client: Arc<WeatherApiClient>,
    pub limiter: Arc<FixedWindowLimiter>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub time: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        time: Utc::now().to_rfc3339(),
    })
}

// A blank query is rejected before anything goes upstream.
fn require_query(params: &WeatherQuery) -> Result<&str, ApiError> {
    match params.query.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => Ok(query),
        _ => Err(ApiError::MissingInput),
    }
}

pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<WeatherSnapshot>, ApiError> {
    let query = require_query(&params)?;
    let snapshot = state.weather_client.current(query).await?;
    Ok(Json(snapshot))
}

pub async fn get_extended(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<ExtendedOutlook>, ApiError> {
    let query = require_query(&params)?;
    let outlook = aggregate::extended_outlook(&state.weather_client, query).await?;
    Ok(Json(outlook))
}

pub fn create_router(state: AppState) -> Router {
    // Only the weather routes sit behind the limiter; health stays open.
    let gated = Router::new()
        .route("/api/weather", get(get_weather))
        .route("/api/weather/extended", get(get_extended))
        .layer(from_fn_with_state(state.limiter.clone(), rate_limit::gate));

    Router::new()
        .route("/api/health", get(health))
        .merge(gated)
        .with_state(state)
}
