use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Simplified schema served to the UI.

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    pub name: String,
    pub country: String,
    pub local_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub visibility_km: f64,
    pub precip_mm: f64,
    pub description: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub location: LocationInfo,
    pub current: CurrentConditions,
    pub fetched_at: DateTime<Utc>,
}

/// One day of history or forecast. History days carry precipitation and wind
/// totals; forecast days carry the rain probability instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: String,
    pub max_temp: f64,
    pub min_temp: f64,
    pub avg_temp: f64,
    pub condition: String,
    pub icon_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_precip: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_wind: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chance_of_rain: Option<f64>,
}

/// Merged 2-day-history + 2-day-forecast view. Both halves are always
/// present; a failed half reports through its error field instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedOutlook {
    pub location: LocationInfo,
    pub history: Vec<DaySummary>,
    pub forecast: Vec<DaySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast_error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

// Provider wire types.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLocation {
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub localtime: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiCondition {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCurrent {
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub humidity: f64,
    pub wind_kph: f64,
    #[serde(default)]
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub vis_km: f64,
    pub precip_mm: f64,
    #[serde(default)]
    pub condition: ApiCondition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentResponse {
    pub location: ApiLocation,
    pub current: ApiCurrent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDay {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub avgtemp_c: f64,
    #[serde(default)]
    pub totalprecip_mm: f64,
    #[serde(default)]
    pub maxwind_kph: f64,
    #[serde(default)]
    pub daily_chance_of_rain: f64,
    #[serde(default)]
    pub condition: ApiCondition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiForecastDay {
    pub date: String,
    pub day: ApiDay,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiForecast {
    #[serde(default)]
    pub forecastday: Vec<ApiForecastDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub location: ApiLocation,
    #[serde(default)]
    pub forecast: ApiForecast,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub forecast: ApiForecast,
}
