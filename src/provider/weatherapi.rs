use super::types::*;
use crate::config::Config;
use chrono::{Days, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const GENERIC_REJECTION: &str = "weather service error";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("weather service API key is not configured")]
    MissingKey,
    #[error("{0}")]
    Rejected(String),
    #[error("unable to reach weather service")]
    Unreachable,
}

pub struct WeatherApiClient {
    client: Client,
    config: Config,
}

impl WeatherApiClient {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let mut builder = Client::builder().user_agent("Skycast/1.0");
        // Timeout is a knob, not a default: unset means the HTTP client's
        // own behavior applies.
        if let Some(secs) = config.upstream_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    /// Current conditions for a free-text location query.
    pub async fn current(&self, query: &str) -> Result<WeatherSnapshot, ProviderError> {
        let response: CurrentResponse = self.fetch("/current.json", &[("q", query)]).await?;
        Ok(WeatherSnapshot::from(response))
    }

    /// Forecast for the next `days` days, counting today as day 0.
    pub async fn forecast(&self, query: &str, days: u32) -> Result<ForecastResponse, ProviderError> {
        self.fetch("/forecast.json", &[("q", query), ("days", &days.to_string())])
            .await
    }

    /// Historical conditions for `offset` calendar days before today. The
    /// date is derived from the clock at call time, once per call.
    pub async fn history_days_ago(
        &self,
        query: &str,
        offset: u64,
    ) -> Result<HistoryResponse, ProviderError> {
        let date = Utc::now().date_naive() - Days::new(offset);
        let date = date.format("%Y-%m-%d").to_string();
        self.fetch("/history.json", &[("q", query), ("dt", &date)]).await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let key = self
            .config
            .weather_api_key
            .as_deref()
            .ok_or(ProviderError::MissingKey)?;

        let url = format!("{}{}", self.config.weather_api_base_url, path);
        let mut query: Vec<(&str, &str)> = vec![("key", key)];
        query.extend_from_slice(params);

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Upstream request to {} failed: {}", path, e);
                ProviderError::Unreachable
            })?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|_| ProviderError::Rejected(GENERIC_REJECTION.to_string()))?;

        // The provider reports failures in an error envelope, sometimes
        // under HTTP 200. Its message is forwarded verbatim.
        if let Some(message) = body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
        {
            return Err(ProviderError::Rejected(message.to_string()));
        }
        if !status.is_success() {
            return Err(ProviderError::Rejected(GENERIC_REJECTION.to_string()));
        }

        serde_json::from_value(body)
            .map_err(|_| ProviderError::Rejected(GENERIC_REJECTION.to_string()))
    }
}

/// The provider hands out protocol-relative icon URLs.
pub(crate) fn normalize_icon_url(icon: &str) -> String {
    if icon.starts_with("//") {
        format!("https:{icon}")
    } else {
        icon.to_string()
    }
}

impl From<&ApiLocation> for LocationInfo {
    fn from(location: &ApiLocation) -> Self {
        Self {
            name: location.name.clone(),
            country: location.country.clone(),
            local_time: location.localtime.clone(),
        }
    }
}

impl From<CurrentResponse> for WeatherSnapshot {
    fn from(response: CurrentResponse) -> Self {
        let current = response.current;
        Self {
            location: LocationInfo::from(&response.location),
            current: CurrentConditions {
                temperature_c: current.temp_c,
                feels_like_c: current.feelslike_c,
                humidity_pct: current.humidity,
                wind_kph: current.wind_kph,
                wind_dir: current.wind_dir,
                pressure_mb: current.pressure_mb,
                visibility_km: current.vis_km,
                precip_mm: current.precip_mm,
                description: current.condition.text,
                icon_url: normalize_icon_url(&current.condition.icon),
            },
            fetched_at: Utc::now(),
        }
    }
}
