use chrono::Utc;

use crate::provider::types::{ApiForecastDay, DaySummary, ExtendedOutlook, LocationInfo};
use crate::provider::weatherapi::{normalize_icon_url, ProviderError, WeatherApiClient};

pub const FORECAST_UNAVAILABLE: &str = "Forecast unavailable";

/// Days requested from the forecast endpoint: today plus two future days.
const FORECAST_DAYS: u32 = 3;
/// Future days kept after dropping today.
const FUTURE_DAYS: usize = 2;

/// Builds the 2-day-history + 2-day-forecast view from three concurrent
/// upstream calls. The forecast call is the required path (it also supplies
/// the location metadata); the two history calls are best-effort and a
/// failure there is reported in `history_error` instead of failing the
/// request.
pub async fn extended_outlook(
    client: &WeatherApiClient,
    query: &str,
) -> Result<ExtendedOutlook, ProviderError> {
    // All three calls settle before the response is composed; a history
    // failure never short-circuits the others.
    let (forecast, history_one, history_two) = tokio::join!(
        client.forecast(query, FORECAST_DAYS),
        client.history_days_ago(query, 1),
        client.history_days_ago(query, 2),
    );

    let forecast = forecast?;
    let location = LocationInfo::from(&forecast.location);

    // All or nothing: fewer than two future days after dropping today means
    // the forecast half is withheld entirely and reported as unavailable.
    let mut forecast_days: Vec<DaySummary> = forecast
        .forecast
        .forecastday
        .iter()
        .skip(1)
        .take(FUTURE_DAYS)
        .map(forecast_day)
        .collect();
    let forecast_error = if forecast_days.len() < FUTURE_DAYS {
        forecast_days.clear();
        Some(FORECAST_UNAVAILABLE.to_string())
    } else {
        None
    };

    // Yesterday before two-days-ago, matching the call order.
    let mut history = Vec::new();
    let mut history_error = None;
    for result in [history_one, history_two] {
        match result {
            Ok(response) => {
                history.extend(response.forecast.forecastday.iter().map(history_day));
            }
            Err(err) => {
                tracing::warn!("History call failed for {}: {}", query, err);
                if history_error.is_none() {
                    history_error = Some(err.to_string());
                }
            }
        }
    }
    if !history.is_empty() {
        history_error = None;
    }

    Ok(ExtendedOutlook {
        location,
        history,
        forecast: forecast_days,
        history_error,
        forecast_error,
        fetched_at: Utc::now(),
    })
}

fn history_day(day: &ApiForecastDay) -> DaySummary {
    DaySummary {
        date: day.date.clone(),
        max_temp: day.day.maxtemp_c,
        min_temp: day.day.mintemp_c,
        avg_temp: day.day.avgtemp_c,
        condition: day.day.condition.text.clone(),
        icon_url: normalize_icon_url(&day.day.condition.icon),
        total_precip: Some(day.day.totalprecip_mm),
        max_wind: Some(day.day.maxwind_kph),
        chance_of_rain: None,
    }
}

fn forecast_day(day: &ApiForecastDay) -> DaySummary {
    DaySummary {
        date: day.date.clone(),
        max_temp: day.day.maxtemp_c,
        min_temp: day.day.mintemp_c,
        avg_temp: day.day.avgtemp_c,
        condition: day.day.condition.text.clone(),
        icon_url: normalize_icon_url(&day.day.condition.icon),
        total_precip: None,
        max_wind: None,
        chance_of_rain: Some(day.day.daily_chance_of_rain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::Days;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base_url: &str) -> WeatherApiClient {
        WeatherApiClient::new(Config {
            weather_api_key: Some("test-key".to_string()),
            weather_api_base_url: base_url.to_string(),
            port: 0,
            rate_limit_window_ms: 60_000,
            rate_limit_max: 5,
            upstream_timeout_secs: None,
        })
        .unwrap()
    }

    fn date_days_ago(offset: u64) -> String {
        (Utc::now().date_naive() - Days::new(offset))
            .format("%Y-%m-%d")
            .to_string()
    }

    fn day_json(date: &str, max: f64) -> serde_json::Value {
        json!({
            "date": date,
            "day": {
                "maxtemp_c": max,
                "mintemp_c": max - 8.0,
                "avgtemp_c": max - 4.0,
                "totalprecip_mm": 1.2,
                "maxwind_kph": 22.0,
                "daily_chance_of_rain": 40.0,
                "condition": {
                    "text": "Cloudy",
                    "icon": "//cdn.weatherapi.com/weather/64x64/day/119.png"
                }
            }
        })
    }

    fn forecast_body(days: &[serde_json::Value]) -> serde_json::Value {
        json!({
            "location": {
                "name": "Paris",
                "country": "France",
                "localtime": "2026-08-23 15:00"
            },
            "forecast": { "forecastday": days }
        })
    }

    async fn mount_forecast(server: &MockServer, days: &[serde_json::Value]) {
        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .and(query_param("days", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(days)))
            .mount(server)
            .await;
    }

    async fn mount_history(server: &MockServer, date: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/history.json"))
            .and(query_param("dt", date))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn merges_forecast_and_both_history_calls() {
        let server = MockServer::start().await;
        let yesterday = date_days_ago(1);
        let before = date_days_ago(2);

        mount_forecast(
            &server,
            &[
                day_json("today", 20.0),
                day_json("day+1", 21.0),
                day_json("day+2", 22.0),
            ],
        )
        .await;
        mount_history(
            &server,
            &yesterday,
            json!({ "forecast": { "forecastday": [day_json(&yesterday, 18.0)] } }),
        )
        .await;
        mount_history(
            &server,
            &before,
            json!({ "forecast": { "forecastday": [day_json(&before, 17.0)] } }),
        )
        .await;

        let outlook = extended_outlook(&client_for(&server.uri()), "Paris")
            .await
            .unwrap();

        assert_eq!(outlook.location.name, "Paris");
        assert_eq!(outlook.forecast.len(), 2);
        assert_eq!(outlook.forecast[0].date, "day+1");
        assert_eq!(outlook.forecast[1].date, "day+2");
        assert_eq!(outlook.forecast[0].chance_of_rain, Some(40.0));
        assert_eq!(outlook.forecast[0].total_precip, None);

        // Yesterday first, then two days ago.
        assert_eq!(outlook.history.len(), 2);
        assert_eq!(outlook.history[0].date, yesterday);
        assert_eq!(outlook.history[1].date, before);
        assert_eq!(outlook.history[0].total_precip, Some(1.2));
        assert_eq!(outlook.history[0].max_wind, Some(22.0));
        assert_eq!(outlook.history[0].chance_of_rain, None);

        assert!(outlook.history_error.is_none());
        assert!(outlook.forecast_error.is_none());
    }

    #[tokio::test]
    async fn history_failures_do_not_fail_the_request() {
        let server = MockServer::start().await;
        mount_forecast(
            &server,
            &[
                day_json("today", 20.0),
                day_json("day+1", 21.0),
                day_json("day+2", 22.0),
            ],
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/history.json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 1008, "message": "History not available." }
            })))
            .mount(&server)
            .await;

        let outlook = extended_outlook(&client_for(&server.uri()), "Paris")
            .await
            .unwrap();

        assert!(outlook.history.is_empty());
        assert_eq!(
            outlook.history_error.as_deref(),
            Some("History not available.")
        );
        assert_eq!(outlook.forecast.len(), 2);
        assert!(outlook.forecast_error.is_none());
    }

    #[tokio::test]
    async fn one_successful_history_call_clears_the_error() {
        let server = MockServer::start().await;
        let yesterday = date_days_ago(1);
        let before = date_days_ago(2);

        mount_forecast(
            &server,
            &[
                day_json("today", 20.0),
                day_json("day+1", 21.0),
                day_json("day+2", 22.0),
            ],
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/history.json"))
            .and(query_param("dt", yesterday.as_str()))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 1008, "message": "History not available." }
            })))
            .mount(&server)
            .await;
        mount_history(
            &server,
            &before,
            json!({ "forecast": { "forecastday": [day_json(&before, 17.0)] } }),
        )
        .await;

        let outlook = extended_outlook(&client_for(&server.uri()), "Paris")
            .await
            .unwrap();

        assert_eq!(outlook.history.len(), 1);
        assert_eq!(outlook.history[0].date, before);
        assert!(outlook.history_error.is_none());
    }

    #[tokio::test]
    async fn forecast_failure_fails_the_whole_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 1006, "message": "No matching location found." }
            })))
            .mount(&server)
            .await;
        mount_history(
            &server,
            &date_days_ago(1),
            json!({ "forecast": { "forecastday": [day_json("d", 18.0)] } }),
        )
        .await;
        mount_history(
            &server,
            &date_days_ago(2),
            json!({ "forecast": { "forecastday": [day_json("d", 17.0)] } }),
        )
        .await;

        let err = extended_outlook(&client_for(&server.uri()), "Paris")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::Rejected("No matching location found.".to_string())
        );
    }

    #[tokio::test]
    async fn single_future_day_is_not_served_partially() {
        let server = MockServer::start().await;
        // Today plus one future day: one short of a full forecast half.
        mount_forecast(&server, &[day_json("today", 20.0), day_json("day+1", 21.0)]).await;
        mount_history(
            &server,
            &date_days_ago(1),
            json!({ "forecast": { "forecastday": [day_json("d", 18.0)] } }),
        )
        .await;
        mount_history(
            &server,
            &date_days_ago(2),
            json!({ "forecast": { "forecastday": [day_json("d", 17.0)] } }),
        )
        .await;

        let outlook = extended_outlook(&client_for(&server.uri()), "Paris")
            .await
            .unwrap();

        assert!(outlook.forecast.is_empty());
        assert_eq!(outlook.forecast_error.as_deref(), Some(FORECAST_UNAVAILABLE));
        assert_eq!(outlook.history.len(), 2);
    }

    #[tokio::test]
    async fn short_forecast_sets_the_forecast_error() {
        let server = MockServer::start().await;
        // Only today comes back, nothing remains after dropping day 0.
        mount_forecast(&server, &[day_json("today", 20.0)]).await;
        mount_history(
            &server,
            &date_days_ago(1),
            json!({ "forecast": { "forecastday": [day_json("d", 18.0)] } }),
        )
        .await;
        mount_history(
            &server,
            &date_days_ago(2),
            json!({ "forecast": { "forecastday": [day_json("d", 17.0)] } }),
        )
        .await;

        let outlook = extended_outlook(&client_for(&server.uri()), "Paris")
            .await
            .unwrap();

        assert!(outlook.forecast.is_empty());
        assert_eq!(outlook.forecast_error.as_deref(), Some(FORECAST_UNAVAILABLE));
        assert_eq!(outlook.history.len(), 2);
    }
}
