use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    /// Provider access key. Absence is a request-time 500, not a boot failure.
    pub weather_api_key: Option<String>,
    pub weather_api_base_url: String,
    pub port: u16,
    pub rate_limit_window_ms: u64,
    pub rate_limit_max: u32,
    /// Upstream request timeout in seconds; unset leaves the HTTP client default.
    pub upstream_timeout_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            weather_api_key: env::var("WEATHER_API_KEY").ok().filter(|k| !k.is_empty()),
            weather_api_base_url: env::var("WEATHER_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.weatherapi.com/v1".to_string()),
            port: parse_var("PORT")?.unwrap_or(8080),
            rate_limit_window_ms: parse_var("RATE_LIMIT_WINDOW_MS")?.unwrap_or(60_000),
            rate_limit_max: parse_var("RATE_LIMIT_MAX")?.unwrap_or(5),
            upstream_timeout_secs: parse_var("UPSTREAM_TIMEOUT_SECS")?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> anyhow::Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", name, raw)),
        Err(_) => Ok(None),
    }
}
