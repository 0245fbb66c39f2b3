use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::units;

/// Durable key-value capability behind the client caches and preferences.
/// Any persistent backend can stand in; tests and non-browser targets use
/// the in-memory one.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn delete(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn delete(&self, key: &str) {
        self.lock().remove(key);
    }
}

/// Persisted state keys. Each value is JSON, parsed independently.
pub mod keys {
    pub const QUICK_LOCATIONS: &str = "skycast.quickLocations";
    pub const LAST_TEMPERATURES: &str = "skycast.lastTemperatures";
    pub const THEME: &str = "skycast.theme";
    pub const UNIT: &str = "skycast.unit";
    pub const RECENT_SEARCHES: &str = "skycast.recentSearches";
    pub const WEATHER_CACHE: &str = "skycast.weatherCache";
    pub const EXTENDED_CACHE: &str = "skycast.extendedCache";
}

/// Reads a key, falling back to the type's default on any parse or shape
/// failure. One corrupt key never poisons the others.
pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn Store, key: &str) -> T {
    store
        .get(key)
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

pub fn save<T: Serialize>(store: &dyn Store, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(err) => tracing::warn!("Failed to serialize {}: {}", key, err),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePref {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitPref {
    #[default]
    Celsius,
    Fahrenheit,
}

impl UnitPref {
    /// Converts a stored Celsius value into the display unit.
    pub fn display_temp(self, celsius: f64) -> f64 {
        match self {
            UnitPref::Celsius => celsius,
            UnitPref::Fahrenheit => units::celsius_to_fahrenheit(celsius),
        }
    }

    /// Converts a displayed value back into Celsius for storage.
    pub fn store_temp(self, displayed: f64) -> f64 {
        match self {
            UnitPref::Celsius => displayed,
            UnitPref::Fahrenheit => units::fahrenheit_to_celsius(displayed),
        }
    }

    /// Converts a stored kph wind speed into the display unit.
    pub fn display_wind(self, kph: f64) -> f64 {
        match self {
            UnitPref::Celsius => kph,
            UnitPref::Fahrenheit => units::kph_to_mph(kph),
        }
    }

    /// Converts a displayed wind speed back into kph for storage.
    pub fn store_wind(self, displayed: f64) -> f64 {
        match self {
            UnitPref::Celsius => displayed,
            UnitPref::Fahrenheit => units::mph_to_kph(displayed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickLocation {
    pub name: String,
    pub query: String,
}

pub type QuickLocations = Vec<QuickLocation>;
pub type RecentSearches = Vec<String>;
/// Last-known temperature (Celsius) per location query.
pub type LastTemperatures = HashMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Host-supplied "current position" lookup. Failures surface as short
/// displayable strings, matching the result convention used elsewhere.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, String>;
}
