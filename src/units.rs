//! Display unit conversions backing the unit preference.

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn kph_to_mph(kph: f64) -> f64 {
    kph / 1.609344
}

pub fn mph_to_kph(mph: f64) -> f64 {
    mph * 1.609344
}

pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let multiplier = 10_f64.powi(decimals as i32);
    (value * multiplier).round() / multiplier
}
