//! Normalized weather record and display methods

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Normalized weather record handed to the UI
///
/// Serialized in camelCase because the browser client consumes it directly.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedWeather {
    /// Resolved city name
    pub city: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Temperature in Celsius, rounded to whole degrees
    pub temperature: i32,
    /// Perceived temperature in Celsius, rounded to whole degrees
    pub feels_like: i32,
    /// Human-readable description of conditions
    pub description: String,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Sunrise as a local 12-hour clock string (e.g. "6:42 AM")
    pub sunrise: String,
    /// Sunset as a local 12-hour clock string
    pub sunset: String,
    /// Daily forecast entries, present only when the turn asked for one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Vec<ForecastDay>>,
}

/// One collapsed calendar day of the forecast feed
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForecastDay {
    /// Calendar date, local to the queried place
    pub date: NaiveDate,
    /// Temperature in Celsius, rounded to whole degrees
    pub temperature: i32,
    /// Human-readable description of conditions
    pub description: String,
    /// Provider icon code for the UI
    pub icon: String,
}

impl NormalizedWeather {
    /// Convert a provider temperature in Kelvin to whole-degree Celsius
    ///
    /// Stable: the same raw input always yields the same rounded output.
    #[must_use]
    pub fn kelvin_to_celsius(kelvin: f64) -> i32 {
        (kelvin - 273.15).round() as i32
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", self.temperature)
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{:.1} m/s", self.wind_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelvin_to_celsius_rounding() {
        assert_eq!(NormalizedWeather::kelvin_to_celsius(273.15), 0);
        assert_eq!(NormalizedWeather::kelvin_to_celsius(293.15), 20);
        assert_eq!(NormalizedWeather::kelvin_to_celsius(291.65), 19);
        assert_eq!(NormalizedWeather::kelvin_to_celsius(272.6), -1);
    }

    #[test]
    fn test_kelvin_to_celsius_is_stable() {
        let raw = 288.734;
        let first = NormalizedWeather::kelvin_to_celsius(raw);
        for _ in 0..10 {
            assert_eq!(NormalizedWeather::kelvin_to_celsius(raw), first);
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let weather = NormalizedWeather {
            city: "Paris".to_string(),
            latitude: 48.8566,
            longitude: 2.3522,
            temperature: 18,
            feels_like: 17,
            description: "clear sky".to_string(),
            humidity: 55,
            wind_speed: 3.2,
            sunrise: "6:42 AM".to_string(),
            sunset: "8:15 PM".to_string(),
            forecast: None,
        };
        let json = serde_json::to_string(&weather).unwrap();
        assert!(json.contains("\"feelsLike\":17"));
        assert!(json.contains("\"windSpeed\":3.2"));
        // Absent forecast is omitted entirely, not serialized as null
        assert!(!json.contains("forecast"));
    }
}
