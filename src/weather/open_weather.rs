//! `OpenWeatherMap` API response structures and conversion utilities

use serde::Deserialize;

use crate::models::Location;

/// One geocoding match from `GET /geo/1.0/direct`
///
/// An empty result list signals not-found.
#[derive(Debug, Deserialize)]
pub struct GeoResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: Option<String>,
    pub state: Option<String>,
}

impl From<GeoResult> for Location {
    fn from(result: GeoResult) -> Self {
        Location {
            latitude: result.lat,
            longitude: result.lon,
            name: result.name,
            country: result.country,
            state: result.state,
        }
    }
}

/// Current conditions from `GET /data/2.5/weather`
#[derive(Debug, Deserialize)]
pub struct CurrentResponse {
    /// Station-reported place name (may differ from the geocoded name)
    #[serde(default)]
    pub name: String,
    /// UTC offset of the queried place, in seconds
    pub timezone: i32,
    pub main: MainData,
    pub weather: Vec<ConditionData>,
    pub wind: WindData,
    pub sys: Option<SysData>,
}

/// Thermodynamic readings (temperatures in Kelvin)
#[derive(Debug, Deserialize)]
pub struct MainData {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
}

/// Condition description and icon code
#[derive(Debug, Deserialize)]
pub struct ConditionData {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub struct WindData {
    /// Wind speed in m/s
    pub speed: f64,
}

/// Sunrise/sunset instants as Unix timestamps; absent in some regions
#[derive(Debug, Deserialize)]
pub struct SysData {
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

/// Multi-sample forecast feed from `GET /data/2.5/forecast`
///
/// Several samples per day; the gateway collapses them to one per calendar
/// date.
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastSample>,
    pub city: Option<CityData>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastSample {
    /// Sample instant as a Unix timestamp
    pub dt: i64,
    pub main: SampleMain,
    pub weather: Vec<ConditionData>,
}

#[derive(Debug, Deserialize)]
pub struct SampleMain {
    pub temp: f64,
}

#[derive(Debug, Deserialize)]
pub struct CityData {
    /// UTC offset of the forecast place, in seconds
    pub timezone: i32,
}
