//! Geocoding/weather gateway
//!
//! Resolves a free-text place name to coordinates, fetches current
//! conditions and (when asked) the multi-day forecast feed, and normalizes
//! everything into a single [`NormalizedWeather`] record. Pure
//! fetch-and-normalize: no caching, repeated identical queries re-hit the
//! provider.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use sunrise::{Coordinates, SolarDay, SolarEvent};
use tracing::debug;

use crate::SkycastError;
use crate::config::WeatherConfig;
use crate::models::{ForecastDay, Location, NormalizedWeather, QueryIntent};

pub mod open_weather;

use open_weather::{CurrentResponse, ForecastResponse, GeoResult, SysData};

/// Forecast entries are capped at one week
const MAX_FORECAST_DAYS: usize = 7;

/// External-facing component resolving a location to normalized weather data
#[async_trait]
pub trait WeatherGateway: Send + Sync {
    /// Fetch and normalize weather for a resolved place name
    async fn fetch(
        &self,
        location: &str,
        intent: QueryIntent,
    ) -> Result<NormalizedWeather, SkycastError>;
}

/// `OpenWeatherMap`-backed gateway
pub struct OpenWeatherGateway {
    http: ClientWithMiddleware,
    api_key: String,
    geo_base: String,
    data_base: String,
}

impl OpenWeatherGateway {
    /// Create a new gateway from the weather configuration
    ///
    /// Credentials are validated at startup; a missing key here is a
    /// configuration error, never a per-request failure.
    pub fn new(config: &WeatherConfig) -> Result<Self, SkycastError> {
        if config.api_key.is_empty() {
            return Err(SkycastError::config("Weather API key is required"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("skycast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| SkycastError::config(format!("Failed to create HTTP client: {err}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let http = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            geo_base: config.geo_base_url.trim_end_matches('/').to_string(),
            data_base: config.data_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a free-text place name to its best-matching coordinates
    ///
    /// Only the top-ranked result is used; ambiguous names resolve to
    /// whichever place the provider ranks first.
    async fn geocode(&self, query: &str) -> Result<Location, SkycastError> {
        let url = format!(
            "{}/direct?q={}&limit=1&appid={}",
            self.geo_base,
            urlencoding::encode(query),
            self.api_key
        );

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SkycastError::provider(format!(
                "geocoding request returned {}",
                response.status()
            )));
        }

        let results: Vec<GeoResult> = response.json().await?;
        results
            .into_iter()
            .next()
            .map(Location::from)
            .ok_or_else(|| SkycastError::location_not_found(query))
    }

    async fn fetch_current(&self, lat: f64, lon: f64) -> Result<CurrentResponse, SkycastError> {
        let url = format!(
            "{}/weather?lat={lat}&lon={lon}&appid={}",
            self.data_base, self.api_key
        );

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SkycastError::provider(format!(
                "current conditions request returned {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastResponse, SkycastError> {
        let url = format!(
            "{}/forecast?lat={lat}&lon={lon}&appid={}",
            self.data_base, self.api_key
        );

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SkycastError::provider(format!(
                "forecast request returned {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl WeatherGateway for OpenWeatherGateway {
    #[tracing::instrument(skip(self))]
    async fn fetch(
        &self,
        location: &str,
        intent: QueryIntent,
    ) -> Result<NormalizedWeather, SkycastError> {
        let place = self.geocode(location).await?;
        debug!(
            "Geocoded '{}' to {} at ({})",
            location,
            place.name,
            place.format_coordinates()
        );

        // Current conditions are always needed for the payload, even on
        // forecast-only turns.
        let current = self.fetch_current(place.latitude, place.longitude).await?;

        let forecast = if intent.wants_forecast() {
            Some(self.fetch_forecast(place.latitude, place.longitude).await?)
        } else {
            None
        };

        Ok(normalize(&place, current, forecast))
    }
}

/// Assemble the normalized record from raw provider responses
fn normalize(
    place: &Location,
    current: CurrentResponse,
    forecast: Option<ForecastResponse>,
) -> NormalizedWeather {
    let offset = current.timezone;
    let (sunrise, sunset) = sunrise_sunset_strings(place, current.sys.as_ref(), offset);

    let condition = current.weather.into_iter().next();

    NormalizedWeather {
        city: place.name.clone(),
        latitude: place.latitude,
        longitude: place.longitude,
        temperature: NormalizedWeather::kelvin_to_celsius(current.main.temp),
        feels_like: NormalizedWeather::kelvin_to_celsius(current.main.feels_like),
        description: condition
            .as_ref()
            .map_or_else(|| "unknown".to_string(), |c| c.description.clone()),
        humidity: current.main.humidity,
        wind_speed: current.wind.speed,
        sunrise,
        sunset,
        forecast: forecast.map(|feed| collapse_forecast(feed, offset)),
    }
}

/// Collapse the multi-sample feed to one entry per calendar date
///
/// The first sample of each date wins; dates are computed in the queried
/// place's local time and capped at [`MAX_FORECAST_DAYS`], chronological
/// order preserved.
fn collapse_forecast(feed: ForecastResponse, fallback_offset: i32) -> Vec<ForecastDay> {
    let offset = feed.city.map_or(fallback_offset, |city| city.timezone);
    let tz = fixed_offset(offset);

    let mut days: Vec<ForecastDay> = Vec::new();
    for sample in feed.list {
        if days.len() == MAX_FORECAST_DAYS {
            break;
        }
        let Some(instant) = DateTime::<Utc>::from_timestamp(sample.dt, 0) else {
            continue;
        };
        let date = instant.with_timezone(&tz).date_naive();
        if days.iter().any(|day| day.date == date) {
            continue;
        }
        let condition = sample.weather.into_iter().next();
        days.push(ForecastDay {
            date,
            temperature: NormalizedWeather::kelvin_to_celsius(sample.main.temp),
            description: condition
                .as_ref()
                .map_or_else(|| "unknown".to_string(), |c| c.description.clone()),
            icon: condition.map_or_else(String::new, |c| c.icon),
        });
    }
    days
}

/// Format provider sunrise/sunset instants as local 12-hour clock strings,
/// computing them astronomically when the provider omits them
fn sunrise_sunset_strings(
    place: &Location,
    sys: Option<&SysData>,
    offset_seconds: i32,
) -> (String, String) {
    let provided = sys.and_then(|s| Some((s.sunrise?, s.sunset?)));
    let instants = provided.or_else(|| solar_fallback(place, Utc::now().date_naive()));

    match instants {
        Some((rise, set)) => (
            local_clock_time(rise, offset_seconds),
            local_clock_time(set, offset_seconds),
        ),
        None => ("unknown".to_string(), "unknown".to_string()),
    }
}

/// Astronomical sunrise/sunset for places where the provider omits them
fn solar_fallback(place: &Location, date: NaiveDate) -> Option<(i64, i64)> {
    let coordinates = Coordinates::new(place.latitude, place.longitude)?;
    let solar_day = SolarDay::new(coordinates, date);
    Some((
        solar_day.event_time(SolarEvent::Sunrise)?.timestamp(),
        solar_day.event_time(SolarEvent::Sunset)?.timestamp(),
    ))
}

/// Render a Unix timestamp as a 12-hour clock string local to the queried
/// place, using the provider-reported UTC offset
fn local_clock_time(unix: i64, offset_seconds: i32) -> String {
    let tz = fixed_offset(offset_seconds);
    DateTime::<Utc>::from_timestamp(unix, 0)
        .map_or_else(|| "unknown".to_string(), |instant| {
            instant.with_timezone(&tz).format("%-I:%M %p").to_string()
        })
}

fn fixed_offset(offset_seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_seconds)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is always valid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherConfig;
    use open_weather::{CityData, ConditionData, ForecastSample, MainData, SampleMain, WindData};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base: &str) -> WeatherConfig {
        WeatherConfig {
            api_key: "test_key_123".to_string(),
            geo_base_url: format!("{base}/geo"),
            data_base_url: format!("{base}/data"),
            timeout_seconds: 5,
            max_retries: 0,
        }
    }

    fn sample(dt: i64, temp_kelvin: f64, description: &str) -> ForecastSample {
        ForecastSample {
            dt,
            main: SampleMain { temp: temp_kelvin },
            weather: vec![ConditionData {
                description: description.to_string(),
                icon: "01d".to_string(),
            }],
        }
    }

    #[test]
    fn test_collapse_forecast_one_entry_per_day_capped_at_seven() {
        // 3-hourly samples over ten days, eight per day
        let mut list = Vec::new();
        let day_zero = 1_700_000_000 - (1_700_000_000 % 86_400);
        for day in 0..10 {
            for slot in 0..8 {
                list.push(sample(
                    day_zero + day * 86_400 + slot * 10_800,
                    280.0 + day as f64,
                    "scattered clouds",
                ));
            }
        }
        let feed = ForecastResponse {
            list,
            city: Some(CityData { timezone: 0 }),
        };

        let days = collapse_forecast(feed, 0);

        assert_eq!(days.len(), MAX_FORECAST_DAYS);
        for pair in days.windows(2) {
            assert!(pair[0].date < pair[1].date, "dates must ascend without duplicates");
        }
        // First sample of the first day wins
        assert_eq!(days[0].temperature, NormalizedWeather::kelvin_to_celsius(280.0));
    }

    #[test]
    fn test_collapse_forecast_uses_local_dates() {
        // 23:00 UTC and 01:00 UTC next day are different UTC dates, but at
        // UTC-11 both land on the same local calendar date.
        let base = 1_700_000_000 - (1_700_000_000 % 86_400); // midnight UTC
        let feed = ForecastResponse {
            list: vec![
                sample(base + 23 * 3_600, 285.0, "light rain"),
                sample(base + 25 * 3_600, 287.0, "clear sky"),
            ],
            city: Some(CityData { timezone: -11 * 3_600 }),
        };

        let days = collapse_forecast(feed, 0);

        assert_eq!(days.len(), 1, "both samples share a local calendar date");
        assert_eq!(days[0].description, "light rain");
    }

    #[test]
    fn test_local_clock_time_applies_offset() {
        // 2023-11-14 22:13:20 UTC
        let unix = 1_700_000_000;
        assert_eq!(local_clock_time(unix, 0), "10:13 PM");
        assert_eq!(local_clock_time(unix, 2 * 3_600), "12:13 AM");
        assert_eq!(local_clock_time(unix, -6 * 3_600), "4:13 PM");
    }

    #[test]
    fn test_normalize_rounds_temperatures() {
        let place = Location::new(48.8566, 2.3522, "Paris".to_string());
        let current = CurrentResponse {
            name: "Paris".to_string(),
            timezone: 3_600,
            main: MainData {
                temp: 291.15,
                feels_like: 290.4,
                humidity: 55,
            },
            weather: vec![ConditionData {
                description: "clear sky".to_string(),
                icon: "01d".to_string(),
            }],
            wind: WindData { speed: 3.2 },
            sys: Some(SysData {
                sunrise: Some(1_700_000_000),
                sunset: Some(1_700_030_000),
            }),
        };

        let weather = normalize(&place, current, None);

        assert_eq!(weather.city, "Paris");
        assert_eq!(weather.temperature, 18);
        assert_eq!(weather.feels_like, 17);
        assert_eq!(weather.description, "clear sky");
        assert!(weather.forecast.is_none());
    }

    #[tokio::test]
    async fn test_fetch_zero_geocoding_results_is_location_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let gateway = OpenWeatherGateway::new(&test_config(&server.uri())).unwrap();
        let result = gateway.fetch("Nowhereville", QueryIntent::Current).await;

        match result {
            Err(SkycastError::LocationNotFound { location }) => {
                assert_eq!(location, "Nowhereville");
            }
            other => panic!("expected LocationNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_upstream_failure_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "name": "Paris", "lat": 48.8566, "lon": 2.3522, "country": "FR"
            }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/weather"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let gateway = OpenWeatherGateway::new(&test_config(&server.uri())).unwrap();
        let result = gateway.fetch("Paris", QueryIntent::Current).await;

        assert!(matches!(result, Err(SkycastError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_fetch_full_flow_with_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/direct"))
            .and(query_param("q", "Paris"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "name": "Paris", "lat": 48.8566, "lon": 2.3522, "country": "FR"
            }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Paris",
                "timezone": 7200,
                "main": {"temp": 291.15, "feels_like": 290.4, "humidity": 55},
                "weather": [{"description": "clear sky", "icon": "01d"}],
                "wind": {"speed": 3.2},
                "sys": {"sunrise": 1700000000_i64, "sunset": 1700030000_i64}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "list": [
                    {"dt": 1700006400, "main": {"temp": 290.0},
                     "weather": [{"description": "light rain", "icon": "10d"}]},
                    {"dt": 1700017200, "main": {"temp": 292.0},
                     "weather": [{"description": "clear sky", "icon": "01d"}]},
                    {"dt": 1700092800, "main": {"temp": 289.0},
                     "weather": [{"description": "overcast clouds", "icon": "04d"}]}
                ],
                "city": {"timezone": 7200}
            })))
            .mount(&server)
            .await;

        let gateway = OpenWeatherGateway::new(&test_config(&server.uri())).unwrap();
        let weather = gateway.fetch("Paris", QueryIntent::Mixed).await.unwrap();

        assert_eq!(weather.city, "Paris");
        assert_eq!(weather.temperature, 18);
        assert_eq!(weather.humidity, 55);
        let forecast = weather.forecast.expect("mixed intent fetches the feed");
        assert_eq!(forecast.len(), 2);
        assert!(forecast[0].date < forecast[1].date);
        assert_eq!(forecast[0].description, "light rain");
    }

    #[tokio::test]
    async fn test_current_intent_skips_forecast_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "name": "Paris", "lat": 48.8566, "lon": 2.3522, "country": "FR"
            }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Paris",
                "timezone": 7200,
                "main": {"temp": 291.15, "feels_like": 290.4, "humidity": 55},
                "weather": [{"description": "clear sky", "icon": "01d"}],
                "wind": {"speed": 3.2},
                "sys": {"sunrise": 1700000000_i64, "sunset": 1700030000_i64}
            })))
            .mount(&server)
            .await;
        // No /data/forecast mock: a request there would fail the fetch

        let gateway = OpenWeatherGateway::new(&test_config(&server.uri())).unwrap();
        let weather = gateway.fetch("Paris", QueryIntent::Current).await.unwrap();

        assert!(weather.forecast.is_none());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let mut config = test_config("http://localhost");
        config.api_key = String::new();
        assert!(matches!(
            OpenWeatherGateway::new(&config),
            Err(SkycastError::Config { .. })
        ));
    }
}
