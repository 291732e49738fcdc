use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::Endpoints,
    error::FetchError,
    model::{
        AirQuality, Coordinates, CurrentConditions, DailyPoint, HourlyPoint, Place,
        UnitPreference, WeatherSnapshot,
    },
    provider::get_json,
};

use super::WeatherProvider;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weathercode,wind_speed_10m,is_day";
const HOURLY_FIELDS: &str = "temperature_2m,weathercode";
const DAILY_FIELDS: &str = "temperature_2m_max,weathercode";

/// Open-Meteo forecast, air-quality and geocoding search. No API key.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    forecast_url: String,
    air_quality_url: String,
    geocoding_url: String,
}

impl OpenMeteoProvider {
    pub fn new(http: Client, endpoints: &Endpoints) -> Self {
        Self {
            http,
            forecast_url: endpoints.forecast.clone(),
            air_quality_url: endpoints.air_quality.clone(),
            geocoding_url: endpoints.geocoding.clone(),
        }
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, FetchError> {
        tracing::debug!("Geocoding search for {query:?}");

        let parsed: OmSearchResponse = get_json(
            &self.http,
            &self.geocoding_url,
            &[("name", query.to_string()), ("count", limit.to_string())],
        )
        .await?;

        Ok(parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .map(Place::from)
            .collect())
    }
}

/// Query parameters of the forecast request.
pub fn forecast_params(coords: Coordinates, unit: UnitPreference) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", coords.latitude.to_string()),
        ("longitude", coords.longitude.to_string()),
        ("current", CURRENT_FIELDS.to_string()),
        ("hourly", HOURLY_FIELDS.to_string()),
        ("daily", DAILY_FIELDS.to_string()),
        ("temperature_unit", unit.temperature_param().to_string()),
        ("wind_speed_unit", unit.wind_param().to_string()),
        ("timezone", "auto".to_string()),
    ]
}

/// Query parameters of the air-quality request. Unit independent.
pub fn air_quality_params(coords: Coordinates) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", coords.latitude.to_string()),
        ("longitude", coords.longitude.to_string()),
        ("current", "us_aqi".to_string()),
    ]
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn forecast(
        &self,
        coords: Coordinates,
        unit: UnitPreference,
    ) -> Result<WeatherSnapshot, FetchError> {
        let params = forecast_params(coords, unit);
        let parsed: OmForecastResponse = get_json(&self.http, &self.forecast_url, &params).await?;
        Ok(parsed.into_snapshot())
    }

    async fn air_quality(&self, coords: Coordinates) -> Result<AirQuality, FetchError> {
        let params = air_quality_params(coords);
        let parsed: OmAirResponse = get_json(&self.http, &self.air_quality_url, &params).await?;

        Ok(AirQuality {
            us_aqi: parsed
                .current
                .and_then(|c| c.us_aqi)
                .map(|aqi| aqi.round() as i32),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    precipitation: f64,
    weathercode: i32,
    wind_speed_10m: f64,
    #[serde(default = "default_is_day")]
    is_day: u8,
}

fn default_is_day() -> u8 {
    1
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    weathercode: Vec<Option<i32>>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    weathercode: Vec<Option<i32>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current: OmCurrent,
    hourly: OmHourly,
    daily: OmDaily,
}

impl OmForecastResponse {
    fn into_snapshot(self) -> WeatherSnapshot {
        let current = CurrentConditions {
            temperature: self.current.temperature_2m,
            feels_like: self.current.apparent_temperature,
            humidity: self.current.relative_humidity_2m,
            wind_speed: self.current.wind_speed_10m,
            precipitation: self.current.precipitation,
            weather_code: self.current.weathercode,
            is_day: self.current.is_day == 1,
        };

        // Parallel arrays; entries with a missing value are dropped.
        let hourly = self
            .hourly
            .time
            .iter()
            .zip(self.hourly.temperature_2m)
            .zip(self.hourly.weathercode)
            .filter_map(|((time, temperature), code)| {
                Some(HourlyPoint {
                    time: parse_hour(time)?,
                    temperature: temperature?,
                    weather_code: code?,
                })
            })
            .collect();

        let daily = self
            .daily
            .time
            .iter()
            .zip(self.daily.temperature_2m_max)
            .zip(self.daily.weathercode)
            .filter_map(|((date, max), code)| {
                Some(DailyPoint {
                    date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?,
                    max_temperature: max?,
                    weather_code: code?,
                })
            })
            .collect();

        WeatherSnapshot { current, hourly, daily }
    }
}

fn parse_hour(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

#[derive(Debug, Deserialize)]
struct OmAirCurrent {
    us_aqi: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OmAirResponse {
    current: Option<OmAirCurrent>,
}

#[derive(Debug, Deserialize)]
struct OmSearchResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    results: Option<Vec<OmSearchResult>>,
}

impl From<OmSearchResult> for Place {
    fn from(r: OmSearchResult) -> Self {
        Place {
            name: r.name,
            country: r.country,
            latitude: r.latitude,
            longitude: r.longitude,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    pub(crate) fn forecast_body(code: i32, is_day: u8, hours: usize, days: usize) -> Value {
        let hour_times: Vec<String> = (0..hours)
            .map(|h| format!("2024-06-{:02}T{:02}:00", 1 + h / 24, h % 24))
            .collect();
        let day_times: Vec<String> = (0..days).map(|d| format!("2024-06-{:02}", d + 1)).collect();

        json!({
            "current": {
                "time": "2024-06-01T00:00",
                "interval": 900,
                "temperature_2m": 14.6,
                "relative_humidity_2m": 81,
                "apparent_temperature": 13.2,
                "precipitation": 0.4,
                "weathercode": code,
                "wind_speed_10m": 11.5,
                "is_day": is_day
            },
            "hourly": {
                "time": hour_times,
                "temperature_2m": (0..hours).map(|h| 10.0 + h as f64 * 0.5).collect::<Vec<_>>(),
                "weathercode": vec![code; hours]
            },
            "daily": {
                "time": day_times,
                "temperature_2m_max": (0..days).map(|d| 18.0 + d as f64).collect::<Vec<_>>(),
                "weathercode": vec![code; days]
            }
        })
    }

    fn provider_for(server: &MockServer) -> OpenMeteoProvider {
        OpenMeteoProvider::new(Client::new(), &Endpoints::rooted_at(&server.uri()))
    }

    #[tokio::test]
    async fn forecast_sends_unit_params_and_parses_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("temperature_unit", "fahrenheit"))
            .and(query_param("wind_speed_unit", "mph"))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(61, 0, 24, 7)))
            .expect(1)
            .mount(&server)
            .await;

        let snapshot = provider_for(&server)
            .forecast(Coordinates::new(52.52, 13.405), UnitPreference::Fahrenheit)
            .await
            .expect("forecast");

        assert_eq!(snapshot.current.weather_code, 61);
        assert!(!snapshot.current.is_day);
        assert_eq!(snapshot.current.humidity, 81.0);
        assert_eq!(snapshot.hourly.len(), 24);
        assert_eq!(snapshot.daily.len(), 7);
        assert_eq!(snapshot.hourly[13].time.format("%H:%M").to_string(), "13:00");
    }

    #[tokio::test]
    async fn forecast_drops_null_entries() {
        let server = MockServer::start().await;
        let mut body = forecast_body(3, 1, 3, 2);
        body["hourly"]["temperature_2m"][1] = Value::Null;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let snapshot = provider_for(&server)
            .forecast(Coordinates::new(0.0, 0.0), UnitPreference::Celsius)
            .await
            .expect("forecast");

        assert_eq!(snapshot.hourly.len(), 2);
        assert_eq!(snapshot.daily.len(), 2);
    }

    #[tokio::test]
    async fn forecast_status_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_string("{\"reason\":\"bad\"}"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .forecast(Coordinates::new(0.0, 0.0), UnitPreference::Celsius)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn malformed_forecast_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .forecast(Coordinates::new(0.0, 0.0), UnitPreference::Celsius)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn air_quality_tolerates_missing_current() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/air-quality"))
            .and(query_param("current", "us_aqi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "latitude": 1.0 })))
            .mount(&server)
            .await;

        let air = provider_for(&server)
            .air_quality(Coordinates::new(1.0, 2.0))
            .await
            .expect("air quality");

        assert_eq!(air, AirQuality { us_aqi: None });
    }

    #[tokio::test]
    async fn air_quality_reads_us_aqi() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/air-quality"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "current": { "us_aqi": 57 } })),
            )
            .mount(&server)
            .await;

        let air = provider_for(&server)
            .air_quality(Coordinates::new(1.0, 2.0))
            .await
            .expect("air quality");

        assert_eq!(air.us_aqi, Some(57));
    }

    #[tokio::test]
    async fn search_caps_results_and_handles_no_matches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Pa"))
            .and(query_param("count", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    { "name": "Paris", "latitude": 48.85, "longitude": 2.35, "country": "France" },
                    { "name": "Pamplona", "latitude": 42.81, "longitude": -1.64 }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Zzxq"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "generationtime_ms": 0.2 })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let places = provider.search("Pa", 5).await.expect("search");
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].label(), "Paris, France");
        assert_eq!(places[1].country, None);

        let none = provider.search("Zzxq", 5).await.expect("search");
        assert!(none.is_empty());
    }

    #[test]
    fn air_quality_params_ignore_unit() {
        let params = air_quality_params(Coordinates::new(1.5, -2.25));
        assert!(params.contains(&("latitude", "1.5".to_string())));
        assert!(params.contains(&("longitude", "-2.25".to_string())));
        assert!(!params.iter().any(|(k, _)| k.contains("unit")));
    }
}
