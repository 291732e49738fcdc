//! Test doubles shared by the unit tests of several modules.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::{
    chart::TemperatureChart,
    error::FetchError,
    icon::Classification,
    model::{
        AirQuality, Coordinates, CurrentConditions, DailyPoint, HourlyPoint, Place,
        UnitPreference, WeatherReport, WeatherSnapshot,
    },
    provider::{PlaceProvider, WeatherProvider},
    view::{ChartId, DailyCard, Element, HourlyRow, Surface},
};

/// Report with fixed current values, `hours` hourly points starting at
/// 2024-06-01 00:00 and `days` daily points starting at 2024-06-01.
pub fn report(code: i32, is_day: bool, hours: usize, days: usize) -> WeatherReport {
    let start = NaiveDate::from_ymd_opt(2024, 6, 1).expect("date");
    let midnight: NaiveDateTime = start.and_hms_opt(0, 0, 0).expect("time");

    WeatherReport {
        snapshot: WeatherSnapshot {
            current: CurrentConditions {
                temperature: 14.6,
                feels_like: 13.2,
                humidity: 81.0,
                wind_speed: 11.5,
                precipitation: 0.4,
                weather_code: code,
                is_day,
            },
            hourly: (0..hours)
                .map(|h| HourlyPoint {
                    time: midnight + chrono::Duration::hours(h as i64),
                    temperature: 10.0 + h as f64 * 0.5,
                    weather_code: code,
                })
                .collect(),
            daily: (0..days)
                .map(|d| DailyPoint {
                    date: start + chrono::Duration::days(d as i64),
                    max_temperature: 18.0 + d as f64,
                    weather_code: code,
                })
                .collect(),
        },
        air: AirQuality::default(),
    }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub texts: HashMap<Element, String>,
    pub text_writes: Vec<Element>,
    pub images: HashMap<Element, String>,
    pub classification: Option<Classification>,
    pub hourly: Vec<HourlyRow>,
    pub daily: Vec<DailyCard>,
    pub suggestions: Vec<String>,
    pub charts: HashMap<ChartId, TemperatureChart>,
    pub destroyed: Vec<ChartId>,
    next_chart: u64,
}

impl RecordingSurface {
    pub fn text(&self, element: Element) -> Option<&str> {
        self.texts.get(&element).map(String::as_str)
    }

    pub fn writes_to(&self, element: Element) -> usize {
        self.text_writes.iter().filter(|e| **e == element).count()
    }
}

impl Surface for RecordingSurface {
    fn set_text(&mut self, element: Element, text: &str) {
        self.text_writes.push(element);
        self.texts.insert(element, text.to_string());
    }

    fn set_image(&mut self, element: Element, asset: &str) {
        self.images.insert(element, asset.to_string());
    }

    fn set_classification(&mut self, classification: Classification) {
        self.classification = Some(classification);
    }

    fn replace_hourly(&mut self, rows: &[HourlyRow]) {
        self.hourly = rows.to_vec();
    }

    fn replace_daily(&mut self, cards: &[DailyCard]) {
        self.daily = cards.to_vec();
    }

    fn replace_suggestions(&mut self, labels: &[String]) {
        self.suggestions = labels.to_vec();
    }

    fn create_chart(&mut self, chart: &TemperatureChart) -> ChartId {
        self.next_chart += 1;
        let id = ChartId(self.next_chart);
        self.charts.insert(id, chart.clone());
        id
    }

    fn destroy_chart(&mut self, id: ChartId) {
        self.charts.remove(&id);
        self.destroyed.push(id);
    }
}

fn unavailable() -> FetchError {
    FetchError::Status { status: 503, body: "unavailable".into() }
}

#[derive(Debug, Default)]
pub struct StubWeather {
    code: i32,
    is_day: bool,
    aqi: Option<i32>,
    fail_forecast: bool,
    fail_air: bool,
    calls: Mutex<Vec<(Coordinates, UnitPreference)>>,
}

impl StubWeather {
    pub fn ok(code: i32, is_day: bool) -> Self {
        Self { code, is_day, ..Self::default() }
    }

    pub fn failing() -> Self {
        Self { fail_forecast: true, ..Self::default() }
    }

    pub fn failing_air(mut self) -> Self {
        self.fail_air = true;
        self
    }

    pub fn with_aqi(mut self, aqi: Option<i32>) -> Self {
        self.aqi = aqi;
        self
    }

    pub fn forecast_calls(&self) -> Vec<(Coordinates, UnitPreference)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn forecast(
        &self,
        coords: Coordinates,
        unit: UnitPreference,
    ) -> Result<WeatherSnapshot, FetchError> {
        self.calls.lock().push((coords, unit));
        if self.fail_forecast {
            return Err(unavailable());
        }
        Ok(report(self.code, self.is_day, 24, 7).snapshot)
    }

    async fn air_quality(&self, _coords: Coordinates) -> Result<AirQuality, FetchError> {
        if self.fail_air {
            return Err(unavailable());
        }
        Ok(AirQuality { us_aqi: self.aqi })
    }
}

#[derive(Debug, Default)]
pub struct StubPlaces {
    label: Option<String>,
    matches: Vec<Place>,
    fail: bool,
    searches: Mutex<Vec<String>>,
}

impl StubPlaces {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_matches(mut self, names: &[&str]) -> Self {
        self.matches = names
            .iter()
            .enumerate()
            .map(|(i, name)| Place {
                name: name.to_string(),
                country: Some("France".into()),
                latitude: 48.0 + i as f64,
                longitude: 2.0,
            })
            .collect();
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().clone()
    }
}

#[async_trait]
impl PlaceProvider for StubPlaces {
    async fn reverse(&self, _coords: Coordinates) -> Result<Option<String>, FetchError> {
        if self.fail {
            return Err(unavailable());
        }
        Ok(self.label.clone())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, FetchError> {
        self.searches.lock().push(query.to_string());
        if self.fail {
            return Err(unavailable());
        }
        Ok(self.matches.iter().take(limit).cloned().collect())
    }
}
