//! Projection of a weather report onto the display surface.

use chrono::NaiveDate;

use crate::{
    chart::TemperatureChart,
    icon::{Classification, WeatherIcon, icon_for},
    model::{UnitPreference, WeatherReport},
};

pub const HOURLY_ROWS: usize = 12;
pub const DAILY_CARDS: usize = 7;

/// Named text and image elements of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    Location,
    Date,
    Temperature,
    FeelsLike,
    Humidity,
    Wind,
    Precipitation,
    Aqi,
    WeatherIcon,
    UnitToggle,
    SearchInput,
    Status,
}

/// Identifies a chart drawn on a surface until it is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartId(pub u64);

/// The external rendering target. The core only ever writes to it.
pub trait Surface {
    fn set_text(&mut self, element: Element, text: &str);
    fn set_image(&mut self, element: Element, asset: &str);
    fn set_classification(&mut self, classification: Classification);
    /// Replace the whole hourly table.
    fn replace_hourly(&mut self, rows: &[HourlyRow]);
    /// Replace the whole daily list.
    fn replace_daily(&mut self, cards: &[DailyCard]);
    /// Replace the suggestion rows under the search input.
    fn replace_suggestions(&mut self, labels: &[String]);
    fn create_chart(&mut self, chart: &TemperatureChart) -> ChartId;
    fn destroy_chart(&mut self, id: ChartId);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyRow {
    pub time: String,
    pub icon: WeatherIcon,
    pub temperature: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCard {
    pub date: String,
    pub icon: WeatherIcon,
    pub temperature: String,
}

/// Everything the renderer writes for one report.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub date: String,
    pub temperature: String,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub precipitation: String,
    pub aqi: Option<String>,
    pub icon: WeatherIcon,
    pub classification: Classification,
    pub hourly: Vec<HourlyRow>,
    pub daily: Vec<DailyCard>,
    pub chart: TemperatureChart,
}

/// Round half up, like the dashboard always has (-2.5 becomes -2).
pub fn round_display(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn degrees(value: f64) -> String {
    format!("{}°", round_display(value))
}

pub fn aqi_label(aqi: i32) -> &'static str {
    match aqi {
        i32::MIN..=50 => "Good",
        51..=100 => "Moderate",
        101..=150 => "Unhealthy",
        _ => "Poor",
    }
}

impl DashboardView {
    pub fn project(report: &WeatherReport, unit: UnitPreference, today: NaiveDate) -> Self {
        let current = &report.snapshot.current;

        let hourly = report
            .snapshot
            .hourly
            .iter()
            .take(HOURLY_ROWS)
            .map(|h| HourlyRow {
                time: h.time.format("%H:%M").to_string(),
                icon: icon_for(h.weather_code),
                temperature: degrees(h.temperature),
            })
            .collect();

        let daily = report
            .snapshot
            .daily
            .iter()
            .take(DAILY_CARDS)
            .map(|d| DailyCard {
                date: d.date.format("%m-%d").to_string(),
                icon: icon_for(d.weather_code),
                temperature: degrees(d.max_temperature),
            })
            .collect();

        Self {
            date: today.format("%a %b %d %Y").to_string(),
            temperature: degrees(current.temperature),
            feels_like: degrees(current.feels_like),
            humidity: format!("{}%", current.humidity),
            wind: format!("{}{}", round_display(current.wind_speed), unit.wind_suffix()),
            precipitation: format!("{} mm", current.precipitation),
            aqi: report
                .air
                .us_aqi
                .map(|aqi| format!("AQI {aqi} ({})", aqi_label(aqi))),
            icon: icon_for(current.weather_code),
            classification: Classification::new(current.weather_code, current.is_day),
            hourly,
            daily,
            chart: TemperatureChart::from_hourly(&report.snapshot.hourly),
        }
    }

    /// Write the view to `surface`. The AQI element is left as it was when
    /// the report carried no AQI value. The chart is drawn separately.
    pub fn apply_to<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.set_text(Element::Date, &self.date);
        surface.set_text(Element::Temperature, &self.temperature);
        surface.set_text(Element::FeelsLike, &self.feels_like);
        surface.set_text(Element::Humidity, &self.humidity);
        surface.set_text(Element::Wind, &self.wind);
        surface.set_text(Element::Precipitation, &self.precipitation);

        if let Some(aqi) = &self.aqi {
            surface.set_text(Element::Aqi, aqi);
        }

        surface.set_image(Element::WeatherIcon, &self.icon.asset_path());
        surface.set_classification(self.classification);
        surface.replace_hourly(&self.hourly);
        surface.replace_daily(&self.daily);
    }
}
