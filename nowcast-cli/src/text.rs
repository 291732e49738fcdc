//! Plain-text surface for one-shot output.

use std::{collections::BTreeMap, fmt};

use nowcast_core::{
    Classification, Element, Surface, WeatherIcon,
    chart::TemperatureChart,
    view::{ChartId, DailyCard, HourlyRow},
};

#[derive(Debug, Default)]
pub struct TextSurface {
    texts: BTreeMap<Element, String>,
    icon: Option<WeatherIcon>,
    classification: Option<Classification>,
    hourly: Vec<HourlyRow>,
    daily: Vec<DailyCard>,
    chart: Option<TemperatureChart>,
}

impl TextSurface {
    fn text(&self, element: Element) -> &str {
        self.texts.get(&element).map(String::as_str).unwrap_or("")
    }
}

impl Surface for TextSurface {
    fn set_text(&mut self, element: Element, text: &str) {
        self.texts.insert(element, text.to_string());
    }

    fn set_image(&mut self, element: Element, asset: &str) {
        if element == Element::WeatherIcon {
            self.icon = WeatherIcon::from_asset(asset);
        }
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

    fn replace_suggestions(&mut self, _labels: &[String]) {}

    fn create_chart(&mut self, chart: &TemperatureChart) -> ChartId {
        self.chart = Some(chart.clone());
        ChartId(0)
    }

    fn destroy_chart(&mut self, _id: ChartId) {
        self.chart = None;
    }
}

impl fmt::Display for TextSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}  {}", self.text(Element::Location), self.text(Element::Date))?;

        let glyph = self.icon.map(WeatherIcon::glyph).unwrap_or(" ");
        let mood = self.classification.map(|c| c.to_string()).unwrap_or_default();
        writeln!(
            f,
            "{glyph} {}{}  ({mood})",
            self.text(Element::Temperature),
            self.text(Element::UnitToggle).trim_start_matches('°'),
        )?;
        writeln!(
            f,
            "Feels like {}  Humidity {}  Wind {}  Precipitation {}",
            self.text(Element::FeelsLike),
            self.text(Element::Humidity),
            self.text(Element::Wind),
            self.text(Element::Precipitation),
        )?;
        if let Some(aqi) = self.texts.get(&Element::Aqi) {
            writeln!(f, "{aqi}")?;
        }

        if !self.hourly.is_empty() {
            writeln!(f)?;
            writeln!(f, "Hourly")?;
            for row in &self.hourly {
                writeln!(f, "  {}  {}  {:>5}", row.time, row.icon.glyph(), row.temperature)?;
            }
        }

        if let Some((lo, hi)) = self.chart.as_ref().and_then(TemperatureChart::bounds) {
            writeln!(f, "  range {lo:.1} to {hi:.1}")?;
        }

        if !self.daily.is_empty() {
            writeln!(f)?;
            writeln!(f, "Daily")?;
            for card in &self.daily {
                writeln!(f, "  {}  {}  {:>5}", card.date, card.icon.glyph(), card.temperature)?;
            }
        }

        Ok(())
    }
}
