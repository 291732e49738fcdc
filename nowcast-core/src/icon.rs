//! Weather code classification.
//!
//! Two independent tables are applied to the provider's WMO weather code:
//! a fine-grained icon table and a coarse category table that drives the
//! background styling and the particle animation. The tables disagree on
//! purpose (code 55 shows a drizzle icon but animates as "cloudy").

use serde::{Deserialize, Serialize};

const ASSET_DIR: &str = "assets/images";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherIcon {
    Sunny,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Storm,
}

impl WeatherIcon {
    pub const fn all() -> &'static [WeatherIcon] {
        &[
            WeatherIcon::Sunny,
            WeatherIcon::PartlyCloudy,
            WeatherIcon::Overcast,
            WeatherIcon::Fog,
            WeatherIcon::Drizzle,
            WeatherIcon::Rain,
            WeatherIcon::Snow,
            WeatherIcon::Storm,
        ]
    }

    pub fn file_name(self) -> &'static str {
        match self {
            WeatherIcon::Sunny => "icon-sunny.webp",
            WeatherIcon::PartlyCloudy => "icon-partly-cloudy.webp",
            WeatherIcon::Overcast => "icon-overcast.webp",
            WeatherIcon::Fog => "icon-fog.webp",
            WeatherIcon::Drizzle => "icon-drizzle.webp",
            WeatherIcon::Rain => "icon-rain.webp",
            WeatherIcon::Snow => "icon-snow.webp",
            WeatherIcon::Storm => "icon-storm.webp",
        }
    }

    /// Path of the image asset relative to the asset root.
    pub fn asset_path(self) -> String {
        format!("{ASSET_DIR}/{}", self.file_name())
    }

    /// Single-cell stand-in for the image on text surfaces.
    pub fn glyph(self) -> &'static str {
        match self {
            WeatherIcon::Sunny => "☀",
            WeatherIcon::PartlyCloudy => "⛅",
            WeatherIcon::Overcast => "☁",
            WeatherIcon::Fog => "🌫",
            WeatherIcon::Drizzle => "🌦",
            WeatherIcon::Rain => "🌧",
            WeatherIcon::Snow => "❄",
            WeatherIcon::Storm => "⛈",
        }
    }

    /// Reverse lookup from an asset path or file name.
    pub fn from_asset(asset: &str) -> Option<Self> {
        let file = asset.rsplit('/').next().unwrap_or(asset);
        Self::all().iter().copied().find(|icon| icon.file_name() == file)
    }
}

/// Icon for a weather code. Thresholds are checked in order.
pub fn icon_for(code: i32) -> WeatherIcon {
    match code {
        0 => WeatherIcon::Sunny,
        1..=2 => WeatherIcon::PartlyCloudy,
        3..=45 => WeatherIcon::Overcast,
        46..=48 => WeatherIcon::Fog,
        49..=55 => WeatherIcon::Drizzle,
        56..=65 => WeatherIcon::Rain,
        66..=75 => WeatherIcon::Snow,
        76..=86 => WeatherIcon::Snow,
        95.. => WeatherIcon::Storm,
        _ => WeatherIcon::Overcast,
    }
}

/// Coarse weather category used for styling and animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCategory {
    #[default]
    Sunny,
    Cloudy,
    Rain,
}

impl WeatherCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            WeatherCategory::Sunny => "sunny",
            WeatherCategory::Cloudy => "cloudy",
            WeatherCategory::Rain => "rain",
        }
    }
}

impl std::fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn category_for(code: i32) -> WeatherCategory {
    if code < 3 {
        WeatherCategory::Sunny
    } else if code < 60 {
        WeatherCategory::Cloudy
    } else {
        WeatherCategory::Rain
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Daylight {
    Day,
    Night,
}

impl Daylight {
    pub fn from_is_day(is_day: bool) -> Self {
        if is_day { Daylight::Day } else { Daylight::Night }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Daylight::Day => "day",
            Daylight::Night => "night",
        }
    }
}

/// Category plus time of day, e.g. `rain night`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classification {
    pub category: WeatherCategory,
    pub daylight: Daylight,
}

impl Classification {
    pub fn new(code: i32, is_day: bool) -> Self {
        Self {
            category: category_for(code),
            daylight: Daylight::from_is_day(is_day),
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.category.as_str(), self.daylight.as_str())
    }
}
