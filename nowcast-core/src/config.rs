use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::model::{Coordinates, UnitPreference};

/// How the dashboard finds the user's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    /// IP-based lookup over HTTP.
    #[default]
    Network,
    /// Use the configured latitude/longitude.
    Fixed,
    /// Location access disabled by the user.
    Off,
}

impl LocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationMode::Network => "network",
            LocationMode::Fixed => "fixed",
            LocationMode::Off => "off",
        }
    }

    pub const fn all() -> &'static [LocationMode] {
        &[LocationMode::Network, LocationMode::Fixed, LocationMode::Off]
    }
}

impl std::fmt::Display for LocationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub mode: LocationMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub timeout_secs: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            mode: LocationMode::default(),
            latitude: None,
            longitude: None,
            timeout_secs: 10,
        }
    }
}

impl LocationConfig {
    /// Fixed coordinates, if both halves are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Base URLs of every remote service. Overridable for testing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub forecast: String,
    pub air_quality: String,
    pub geocoding: String,
    pub reverse: String,
    pub network_location: String,
    /// Client identifier sent to the reverse geocoder.
    pub user_agent: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            forecast: "https://api.open-meteo.com/v1/forecast".into(),
            air_quality: "https://air-quality-api.open-meteo.com/v1/air-quality".into(),
            geocoding: "https://geocoding-api.open-meteo.com/v1/search".into(),
            reverse: "https://nominatim.openstreetmap.org/reverse".into(),
            network_location: "https://ipapi.co/json/".into(),
            user_agent: "weather-now-app".into(),
        }
    }
}

impl Endpoints {
    /// Every endpoint rooted at `base`, e.g. a local mock server.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            forecast: format!("{base}/v1/forecast"),
            air_quality: format!("{base}/v1/air-quality"),
            geocoding: format!("{base}/v1/search"),
            reverse: format!("{base}/reverse"),
            network_location: format!("{base}/json/"),
            user_agent: Endpoints::default().user_agent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub particles: usize,
    pub frame_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self { particles: 120, frame_ms: 33 }
    }
}

impl AnimationConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// unit = "fahrenheit"
///
/// [location]
/// mode = "fixed"
/// latitude = 52.52
/// longitude = 13.405
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub unit: UnitPreference,
    pub location: LocationConfig,
    pub endpoints: Endpoints,
    pub animation: AnimationConfig,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "nowcast", "nowcast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the dashboard's log file.
    pub fn log_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.cache_dir().join("nowcast.log"))
    }

    /// Pin the location to fixed coordinates.
    pub fn set_fixed_location(&mut self, coords: Coordinates) {
        self.location.mode = LocationMode::Fixed;
        self.location.latitude = Some(coords.latitude);
        self.location.longitude = Some(coords.longitude);
    }
}
