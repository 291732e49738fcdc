use crate::{
    Config,
    error::FetchError,
    model::{AirQuality, Coordinates, Place, UnitPreference, WeatherSnapshot},
    provider::{nominatim::NominatimProvider, openmeteo::OpenMeteoProvider},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use std::{fmt::Debug, sync::Arc};

pub mod nominatim;
pub mod openmeteo;

/// Source of forecast and air-quality data.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn forecast(
        &self,
        coords: Coordinates,
        unit: UnitPreference,
    ) -> Result<WeatherSnapshot, FetchError>;

    async fn air_quality(&self, coords: Coordinates) -> Result<AirQuality, FetchError>;
}

/// Forward and reverse geocoding.
#[async_trait]
pub trait PlaceProvider: Send + Sync + Debug {
    /// Display name for coordinates, `None` when the service knows no
    /// suitable place field.
    async fn reverse(&self, coords: Coordinates) -> Result<Option<String>, FetchError>;

    /// Up to `limit` places matching a free-text query.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, FetchError>;
}

/// Geocoding split across two services: Open-Meteo answers searches,
/// Nominatim answers reverse lookups.
#[derive(Debug, Clone)]
pub struct SplitPlaces {
    search: OpenMeteoProvider,
    reverse: NominatimProvider,
}

impl SplitPlaces {
    pub fn new(search: OpenMeteoProvider, reverse: NominatimProvider) -> Self {
        Self { search, reverse }
    }
}

#[async_trait]
impl PlaceProvider for SplitPlaces {
    async fn reverse(&self, coords: Coordinates) -> Result<Option<String>, FetchError> {
        self.reverse.reverse(coords).await
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, FetchError> {
        self.search.search(query, limit).await
    }
}

/// Construct the weather and place providers described by the config.
pub fn providers_from_config(
    config: &Config,
) -> anyhow::Result<(Arc<dyn WeatherProvider>, Arc<dyn PlaceProvider>)> {
    let http = Client::builder()
        .user_agent(config.endpoints.user_agent.as_str())
        .build()?;

    let meteo = OpenMeteoProvider::new(http.clone(), &config.endpoints);
    let nominatim = NominatimProvider::new(http, &config.endpoints);

    Ok((
        Arc::new(meteo.clone()),
        Arc::new(SplitPlaces::new(meteo, nominatim)),
    ))
}

/// GET `url` with `query` and decode a JSON body, mapping non-success
/// statuses to [`FetchError::Status`].
pub(crate) async fn get_json<T, Q>(http: &Client, url: &str, query: &Q) -> Result<T, FetchError>
where
    T: DeserializeOwned,
    Q: Serialize + Sync + ?Sized,
{
    let res = http.get(url).query(query).send().await?;

    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            body: truncate_body(&body),
        });
    }

    Ok(serde_json::from_str(&body)?)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
