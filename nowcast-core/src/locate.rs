//! Where is the user? One-shot position lookup with a hard timeout.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::{
    config::{Config, LocationMode},
    error::{FetchError, LocationError},
    model::Coordinates,
    provider::get_json,
};

#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

/// Coordinates known up front (config file or command line).
#[derive(Debug, Clone, Default)]
pub struct FixedLocation(pub Option<Coordinates>);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        self.0.ok_or(LocationError::Unsupported)
    }
}

/// The user turned location access off.
#[derive(Debug, Clone, Default)]
pub struct DeniedLocation;

#[async_trait]
impl LocationProvider for DeniedLocation {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// Approximate position from the public IP address.
#[derive(Debug, Clone)]
pub struct NetworkLocation {
    http: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl NetworkLocation {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[async_trait]
impl LocationProvider for NetworkLocation {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let parsed: IpLookupResponse = get_json(&self.http, &self.url, &[] as &[(&str, &str)])
            .await
            .map_err(|e| match e {
                FetchError::Status { status: 401 | 403, .. } => LocationError::PermissionDenied,
                other => LocationError::Unavailable(other.to_string()),
            })?;

        match (parsed.latitude, parsed.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates::new(latitude, longitude)),
            _ => Err(LocationError::Unavailable(
                "lookup response carried no coordinates".into(),
            )),
        }
    }
}

/// Run one position request, giving up after `timeout`.
pub async fn locate_within(
    provider: &dyn LocationProvider,
    timeout: Duration,
) -> Result<Coordinates, LocationError> {
    match tokio::time::timeout(timeout, provider.locate()).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Location request exceeded {timeout:?}");
            Err(LocationError::Timeout)
        }
    }
}

/// Construct the location provider selected in the config.
pub fn location_from_config(config: &Config) -> anyhow::Result<Arc<dyn LocationProvider>> {
    let provider: Arc<dyn LocationProvider> = match config.location.mode {
        LocationMode::Fixed => Arc::new(FixedLocation(config.location.coordinates())),
        LocationMode::Off => Arc::new(DeniedLocation),
        LocationMode::Network => {
            let http = Client::builder()
                .user_agent(config.endpoints.user_agent.as_str())
                .build()?;
            Arc::new(NetworkLocation::new(http, config.endpoints.network_location.clone()))
        }
    };

    Ok(provider)
}
