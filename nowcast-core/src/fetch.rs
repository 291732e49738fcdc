use crate::{
    error::FetchError,
    model::{Coordinates, UnitPreference, WeatherReport},
    provider::WeatherProvider,
};

/// Fetch forecast and air quality concurrently. Both must succeed; the
/// first failure aborts the whole report.
pub async fn fetch_report(
    provider: &dyn WeatherProvider,
    coords: Coordinates,
    unit: UnitPreference,
) -> Result<WeatherReport, FetchError> {
    tracing::debug!("Fetching weather for {coords} in {}", unit.temperature_param());

    let (snapshot, air) =
        tokio::try_join!(provider.forecast(coords, unit), provider.air_quality(coords))?;

    tracing::info!(
        "Weather loaded for {coords}: code {}, {} hourly, {} daily",
        snapshot.current.weather_code,
        snapshot.hourly.len(),
        snapshot.daily.len()
    );

    Ok(WeatherReport { snapshot, air })
}
