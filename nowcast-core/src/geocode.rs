//! Failure-tolerant wrappers around [`PlaceProvider`]: these never error,
//! they fall back to something displayable.

use crate::{
    model::{Coordinates, Place},
    provider::PlaceProvider,
    search::MAX_SUGGESTIONS,
};

pub const FALLBACK_LABEL: &str = "Your location";

/// "City, Country" for coordinates, or [`FALLBACK_LABEL`] on any failure.
pub async fn resolve_label(places: &dyn PlaceProvider, coords: Coordinates) -> String {
    match places.reverse(coords).await {
        Ok(Some(label)) => {
            tracing::info!("Reverse geocoded {coords} to {label}");
            label
        }
        Ok(None) => {
            tracing::debug!("No place name for {coords}");
            FALLBACK_LABEL.to_string()
        }
        Err(e) => {
            tracing::debug!("Reverse geocode failed for {coords}: {e}");
            FALLBACK_LABEL.to_string()
        }
    }
}

/// Up to five matches for `query`; empty on failure.
pub async fn suggest(places: &dyn PlaceProvider, query: &str) -> Vec<Place> {
    match places.search(query, MAX_SUGGESTIONS).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!("Place search for {query:?} failed: {e}");
            Vec::new()
        }
    }
}
