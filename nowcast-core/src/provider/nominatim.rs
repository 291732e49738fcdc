//! Reverse geocoding through Nominatim (OpenStreetMap). Free, no API key,
//! but every request must carry an identifying `User-Agent`.

use reqwest::Client;
use serde::Deserialize;

use crate::{config::Endpoints, error::FetchError, model::Coordinates, provider::get_json};

#[derive(Debug, Clone)]
pub struct NominatimProvider {
    http: Client,
    reverse_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    /// "City, Country" from the first present of city, town, village, county.
    /// Both halves are required.
    fn label(self) -> Option<String> {
        let place = self
            .city
            .or(self.town)
            .or(self.village)
            .or(self.county)
            .filter(|p| !p.is_empty())?;
        let country = self.country.filter(|c| !c.is_empty())?;

        Some(format!("{place}, {country}"))
    }
}

impl NominatimProvider {
    pub fn new(http: Client, endpoints: &Endpoints) -> Self {
        Self { http, reverse_url: endpoints.reverse.clone() }
    }

    pub async fn reverse(&self, coords: Coordinates) -> Result<Option<String>, FetchError> {
        let parsed: NominatimResponse = get_json(
            &self.http,
            &self.reverse_url,
            &[
                ("format", "json".to_string()),
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ],
        )
        .await?;

        Ok(parsed.address.and_then(NominatimAddress::label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geocode::{FALLBACK_LABEL, resolve_label},
        provider::{SplitPlaces, openmeteo::OpenMeteoProvider},
    };
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    fn address(json: serde_json::Value) -> NominatimAddress {
        serde_json::from_value(json).expect("address")
    }

    #[test]
    fn label_prefers_city_over_town() {
        let a = address(json!({ "city": "Berlin", "town": "Mitte", "country": "Germany" }));
        assert_eq!(a.label().as_deref(), Some("Berlin, Germany"));
    }

    #[test]
    fn label_falls_through_to_county() {
        let a = address(json!({ "county": "Kerry", "country": "Ireland" }));
        assert_eq!(a.label().as_deref(), Some("Kerry, Ireland"));
    }

    #[test]
    fn label_is_none_without_place_fields() {
        let a = address(json!({ "state": "Bavaria", "country": "Germany" }));
        assert_eq!(a.label(), None);
    }

    #[test]
    fn label_is_none_without_country() {
        assert_eq!(address(json!({ "city": "Berlin" })).label(), None);
        assert_eq!(address(json!({ "town": "Mitte", "country": "" })).label(), None);
    }

    #[tokio::test]
    async fn missing_country_resolves_to_fallback_label() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "address": { "city": "Berlin" } })),
            )
            .mount(&server)
            .await;

        let endpoints = Endpoints::rooted_at(&server.uri());
        let places = SplitPlaces::new(
            OpenMeteoProvider::new(Client::new(), &endpoints),
            NominatimProvider::new(Client::new(), &endpoints),
        );

        let label = resolve_label(&places, Coordinates::new(52.52, 13.405)).await;
        assert_eq!(label, FALLBACK_LABEL);
    }

    #[tokio::test]
    async fn reverse_sends_user_agent_and_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("format", "json"))
            .and(query_param("lat", "52.52"))
            .and(query_param("lon", "13.405"))
            .and(header("user-agent", "weather-now-app"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "address": { "city": "Berlin", "country": "Germany" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let http = Client::builder().user_agent("weather-now-app").build().expect("client");
        let provider = NominatimProvider::new(http, &Endpoints::rooted_at(&server.uri()));

        let label = provider.reverse(Coordinates::new(52.52, 13.405)).await.expect("reverse");
        assert_eq!(label.as_deref(), Some("Berlin, Germany"));
    }

    #[tokio::test]
    async fn reverse_without_address_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "Unable to geocode" })))
            .mount(&server)
            .await;

        let provider = NominatimProvider::new(Client::new(), &Endpoints::rooted_at(&server.uri()));
        let label = provider.reverse(Coordinates::new(0.0, 0.0)).await.expect("reverse");
        assert_eq!(label, None);
    }
}
