//! Google Geocoding API backend (primary, keyed).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use revloc_core::{AddressComponents, Coordinates, GeocodeResult, GeocodeSource};
use serde::Deserialize;

use crate::error::GeoError;
use crate::provider::{non_blank, normalise_base_url, Geocoder};

const PROVIDER: &str = "google_maps";

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleResult {
    geometry: GoogleGeometry,
    #[serde(default)]
    formatted_address: String,
    #[serde(default)]
    place_id: Option<String>,
    #[serde(default)]
    address_components: Vec<GoogleComponent>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLocation,
}

#[derive(Debug, Deserialize)]
struct GoogleLocation {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GoogleComponent {
    #[serde(default)]
    long_name: String,
    #[serde(default)]
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}

/// Client for the Google Geocoding `json` endpoint.
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    endpoint: Url,
}

impl GoogleGeocoder {
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`GeoError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        api_key: &str,
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let endpoint =
            normalise_base_url(base_url)?
                .join("json")
                .map_err(|e| GeoError::InvalidBaseUrl {
                    url: base_url.to_string(),
                    reason: e.to_string(),
                })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
        })
    }

    fn build_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("address", query)
            .append_pair("key", &self.api_key)
            .append_pair("region", "br");
        url
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    fn source(&self) -> GeocodeSource {
        GeocodeSource::GoogleMaps
    }

    async fn geocode(&self, query: &str) -> Result<Option<GeocodeResult>, GeoError> {
        let response = self.client.get(self.build_url(query)).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeoError::RateLimited { provider: PROVIDER });
        }
        if !status.is_success() {
            return Err(GeoError::Provider {
                provider: PROVIDER,
                status: status.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: GoogleResponse =
            serde_json::from_str(&body).map_err(|e| GeoError::Deserialize {
                context: format!("google geocode({query})"),
                source: e,
            })?;

        match parsed.status.as_str() {
            "OK" => Ok(parsed.results.into_iter().next().map(into_result)),
            "ZERO_RESULTS" => Ok(None),
            "OVER_QUERY_LIMIT" => Err(GeoError::RateLimited { provider: PROVIDER }),
            other => Err(GeoError::Provider {
                provider: PROVIDER,
                status: match parsed.error_message {
                    Some(msg) => format!("{other}: {msg}"),
                    None => other.to_string(),
                },
            }),
        }
    }
}

fn into_result(result: GoogleResult) -> GeocodeResult {
    GeocodeResult {
        coordinates: Coordinates::new(result.geometry.location.lat, result.geometry.location.lng),
        components: parse_components(&result.address_components),
        formatted_address: result.formatted_address,
        source: GeocodeSource::GoogleMaps,
        place_id: non_blank(result.place_id.as_deref()),
    }
}

fn parse_components(components: &[GoogleComponent]) -> AddressComponents {
    let mut parsed = AddressComponents::default();
    for component in components {
        let has = |t: &str| component.types.iter().any(|ty| ty == t);
        let long = non_blank(Some(&component.long_name));

        if has("street_number") {
            parsed.number = long;
        } else if has("route") {
            parsed.street = long;
        } else if has("sublocality") || has("sublocality_level_1") || has("neighborhood") {
            parsed.neighborhood = parsed.neighborhood.or(long);
        } else if has("locality") || has("administrative_area_level_2") {
            parsed.city = parsed.city.or(long);
        } else if has("administrative_area_level_1") {
            parsed.state = non_blank(Some(&component.short_name)).or(long);
        } else if has("postal_code") {
            parsed.postal_code = long;
        } else if has("country") {
            parsed.country = long;
        }
    }
    parsed
}
