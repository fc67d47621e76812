//! Nominatim (`OpenStreetMap`) backend: secondary, unauthenticated.
//!
//! The public instance allows roughly one request per second, so every
//! instance spaces its own requests by `min_interval`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use revloc_core::{AddressComponents, Coordinates, GeocodeResult, GeocodeSource};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::GeoError;
use crate::provider::{non_blank, normalise_base_url, Geocoder};

const PROVIDER: &str = "openstreetmap";

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    place_id: Option<serde_json::Value>,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    house_number: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

pub struct NominatimGeocoder {
    client: Client,
    endpoint: Url,
    min_interval: Duration,
    rate_limit_backoff: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`GeoError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        min_interval: Duration,
        rate_limit_backoff: Duration,
    ) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let endpoint =
            normalise_base_url(base_url)?
                .join("search")
                .map_err(|e| GeoError::InvalidBaseUrl {
                    url: base_url.to_string(),
                    reason: e.to_string(),
                })?;

        Ok(Self {
            client,
            endpoint,
            min_interval,
            rate_limit_backoff,
            last_request: Mutex::new(None),
        })
    }

    fn build_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("limit", "1")
            .append_pair("countrycodes", "br")
            .append_pair("addressdetails", "1");
        url
    }

    /// Wait until at least `min_interval` has passed since the previous call.
    ///
    /// The lock is held across the sleep so concurrent callers queue up.
    async fn wait_for_request_slot(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval.saturating_sub(elapsed)).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn source(&self) -> GeocodeSource {
        GeocodeSource::OpenStreetMap
    }

    async fn geocode(&self, query: &str) -> Result<Option<GeocodeResult>, GeoError> {
        self.wait_for_request_slot().await;

        let response = self.client.get(self.build_url(query)).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            tokio::time::sleep(self.rate_limit_backoff).await;
            return Err(GeoError::RateLimited { provider: PROVIDER });
        }
        if !status.is_success() {
            return Err(GeoError::Provider {
                provider: PROVIDER,
                status: status.to_string(),
            });
        }

        let body = response.text().await?;
        let places: Vec<NominatimPlace> =
            serde_json::from_str(&body).map_err(|e| GeoError::Deserialize {
                context: format!("nominatim search({query})"),
                source: e,
            })?;

        places.into_iter().next().map(into_result).transpose()
    }
}

fn into_result(place: NominatimPlace) -> Result<GeocodeResult, GeoError> {
    let parse = |raw: &str| -> Result<f64, GeoError> {
        raw.trim()
            .parse::<f64>()
            .map_err(|_| GeoError::InvalidCoordinate {
                provider: PROVIDER,
                value: raw.to_string(),
            })
    };
    let coordinates = Coordinates::new(parse(&place.lat)?, parse(&place.lon)?);

    let address = place.address;
    let components = AddressComponents {
        street: non_blank(address.road.as_deref()),
        number: non_blank(address.house_number.as_deref()),
        neighborhood: non_blank(address.suburb.as_deref()),
        city: non_blank(address.city.as_deref())
            .or_else(|| non_blank(address.town.as_deref()))
            .or_else(|| non_blank(address.village.as_deref())),
        state: non_blank(address.state.as_deref()),
        postal_code: non_blank(address.postcode.as_deref()),
        country: non_blank(address.country.as_deref()),
    };

    let place_id = place.place_id.map(|v| match v {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    });

    Ok(GeocodeResult {
        coordinates,
        components,
        formatted_address: place.display_name,
        source: GeocodeSource::OpenStreetMap,
        place_id,
    })
}
