//! Two-tier geocoding gateway.
//!
//! Built once at startup and shared behind an `Arc`. A query goes to the
//! primary provider when one is configured, then to the secondary. Provider
//! errors, empty answers, and out-of-range coordinates all fall through; the
//! gateway itself never fails.

use std::sync::Arc;
use std::time::Duration;

use revloc_core::{AddressDescriptor, AppConfig, GeocodeResult, GeocodeSource};

use crate::error::GeoError;
use crate::google::GoogleGeocoder;
use crate::nominatim::NominatimGeocoder;
use crate::provider::Geocoder;

pub struct GeocodingGateway {
    primary: Option<Arc<dyn Geocoder>>,
    secondary: Arc<dyn Geocoder>,
}

impl GeocodingGateway {
    #[must_use]
    pub fn new(primary: Option<Arc<dyn Geocoder>>, secondary: Arc<dyn Geocoder>) -> Self {
        Self { primary, secondary }
    }

    /// Build the production gateway. The Google backend is only wired in when
    /// an API key is configured.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if either HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, GeoError> {
        let primary = match config.google_maps_api_key.as_deref() {
            Some(key) => Some(Arc::new(GoogleGeocoder::new(
                key,
                &config.google_base_url,
                config.http_timeout_secs,
                &config.user_agent,
            )?) as Arc<dyn Geocoder>),
            None => {
                tracing::info!("GOOGLE_MAPS_API_KEY not set; geocoding uses OpenStreetMap only");
                None
            }
        };

        let secondary = Arc::new(NominatimGeocoder::new(
            &config.nominatim_base_url,
            config.http_timeout_secs,
            &config.user_agent,
            Duration::from_millis(config.nominatim_min_interval_ms),
            Duration::from_millis(config.rate_limit_backoff_ms),
        )?);

        Ok(Self::new(primary, secondary))
    }

    #[must_use]
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Resolve an address descriptor to coordinates, or `None`.
    pub async fn resolve(&self, descriptor: &AddressDescriptor) -> Option<GeocodeResult> {
        if descriptor.is_empty() {
            return None;
        }
        self.resolve_query(&descriptor.query_string()).await
    }

    /// Convenience form of [`GeocodingGateway::resolve`] for separate parts.
    pub async fn resolve_address(
        &self,
        address: &str,
        city: Option<&str>,
        state: Option<&str>,
    ) -> Option<GeocodeResult> {
        self.resolve(&AddressDescriptor::structured(address, city, state))
            .await
    }

    async fn resolve_query(&self, query: &str) -> Option<GeocodeResult> {
        if let Some(primary) = &self.primary {
            if let Some(result) = attempt(primary.as_ref(), query).await {
                return Some(result);
            }
        }
        attempt(self.secondary.as_ref(), query).await
    }

    /// Geocode many descriptors, `concurrency` at a time, pausing `delay`
    /// between groups. The output is aligned with `items`; a failed item is
    /// `None` and never stops the rest of the batch.
    pub async fn batch_resolve(
        &self,
        items: &[AddressDescriptor],
        concurrency: usize,
        delay: Duration,
    ) -> Vec<Option<GeocodeResult>> {
        let mut results = Vec::with_capacity(items.len());
        let chunk_size = concurrency.max(1);

        for (index, chunk) in items.chunks(chunk_size).enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let group = futures::future::join_all(chunk.iter().map(|item| self.resolve(item))).await;
            results.extend(group);
        }

        let found = results.iter().flatten().count();
        let primary = count_source(&results, GeocodeSource::GoogleMaps);
        let secondary = count_source(&results, GeocodeSource::OpenStreetMap);
        tracing::info!(
            requested = items.len(),
            found,
            google_maps = primary,
            openstreetmap = secondary,
            "batch geocoding complete"
        );

        results
    }
}

async fn attempt(provider: &dyn Geocoder, query: &str) -> Option<GeocodeResult> {
    let source = provider.source().as_str();
    match provider.geocode(query).await {
        Ok(Some(result)) if result.coordinates.is_valid() => Some(result),
        Ok(Some(result)) => {
            tracing::warn!(
                provider = source,
                query,
                lat = result.coordinates.lat,
                lng = result.coordinates.lng,
                "geocoder returned out-of-range coordinates; ignoring"
            );
            None
        }
        Ok(None) => {
            tracing::debug!(provider = source, query, "geocoder found no match");
            None
        }
        Err(e) => {
            tracing::warn!(provider = source, query, error = %e, "geocoder request failed");
            None
        }
    }
}

fn count_source(results: &[Option<GeocodeResult>], source: GeocodeSource) -> usize {
    results
        .iter()
        .flatten()
        .filter(|r| r.source == source)
        .count()
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
