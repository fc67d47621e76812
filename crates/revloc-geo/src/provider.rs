use async_trait::async_trait;
use reqwest::Url;
use revloc_core::{GeocodeResult, GeocodeSource};

use crate::error::GeoError;

/// A single geocoding backend.
///
/// `Ok(None)` means the provider answered but found nothing; errors cover
/// transport failures, rate limiting, and malformed responses.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Provider tag attached to every result this backend produces.
    fn source(&self) -> GeocodeSource;

    /// Resolve a free-text query.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] when the provider could not be asked or its answer
    /// could not be understood.
    async fn geocode(&self, query: &str) -> Result<Option<GeocodeResult>, GeoError>;
}

/// Parse a base URL and make sure it ends with exactly one slash, so that
/// `Url::join` appends to the path rather than replacing its last segment.
pub(crate) fn normalise_base_url(base_url: &str) -> Result<Url, GeoError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| GeoError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

/// Trimmed, non-empty owned string.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}
