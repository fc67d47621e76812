use thiserror::Error;

/// Errors raised by a single geocoding provider call.
///
/// The gateway never surfaces these to its callers; they are logged and the
/// query falls through to the next provider.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered 429 or reported its quota as exhausted.
    #[error("{provider} rate limited the request")]
    RateLimited { provider: &'static str },

    /// Unexpected HTTP status or provider-level error status.
    #[error("{provider} returned {status}")]
    Provider {
        provider: &'static str,
        status: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A coordinate field was present but not a number.
    #[error("{provider} returned an unparseable coordinate: {value}")]
    InvalidCoordinate {
        provider: &'static str,
        value: String,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
