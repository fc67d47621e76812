use thiserror::Error;

/// Errors returned by the company registry client.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The identifier does not normalize to fourteen digits.
    #[error("invalid CNPJ: {0}")]
    InvalidCnpj(String),

    /// HTTP 429 from the registry. The caller already waited the backoff.
    #[error("registry rate limited the request for {cnpj}")]
    RateLimited { cnpj: String },

    /// Any non-success status other than 404 and 429.
    #[error("unexpected HTTP status {status} for {cnpj}")]
    UnexpectedStatus { status: u16, cnpj: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
