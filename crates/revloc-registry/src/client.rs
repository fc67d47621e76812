//! HTTP client for the `BrasilAPI` CNPJ endpoint.
//!
//! A lookup never retries. 404 is a normal miss, 429 waits a short backoff
//! and gives up for this attempt, and every other failure is logged and
//! reported as a miss by [`RegistryClient::lookup`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use revloc_core::{cnpj, AppConfig, CompanyRegistration};

use crate::error::RegistryError;
use crate::lookup::RegistryLookup;
use crate::normalize::into_registration;
use crate::types::CnpjResponse;

pub const DEFAULT_BASE_URL: &str = "https://brasilapi.com.br/api/";

/// Client for the registry REST API.
///
/// Use [`RegistryClient::new`] for production or
/// [`RegistryClient::with_base_url`] to point at a mock server in tests.
pub struct RegistryClient {
    client: Client,
    base_url: Url,
    rate_limit_backoff: Duration,
}

impl RegistryClient {
    /// Creates a new client pointed at the production registry API.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, RegistryError> {
        Self::with_base_url(
            DEFAULT_BASE_URL,
            timeout_secs,
            user_agent,
            Duration::from_millis(500),
        )
    }

    /// Creates a new client with a custom base URL and 429 backoff.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RegistryError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        rate_limit_backoff: Duration,
    ) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| RegistryError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            rate_limit_backoff,
        })
    }

    /// Builds the client from the application config.
    ///
    /// # Errors
    ///
    /// Same as [`RegistryClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, RegistryError> {
        Self::with_base_url(
            &config.registry_base_url,
            config.http_timeout_secs,
            &config.user_agent,
            Duration::from_millis(config.rate_limit_backoff_ms),
        )
    }

    /// Looks up a CNPJ and exposes the failure reason.
    ///
    /// Returns `Ok(None)` on 404.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidCnpj`] if the id does not normalize to 14 digits.
    /// - [`RegistryError::RateLimited`] on 429, after sleeping the backoff.
    /// - [`RegistryError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`RegistryError::Http`] on network failure or timeout.
    /// - [`RegistryError::Deserialize`] if the body does not match the expected shape.
    pub async fn try_lookup(
        &self,
        raw_cnpj: &str,
    ) -> Result<Option<CompanyRegistration>, RegistryError> {
        if !cnpj::validate(raw_cnpj) {
            return Err(RegistryError::InvalidCnpj(raw_cnpj.to_string()));
        }
        let normalized = cnpj::normalize(raw_cnpj);

        let url = self.build_url(&normalized)?;
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            StatusCode::TOO_MANY_REQUESTS => {
                tokio::time::sleep(self.rate_limit_backoff).await;
                return Err(RegistryError::RateLimited { cnpj: normalized });
            }
            status if !status.is_success() => {
                return Err(RegistryError::UnexpectedStatus {
                    status: status.as_u16(),
                    cnpj: normalized,
                });
            }
            _ => {}
        }

        let body = response.text().await?;
        let raw: CnpjResponse =
            serde_json::from_str(&body).map_err(|e| RegistryError::Deserialize {
                context: format!("cnpj lookup({normalized})"),
                source: e,
            })?;

        Ok(Some(into_registration(&normalized, raw)))
    }

    fn build_url(&self, normalized: &str) -> Result<Url, RegistryError> {
        self.base_url
            .join(&format!("cnpj/v1/{normalized}"))
            .map_err(|e| RegistryError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl RegistryLookup for RegistryClient {
    async fn lookup(&self, raw_cnpj: &str) -> Option<CompanyRegistration> {
        match self.try_lookup(raw_cnpj).await {
            Ok(Some(registration)) => Some(registration),
            Ok(None) => {
                tracing::info!(cnpj = raw_cnpj, "CNPJ not found in registry");
                None
            }
            Err(RegistryError::InvalidCnpj(_)) => {
                tracing::warn!(cnpj = raw_cnpj, "skipping registry lookup for invalid CNPJ");
                None
            }
            Err(e @ RegistryError::RateLimited { .. }) => {
                tracing::warn!(cnpj = raw_cnpj, error = %e, "registry rate limit hit; giving up on this attempt");
                None
            }
            Err(e) => {
                tracing::warn!(cnpj = raw_cnpj, error = %e, "registry lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
