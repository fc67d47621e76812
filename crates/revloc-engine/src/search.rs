//! Proximity search: CEP → origin → ranked nearby resellers.

use std::sync::Arc;

use revloc_core::{
    haversine_km, is_known_distance, postal_code, AppConfig, Coordinates, Reseller, SearchResult,
};
use revloc_geo::PostalCodeResolver;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{ResellerStore, StoreError};

pub const INVALID_CEP_MESSAGE: &str = "Invalid CEP. Use the format 00000-000 or 00000000.";
pub const ORIGIN_NOT_FOUND_MESSAGE: &str = "Could not locate the informed CEP.";
pub const NO_RESELLERS_MESSAGE: &str = "No resellers found.";
pub const NONE_NEARBY_MESSAGE: &str = "No resellers found near the informed CEP.";

/// Upper bound for a per-request result limit.
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("failed to load resellers: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    pub max_distance_km: f64,
    pub limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_distance_km: 50.0,
            limit: 10,
        }
    }
}

impl SearchSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_distance_km: config.search_max_distance_km,
            limit: config.search_limit,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    pub cep: String,
    #[serde(default)]
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchRequest {
    #[must_use]
    pub fn new(cep: impl Into<String>) -> Self {
        Self {
            cep: cep.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub success: bool,
    pub results: Vec<SearchResult>,
    pub message: Option<String>,
}

impl SearchOutcome {
    fn empty(success: bool, message: &str) -> Self {
        Self {
            success,
            results: Vec::new(),
            message: Some(message.to_string()),
        }
    }
}

pub struct ProximitySearchEngine {
    resolver: PostalCodeResolver,
    store: Arc<dyn ResellerStore>,
    settings: SearchSettings,
}

impl ProximitySearchEngine {
    #[must_use]
    pub fn new(
        resolver: PostalCodeResolver,
        store: Arc<dyn ResellerStore>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            resolver,
            store,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> SearchSettings {
        self.settings
    }

    /// Find the resellers nearest to a CEP.
    ///
    /// Every outcome other than a store failure is an `Ok`: bad input and
    /// empty results come back as a [`SearchOutcome`] with a message.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Persistence`] if the candidate list cannot be
    /// loaded.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        if !postal_code::validate(&request.cep) {
            return Ok(SearchOutcome::empty(false, INVALID_CEP_MESSAGE));
        }

        let Some(origin) = self.resolver.resolve(&request.cep).await else {
            return Ok(SearchOutcome::empty(true, ORIGIN_NOT_FOUND_MESSAGE));
        };

        let candidates = self.store.list_searchable().await?;
        if candidates.is_empty() {
            return Ok(SearchOutcome::empty(true, NO_RESELLERS_MESSAGE));
        }

        let max_distance_km = request
            .max_distance_km
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(self.settings.max_distance_km);
        let limit = request
            .limit
            .map_or(self.settings.limit, |l| l.clamp(1, MAX_LIMIT));

        let results = rank(origin, &candidates, max_distance_km, limit);
        tracing::info!(
            cep = %postal_code::format(&request.cep),
            candidates = candidates.len(),
            results = results.len(),
            max_distance_km,
            "proximity search complete"
        );

        if results.is_empty() {
            return Ok(SearchOutcome::empty(true, NONE_NEARBY_MESSAGE));
        }
        Ok(SearchOutcome {
            success: true,
            results,
            message: None,
        })
    }
}

/// Distance-rank `candidates` around `origin`.
///
/// Candidates without coordinates or with an unknown distance are skipped.
/// The sort is stable, so equal distances keep their input order.
#[must_use]
pub fn rank(
    origin: Coordinates,
    candidates: &[Reseller],
    max_distance_km: f64,
    limit: usize,
) -> Vec<SearchResult> {
    let mut ranked: Vec<SearchResult> = candidates
        .iter()
        .filter_map(|reseller| {
            let Some(coordinates) = reseller.coordinates else {
                tracing::warn!(id = %reseller.id, "search candidate without coordinates");
                return None;
            };
            let distance = haversine_km(origin, coordinates);
            if !is_known_distance(distance) {
                tracing::debug!(id = %reseller.id, "skipping candidate with unknown distance");
                return None;
            }
            (distance <= max_distance_km).then(|| SearchResult::from_reseller(reseller, distance))
        })
        .collect();

    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
