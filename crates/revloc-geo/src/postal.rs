//! CEP resolution: geocoding gateway first, then the regional table.

use std::sync::Arc;

use revloc_core::{postal_code, AddressDescriptor, Coordinates, GeocodeSource};
use serde::Serialize;

use crate::gateway::GeocodingGateway;

/// Which tier produced an origin coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum OriginTier {
    Provider { source: GeocodeSource },
    RegionalFallback { region: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedOrigin {
    pub coordinates: Coordinates,
    pub tier: OriginTier,
}

#[derive(Clone)]
pub struct PostalCodeResolver {
    gateway: Arc<GeocodingGateway>,
}

impl PostalCodeResolver {
    #[must_use]
    pub fn new(gateway: Arc<GeocodingGateway>) -> Self {
        Self { gateway }
    }

    /// Coordinates for a CEP, or `None` when it is invalid or unresolvable.
    pub async fn resolve(&self, code: &str) -> Option<Coordinates> {
        self.resolve_detailed(code).await.map(|o| o.coordinates)
    }

    /// Like [`PostalCodeResolver::resolve`] but also reports the tier used.
    pub async fn resolve_detailed(&self, code: &str) -> Option<ResolvedOrigin> {
        if !postal_code::validate(code) {
            tracing::debug!(cep = code, "rejecting invalid CEP");
            return None;
        }

        let descriptor = AddressDescriptor::freeform(postal_code::geocode_query(code));
        if let Some(result) = self.gateway.resolve(&descriptor).await {
            return Some(ResolvedOrigin {
                coordinates: result.coordinates,
                tier: OriginTier::Provider {
                    source: result.source,
                },
            });
        }

        match postal_code::regional_fallback_entry(code) {
            Some((region, coordinates)) => {
                tracing::info!(cep = code, region, "CEP resolved from regional fallback table");
                Some(ResolvedOrigin {
                    coordinates,
                    tier: OriginTier::RegionalFallback { region },
                })
            }
            None => {
                tracing::warn!(cep = code, "CEP could not be resolved by any tier");
                None
            }
        }
    }
}
