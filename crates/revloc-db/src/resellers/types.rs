//! Row types for the `resellers` table.

use chrono::{DateTime, Utc};
use revloc_core::{CoordinateSource, Coordinates, RegistryData, Reseller, ResellerStats};
use uuid::Uuid;

/// A row from the `resellers` table.
///
/// `enrichment_claimed_at` is omitted; it only matters to the claim queries.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResellerRow {
    pub id: Uuid,
    pub name: String,
    pub cnpj: Option<String>,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub cep: String,
    pub phone: String,
    pub whatsapp: String,
    pub hours: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geocoding_source: Option<String>,
    pub active: bool,
    pub data_enriched: bool,
    pub service_radius_km: Option<f64>,
    pub priority: i32,
    pub registry_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResellerRow {
    /// Convert into the domain record.
    ///
    /// Unknown `geocoding_source` tags and registry payloads that no longer
    /// match [`RegistryData`] are dropped with a warning rather than failing
    /// the whole read.
    #[must_use]
    pub fn into_reseller(self) -> Reseller {
        let coordinates = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        };
        let geocoding_source = self.geocoding_source.as_deref().and_then(|raw| {
            let parsed = CoordinateSource::parse(raw);
            if parsed.is_none() {
                tracing::warn!(id = %self.id, source = raw, "unknown geocoding source on reseller row");
            }
            parsed
        });
        let registry_data = self.registry_data.and_then(|value| {
            serde_json::from_value::<RegistryData>(value)
                .map_err(|e| {
                    tracing::warn!(id = %self.id, error = %e, "unreadable registry_data on reseller row");
                })
                .ok()
        });

        Reseller {
            id: self.id,
            name: self.name,
            cnpj: self.cnpj,
            address: self.address,
            neighborhood: self.neighborhood,
            city: self.city,
            state: self.state,
            cep: self.cep,
            phone: self.phone,
            whatsapp: self.whatsapp,
            hours: self.hours,
            coordinates,
            geocoding_source,
            active: self.active,
            data_enriched: self.data_enriched,
            service_radius_km: self.service_radius_km,
            priority: self.priority,
            registry_data,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Aggregate counters over the whole table.
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct ResellerStatsRow {
    pub total: i64,
    pub active: i64,
    pub enriched: i64,
    pub with_coordinates: i64,
    pub with_registry_data: i64,
    pub with_phone: i64,
    pub with_whatsapp: i64,
    pub primary_geocoded: i64,
    pub high_priority: i64,
}

impl ResellerStatsRow {
    #[must_use]
    pub fn into_stats(self) -> ResellerStats {
        ResellerStats {
            total: self.total,
            active: self.active,
            enriched: self.enriched,
            with_coordinates: self.with_coordinates,
            with_registry_data: self.with_registry_data,
            with_phone: self.with_phone,
            with_whatsapp: self.with_whatsapp,
            primary_geocoded: self.primary_geocoded,
            high_priority: self.high_priority,
            enrichment_pct: 0.0,
            coordinates_pct: 0.0,
            primary_geocoded_pct: 0.0,
        }
        .with_percentages()
    }
}
