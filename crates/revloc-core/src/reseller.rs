use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::registry::RegistryData;

/// Opening hours written on imported records that carry none.
pub const DEFAULT_HOURS: &str = "Segunda a Sábado: 8h às 18h";

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components finite and inside `[-90, 90]` / `[-180, 180]`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Where a reseller's stored coordinates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSource {
    #[serde(rename = "google_maps")]
    GoogleMaps,
    #[serde(rename = "openstreetmap")]
    OpenStreetMap,
    #[serde(rename = "normalized_data")]
    NormalizedData,
    #[serde(rename = "manual")]
    Manual,
}

impl CoordinateSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoogleMaps => "google_maps",
            Self::OpenStreetMap => "openstreetmap",
            Self::NormalizedData => "normalized_data",
            Self::Manual => "manual",
        }
    }

    /// Parse the persisted tag. Unknown tags yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "google_maps" => Some(Self::GoogleMaps),
            "openstreetmap" => Some(Self::OpenStreetMap),
            "normalized_data" => Some(Self::NormalizedData),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for CoordinateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored reseller record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reseller {
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
    pub coordinates: Option<Coordinates>,
    pub geocoding_source: Option<CoordinateSource>,
    pub active: bool,
    pub data_enriched: bool,
    pub service_radius_km: Option<f64>,
    pub priority: i32,
    pub registry_data: Option<RegistryData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reseller {
    /// Eligible for proximity search: active and geolocated.
    #[must_use]
    pub fn is_searchable(&self) -> bool {
        self.active && self.coordinates.is_some()
    }

    /// Eligible for an enrichment pass: not yet enriched and has an identifier.
    #[must_use]
    pub fn is_enrichment_candidate(&self) -> bool {
        !self.data_enriched && self.cnpj.as_deref().is_some_and(crate::cnpj::is_present)
    }
}

/// Input for creating a reseller, either from an import row or manually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReseller {
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
    pub coordinates: Option<Coordinates>,
    pub geocoding_source: Option<CoordinateSource>,
    pub active: bool,
    pub data_enriched: bool,
    pub service_radius_km: Option<f64>,
    pub priority: i32,
}

impl NewReseller {
    /// Materialize into a full record with a fresh id and timestamps.
    #[must_use]
    pub fn into_reseller(self) -> Reseller {
        let now = Utc::now();
        Reseller {
            id: Uuid::new_v4(),
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
            coordinates: self.coordinates,
            geocoding_source: self.geocoding_source,
            active: self.active,
            data_enriched: self.data_enriched,
            service_radius_km: self.service_radius_km,
            priority: self.priority,
            registry_data: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Field changes produced by one enrichment of one record.
///
/// `None` keeps the stored value. Applying an update always sets
/// `data_enriched` and clears the enrichment claim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub cep: Option<String>,
    pub phone: Option<String>,
    pub registry_data: Option<RegistryData>,
    pub coordinates: Option<Coordinates>,
    pub geocoding_source: Option<CoordinateSource>,
}

impl EnrichmentUpdate {
    /// Whether the update carries nothing beyond the enriched flag.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply in place, following the same rules as the persisted update.
    pub fn apply_to(&self, reseller: &mut Reseller) {
        let assign = |target: &mut String, value: &Option<String>| {
            if let Some(v) = value {
                target.clone_from(v);
            }
        };
        assign(&mut reseller.name, &self.name);
        assign(&mut reseller.address, &self.address);
        assign(&mut reseller.neighborhood, &self.neighborhood);
        assign(&mut reseller.city, &self.city);
        assign(&mut reseller.state, &self.state);
        assign(&mut reseller.cep, &self.cep);
        assign(&mut reseller.phone, &self.phone);
        if self.registry_data.is_some() {
            reseller.registry_data.clone_from(&self.registry_data);
        }
        if self.coordinates.is_some() {
            reseller.coordinates = self.coordinates;
            reseller.geocoding_source = self.geocoding_source.or(reseller.geocoding_source);
        }
        reseller.data_enriched = true;
        reseller.updated_at = Utc::now();
    }
}

/// A reseller projected for a search response, with its computed distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub cep: String,
    pub phone: String,
    pub hours: String,
    /// Kilometers, one decimal place.
    pub distance: f64,
}

impl SearchResult {
    #[must_use]
    pub fn from_reseller(reseller: &Reseller, distance: f64) -> Self {
        Self {
            id: reseller.id,
            name: reseller.name.clone(),
            address: reseller.address.clone(),
            neighborhood: reseller.neighborhood.clone(),
            city: reseller.city.clone(),
            state: reseller.state.clone(),
            cep: reseller.cep.clone(),
            phone: reseller.phone.clone(),
            hours: reseller.hours.clone(),
            distance,
        }
    }
}

/// Data-quality counters over the whole reseller table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResellerStats {
    pub total: i64,
    pub active: i64,
    pub enriched: i64,
    pub with_coordinates: i64,
    pub with_registry_data: i64,
    pub with_phone: i64,
    pub with_whatsapp: i64,
    pub primary_geocoded: i64,
    pub high_priority: i64,
    pub enrichment_pct: f64,
    pub coordinates_pct: f64,
    pub primary_geocoded_pct: f64,
}

impl ResellerStats {
    /// Fill the percentage fields from the raw counters.
    #[must_use]
    pub fn with_percentages(mut self) -> Self {
        self.enrichment_pct = percentage(self.enriched, self.total);
        self.coordinates_pct = percentage(self.with_coordinates, self.total);
        self.primary_geocoded_pct = percentage(self.primary_geocoded, self.total);
        self
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let pct = part as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}
