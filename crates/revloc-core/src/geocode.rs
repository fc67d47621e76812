//! Geocoding result shapes and the address descriptor passed to providers.

use serde::{Deserialize, Serialize};

use crate::reseller::{CoordinateSource, Coordinates};

/// Which provider answered a geocoding query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeocodeSource {
    #[serde(rename = "google_maps")]
    GoogleMaps,
    #[serde(rename = "openstreetmap")]
    OpenStreetMap,
}

impl GeocodeSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoogleMaps => "google_maps",
            Self::OpenStreetMap => "openstreetmap",
        }
    }
}

impl From<GeocodeSource> for CoordinateSource {
    fn from(source: GeocodeSource) -> Self {
        match source {
            GeocodeSource::GoogleMaps => Self::GoogleMaps,
            GeocodeSource::OpenStreetMap => Self::OpenStreetMap,
        }
    }
}

/// Normalized address breakdown; every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponents {
    pub street: Option<String>,
    pub number: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub coordinates: Coordinates,
    pub components: AddressComponents,
    pub formatted_address: String,
    pub source: GeocodeSource,
    pub place_id: Option<String>,
}

/// An address to geocode.
///
/// Callers either already hold a single display line (a formatted registry
/// address, a postal-code query) or the separate parts of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddressDescriptor {
    Freeform(FreeformAddress),
    Structured {
        address: String,
        city: Option<String>,
        state: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeformAddress {
    pub text: String,
}

impl AddressDescriptor {
    #[must_use]
    pub fn freeform(text: impl Into<String>) -> Self {
        Self::Freeform(FreeformAddress { text: text.into() })
    }

    #[must_use]
    pub fn structured(address: impl Into<String>, city: Option<&str>, state: Option<&str>) -> Self {
        Self::Structured {
            address: address.into(),
            city: city.map(ToOwned::to_owned),
            state: state.map(ToOwned::to_owned),
        }
    }

    /// The primary address line, ignoring city and state.
    #[must_use]
    pub fn address_line(&self) -> &str {
        match self {
            Self::Freeform(f) => &f.text,
            Self::Structured { address, .. } => address,
        }
    }

    /// Whether there is anything worth sending to a provider.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.address_line().trim().is_empty()
    }

    /// Provider query: non-empty parts joined with `", "`, plus the country
    /// qualifier unless the address already names the country.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(4);
        match self {
            Self::Freeform(f) => parts.push(f.text.trim()),
            Self::Structured {
                address,
                city,
                state,
            } => {
                parts.push(address.trim());
                for part in [city, state].into_iter().flatten() {
                    parts.push(part.trim());
                }
            }
        }
        parts.retain(|p| !p.is_empty());

        let lower = self.address_line().to_lowercase();
        if !(lower.contains("brasil") || lower.contains("brazil")) {
            parts.push(crate::postal_code::COUNTRY_QUALIFIER);
        }
        parts.join(", ")
    }
}
