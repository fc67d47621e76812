//! Geocoding for reseller addresses and customer postal codes.
//!
//! [`GeocodingGateway`] chains a keyed primary provider (Google) with an open
//! secondary provider (Nominatim). [`PostalCodeResolver`] adds the static
//! regional table on top for CEP lookups.

pub mod error;
pub mod gateway;
pub mod google;
pub mod nominatim;
pub mod postal;
pub mod provider;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::GeoError;
pub use gateway::GeocodingGateway;
pub use google::GoogleGeocoder;
pub use nominatim::NominatimGeocoder;
pub use postal::{OriginTier, PostalCodeResolver, ResolvedOrigin};
pub use provider::Geocoder;
