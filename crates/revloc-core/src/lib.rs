pub mod app_config;
pub mod cnpj;
pub mod config;
pub mod distance;
pub mod geocode;
pub mod postal_code;
pub mod registry;
pub mod reseller;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use distance::{haversine_km, is_known_distance, EARTH_RADIUS_KM};
pub use geocode::{
    AddressComponents, AddressDescriptor, FreeformAddress, GeocodeResult, GeocodeSource,
};
pub use registry::{CompanyRegistration, RegistryData};
pub use reseller::{
    CoordinateSource, Coordinates, EnrichmentUpdate, NewReseller, Reseller, ResellerStats,
    SearchResult, DEFAULT_HOURS,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
