//! Company registry (CNPJ) lookups against `BrasilAPI`.

pub mod client;
pub mod error;
pub mod lookup;
pub mod normalize;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use client::RegistryClient;
pub use error::RegistryError;
pub use lookup::RegistryLookup;
pub use normalize::format_address;
