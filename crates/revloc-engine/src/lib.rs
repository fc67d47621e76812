//! Search, enrichment, and import over the reseller store.

pub mod enrich;
pub mod import;
pub mod search;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

#[cfg(test)]
mod fixtures;

pub use enrich::{
    EnrichmentKind, EnrichmentPipeline, EnrichmentReport, EnrichmentSettings,
};
pub use import::{import_csv, parse_csv, ImportError, ImportReport, ParsedImport};
pub use search::{
    ProximitySearchEngine, SearchError, SearchOutcome, SearchRequest, SearchSettings,
};
pub use store::{PgStore, ResellerStore, StoreError};
