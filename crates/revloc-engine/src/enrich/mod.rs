//! Batched enrichment of sparse reseller records from the company registry
//! and the geocoding gateway.
//!
//! Two passes share the same rules. Every record is claimed before any
//! network work and written with a write that only lands while it is still
//! unenriched, so overlapping passes never enrich a record twice. A record
//! the registry does not know is still marked enriched; `reset` reopens it.

mod merge;
mod plain;
mod smart;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use revloc_core::{cnpj, AppConfig, Reseller};
use revloc_geo::GeocodingGateway;
use revloc_registry::RegistryLookup;
use serde::Serialize;

use crate::store::{ResellerStore, StoreError};

pub use merge::build_update;
pub use smart::priority_score;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentKind {
    Plain,
    Smart,
}

impl fmt::Display for EnrichmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Smart => write!(f, "smart"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentSettings {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub record_delay: Duration,
    pub smart_cap: usize,
    pub smart_batch_size: usize,
    pub smart_batch_delay: Duration,
    pub registry_concurrency: usize,
    pub registry_delay: Duration,
    pub geocode_concurrency: usize,
    pub geocode_delay: Duration,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_delay: Duration::from_secs(1),
            record_delay: Duration::from_millis(300),
            smart_cap: 1000,
            smart_batch_size: 15,
            smart_batch_delay: Duration::from_millis(500),
            registry_concurrency: 3,
            registry_delay: Duration::from_millis(300),
            geocode_concurrency: 5,
            geocode_delay: Duration::from_millis(200),
        }
    }
}

impl EnrichmentSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            batch_size: config.enrich_batch_size,
            batch_delay: Duration::from_millis(config.enrich_batch_delay_ms),
            record_delay: Duration::from_millis(config.enrich_record_delay_ms),
            smart_cap: config.smart_enrich_cap,
            smart_batch_size: config.smart_enrich_batch_size,
            smart_batch_delay: Duration::from_millis(config.smart_enrich_batch_delay_ms),
            registry_concurrency: config.registry_batch_concurrency,
            registry_delay: Duration::from_millis(config.registry_batch_delay_ms),
            geocode_concurrency: config.geocode_batch_concurrency,
            geocode_delay: Duration::from_millis(config.geocode_batch_delay_ms),
        }
    }
}

/// Summary of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentReport {
    pub success: bool,
    pub considered: usize,
    pub enriched: usize,
    pub marked_without_data: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    pub message: String,
}

impl EnrichmentReport {
    fn started(considered: usize) -> Self {
        Self {
            success: true,
            considered,
            ..Self::default()
        }
    }

    fn load_failed(error: &StoreError) -> Self {
        Self {
            success: false,
            errors: vec![error.to_string()],
            message: "Failed to load enrichment candidates.".to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, reseller: &Reseller, outcome: Result<RecordOutcome, StoreError>) {
        match outcome {
            Ok(RecordOutcome::Enriched) => self.enriched += 1,
            Ok(RecordOutcome::WithoutData) => self.marked_without_data += 1,
            Ok(RecordOutcome::Skipped) => self.skipped += 1,
            Err(e) => {
                tracing::warn!(id = %reseller.id, name = %reseller.name, error = %e, "failed to enrich reseller");
                self.failed += 1;
                self.errors.push(format!("{}: {e}", reseller.name));
            }
        }
    }

    fn finish(mut self) -> Self {
        self.message = if self.considered == 0 {
            "No resellers to enrich.".to_string()
        } else {
            format!(
                "{} resellers enriched, {} without registry data, {} skipped, {} failed.",
                self.enriched, self.marked_without_data, self.skipped, self.failed
            )
        };
        self
    }
}

/// What happened to one claimed (or unclaimable) record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordOutcome {
    Enriched,
    WithoutData,
    Skipped,
}

impl RecordOutcome {
    fn from_write(landed: bool, success: Self) -> Self {
        if landed {
            success
        } else {
            Self::Skipped
        }
    }
}

pub struct EnrichmentPipeline {
    store: Arc<dyn ResellerStore>,
    registry: Arc<dyn RegistryLookup>,
    gateway: Arc<GeocodingGateway>,
    settings: EnrichmentSettings,
}

impl EnrichmentPipeline {
    #[must_use]
    pub fn new(
        store: Arc<dyn ResellerStore>,
        registry: Arc<dyn RegistryLookup>,
        gateway: Arc<GeocodingGateway>,
        settings: EnrichmentSettings,
    ) -> Self {
        Self {
            store,
            registry,
            gateway,
            settings,
        }
    }

    /// Run one pass. Never fails: problems end up in the report.
    pub async fn run(&self, kind: EnrichmentKind) -> EnrichmentReport {
        let report = match kind {
            EnrichmentKind::Plain => self.run_plain().await,
            EnrichmentKind::Smart => self.run_smart().await,
        };
        tracing::info!(
            kind = %kind,
            success = report.success,
            considered = report.considered,
            enriched = report.enriched,
            marked_without_data = report.marked_without_data,
            skipped = report.skipped,
            failed = report.failed,
            "enrichment pass finished"
        );
        report
    }

    /// The records a pass would work on, in processing order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the candidates cannot be loaded.
    pub async fn plan(&self, kind: EnrichmentKind) -> Result<Vec<Reseller>, StoreError> {
        match kind {
            EnrichmentKind::Plain => self.store.list_enrichment_candidates(false).await,
            EnrichmentKind::Smart => {
                let candidates = self.store.list_enrichment_candidates(true).await?;
                Ok(smart::prioritise(candidates, self.settings.smart_cap))
            }
        }
    }

    /// Reopen enriched records: one CNPJ (any formatting) or, when `raw_cnpj`
    /// is `None` or blank, all of them.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the update fails.
    pub async fn reset(&self, raw_cnpj: Option<&str>) -> Result<u64, StoreError> {
        let normalized = raw_cnpj
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(cnpj::normalize);
        let count = self.store.reset_enrichment(normalized.as_deref()).await?;
        tracing::info!(cnpj = ?normalized, reset = count, "enrichment reset");
        Ok(count)
    }

    /// Give up a claim after a failed write so a later pass can retry.
    async fn release(&self, reseller: &Reseller) {
        if let Err(e) = self.store.release_claim(reseller.id).await {
            tracing::warn!(id = %reseller.id, error = %e, "failed to release enrichment claim");
        }
    }
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod tests;
