//! Sequential pass: one record at a time, paced for the public registry.

use revloc_core::{AddressDescriptor, Reseller};

use super::merge::build_update;
use super::{EnrichmentPipeline, EnrichmentReport, RecordOutcome};
use crate::store::StoreError;

impl EnrichmentPipeline {
    pub(super) async fn run_plain(&self) -> EnrichmentReport {
        let candidates = match self.store.list_enrichment_candidates(false).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!(error = %e, "failed to load enrichment candidates");
                return EnrichmentReport::load_failed(&e);
            }
        };

        let mut report = EnrichmentReport::started(candidates.len());
        let batch_size = self.settings.batch_size.max(1);
        let total_batches = candidates.len().div_ceil(batch_size);

        for (batch_index, batch) in candidates.chunks(batch_size).enumerate() {
            if batch_index > 0 && !self.settings.batch_delay.is_zero() {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
            tracing::info!(
                batch = batch_index + 1,
                total_batches,
                size = batch.len(),
                "enriching batch"
            );

            for (record_index, reseller) in batch.iter().enumerate() {
                if record_index > 0 && !self.settings.record_delay.is_zero() {
                    tokio::time::sleep(self.settings.record_delay).await;
                }
                let outcome = self.enrich_one(reseller).await;
                report.record(reseller, outcome);
            }
        }

        report.finish()
    }

    async fn enrich_one(&self, reseller: &Reseller) -> Result<RecordOutcome, StoreError> {
        if !self.store.claim_for_enrichment(reseller.id).await? {
            tracing::debug!(id = %reseller.id, "reseller claimed elsewhere; skipping");
            return Ok(RecordOutcome::Skipped);
        }

        let result = self.lookup_and_write(reseller).await;
        if result.is_err() {
            self.release(reseller).await;
        }
        result
    }

    async fn lookup_and_write(&self, reseller: &Reseller) -> Result<RecordOutcome, StoreError> {
        let raw_cnpj = reseller.cnpj.as_deref().unwrap_or_default();
        let Some(registration) = self.registry.lookup(raw_cnpj).await else {
            tracing::info!(id = %reseller.id, cnpj = raw_cnpj, "no registry data; marking enriched");
            let landed = self.store.mark_enriched_without_data(reseller.id).await?;
            return Ok(RecordOutcome::from_write(landed, RecordOutcome::WithoutData));
        };

        let geocode = if registration.formatted_address.trim().is_empty() {
            None
        } else {
            let descriptor = AddressDescriptor::structured(
                &registration.formatted_address,
                registration.city.as_deref(),
                registration.state.as_deref(),
            );
            self.gateway.resolve(&descriptor).await
        };

        let update = build_update(&registration, geocode.as_ref());
        let landed = self.store.apply_enrichment(reseller.id, &update).await?;
        Ok(RecordOutcome::from_write(landed, RecordOutcome::Enriched))
    }
}
