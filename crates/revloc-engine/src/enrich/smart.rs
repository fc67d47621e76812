//! Prioritised pass: score candidates, then enrich in concurrent batches.

use std::cmp::Reverse;
use std::collections::HashMap;

use revloc_core::{cnpj, AddressDescriptor, CompanyRegistration, GeocodeResult, Reseller};

use super::merge::build_update;
use super::{EnrichmentPipeline, EnrichmentReport, RecordOutcome};
use crate::store::StoreError;

/// How much a record stands to gain from enrichment.
///
/// Records that already carry an address, city, or phone are easier to
/// geocode; records that already have coordinates gain little.
#[must_use]
pub fn priority_score(reseller: &Reseller) -> i64 {
    let mut score = 0_i64;
    if !reseller.address.trim().is_empty() {
        score += 10;
    }
    if !reseller.city.trim().is_empty() {
        score += 5;
    }
    if !reseller.phone.trim().is_empty() {
        score += 3;
    }
    if reseller.coordinates.is_some() {
        score -= 20;
    }
    score + 2 * i64::from(reseller.priority)
}

/// Highest score first, ties in input order, at most `cap` records.
pub(super) fn prioritise(mut candidates: Vec<Reseller>, cap: usize) -> Vec<Reseller> {
    candidates.sort_by_key(|r| Reverse(priority_score(r)));
    candidates.truncate(cap);
    candidates
}

impl EnrichmentPipeline {
    pub(super) async fn run_smart(&self) -> EnrichmentReport {
        let candidates = match self.store.list_enrichment_candidates(true).await {
            Ok(candidates) => prioritise(candidates, self.settings.smart_cap),
            Err(e) => {
                tracing::error!(error = %e, "failed to load enrichment candidates");
                return EnrichmentReport::load_failed(&e);
            }
        };

        let mut report = EnrichmentReport::started(candidates.len());
        let batch_size = self.settings.smart_batch_size.max(1);
        let total_batches = candidates.len().div_ceil(batch_size);

        for (batch_index, batch) in candidates.chunks(batch_size).enumerate() {
            if batch_index > 0 && !self.settings.smart_batch_delay.is_zero() {
                tokio::time::sleep(self.settings.smart_batch_delay).await;
            }
            tracing::info!(
                batch = batch_index + 1,
                total_batches,
                size = batch.len(),
                "smart-enriching batch"
            );
            self.enrich_batch(batch, &mut report).await;
        }

        report.finish()
    }

    async fn enrich_batch(&self, batch: &[Reseller], report: &mut EnrichmentReport) {
        let mut claimed: Vec<&Reseller> = Vec::with_capacity(batch.len());
        for reseller in batch {
            match self.store.claim_for_enrichment(reseller.id).await {
                Ok(true) => claimed.push(reseller),
                Ok(false) => report.record(reseller, Ok(RecordOutcome::Skipped)),
                Err(e) => report.record(reseller, Err(e)),
            }
        }
        if claimed.is_empty() {
            return;
        }

        let ids: Vec<String> = claimed
            .iter()
            .map(|r| r.cnpj.clone().unwrap_or_default())
            .collect();
        let registrations = self
            .registry
            .batch_lookup(
                &ids,
                self.settings.registry_concurrency,
                self.settings.registry_delay,
            )
            .await;

        let geocodes = self.geocode_found(&claimed, &registrations).await;

        for reseller in claimed {
            let registration = lookup_entry(&registrations, reseller);
            let outcome = self
                .write_one(reseller, registration, geocodes.get(&reseller.id))
                .await;
            if outcome.is_err() {
                self.release(reseller).await;
            }
            report.record(reseller, outcome);
        }
    }

    /// Batch-geocode the registry addresses of the records that were found.
    async fn geocode_found(
        &self,
        claimed: &[&Reseller],
        registrations: &HashMap<String, Option<CompanyRegistration>>,
    ) -> HashMap<uuid::Uuid, GeocodeResult> {
        let mut owners = Vec::new();
        let mut descriptors = Vec::new();
        for reseller in claimed {
            if let Some(registration) = lookup_entry(registrations, reseller) {
                if !registration.formatted_address.trim().is_empty() {
                    owners.push(reseller.id);
                    descriptors.push(AddressDescriptor::structured(
                        &registration.formatted_address,
                        registration.city.as_deref(),
                        registration.state.as_deref(),
                    ));
                }
            }
        }
        if descriptors.is_empty() {
            return HashMap::new();
        }

        let resolved = self
            .gateway
            .batch_resolve(
                &descriptors,
                self.settings.geocode_concurrency,
                self.settings.geocode_delay,
            )
            .await;
        owners
            .into_iter()
            .zip(resolved)
            .filter_map(|(id, result)| result.map(|r| (id, r)))
            .collect()
    }

    async fn write_one(
        &self,
        reseller: &Reseller,
        registration: Option<&CompanyRegistration>,
        geocode: Option<&GeocodeResult>,
    ) -> Result<RecordOutcome, StoreError> {
        match registration {
            Some(registration) => {
                let update = build_update(registration, geocode);
                let landed = self.store.apply_enrichment(reseller.id, &update).await?;
                Ok(RecordOutcome::from_write(landed, RecordOutcome::Enriched))
            }
            None => {
                let landed = self.store.mark_enriched_without_data(reseller.id).await?;
                Ok(RecordOutcome::from_write(landed, RecordOutcome::WithoutData))
            }
        }
    }
}

fn lookup_entry<'a>(
    registrations: &'a HashMap<String, Option<CompanyRegistration>>,
    reseller: &Reseller,
) -> Option<&'a CompanyRegistration> {
    let key = cnpj::normalize(reseller.cnpj.as_deref().unwrap_or_default());
    registrations.get(&key).and_then(Option::as_ref)
}
