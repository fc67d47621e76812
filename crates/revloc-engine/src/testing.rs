//! In-memory store double for tests in this and downstream crates.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use revloc_core::{cnpj, CoordinateSource, EnrichmentUpdate, NewReseller, Reseller, ResellerStats};
use revloc_db::{ReplaceOutcome, CLAIM_STALE_AFTER};
use uuid::Uuid;

use crate::store::{ResellerStore, StoreError};

#[derive(Default)]
struct Inner {
    records: Vec<Reseller>,
    claims: HashMap<Uuid, Instant>,
}

/// Mirrors the Postgres store's conditional-write rules over a `Vec`.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_reads: AtomicBool,
    fail_imports: AtomicBool,
    failing_writes: Mutex<HashSet<Uuid>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_records(records: Vec<Reseller>) -> Self {
        let store = Self::new();
        store.lock().records = records;
        store
    }

    /// Make every list/stats call fail from now on.
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Make every import batch fail as a rolled-back transaction would.
    pub fn fail_imports(&self) {
        self.fail_imports.store(true, Ordering::SeqCst);
    }

    /// Make enrichment writes (not claims) for `id` fail.
    pub fn fail_writes_for(&self, id: Uuid) {
        self.failing_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
    }

    /// Hold a fresh claim on `id` as if another pass had taken it.
    pub fn claim_externally(&self, id: Uuid) {
        self.lock().claims.insert(id, Instant::now());
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Reseller> {
        self.lock().records.clone()
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<Reseller> {
        self.lock().records.iter().find(|r| r.id == id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_write(&self, id: Uuid) -> Result<(), StoreError> {
        let failing = self
            .failing_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id);
        if failing {
            return Err(StoreError::Unavailable(format!("writes disabled for {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ResellerStore for MemoryStore {
    async fn list_searchable(&self) -> Result<Vec<Reseller>, StoreError> {
        self.check_reads()?;
        Ok(self
            .lock()
            .records
            .iter()
            .filter(|r| r.is_searchable())
            .cloned()
            .collect())
    }

    async fn list_enrichment_candidates(
        &self,
        active_only: bool,
    ) -> Result<Vec<Reseller>, StoreError> {
        self.check_reads()?;
        Ok(self
            .lock()
            .records
            .iter()
            .filter(|r| r.is_enrichment_candidate() && (!active_only || r.active))
            .cloned()
            .collect())
    }

    async fn claim_for_enrichment(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let eligible = inner.records.iter().any(|r| r.id == id && !r.data_enriched);
        let fresh_claim = inner
            .claims
            .get(&id)
            .is_some_and(|at| at.elapsed() < CLAIM_STALE_AFTER);
        if !eligible || fresh_claim {
            return Ok(false);
        }
        inner.claims.insert(id, Instant::now());
        Ok(true)
    }

    async fn release_claim(&self, id: Uuid) -> Result<(), StoreError> {
        self.lock().claims.remove(&id);
        Ok(())
    }

    async fn apply_enrichment(
        &self,
        id: Uuid,
        update: &EnrichmentUpdate,
    ) -> Result<bool, StoreError> {
        self.check_write(id)?;
        let mut inner = self.lock();
        let Some(record) = inner
            .records
            .iter_mut()
            .find(|r| r.id == id && !r.data_enriched)
        else {
            return Ok(false);
        };
        update.apply_to(record);
        inner.claims.remove(&id);
        Ok(true)
    }

    async fn mark_enriched_without_data(&self, id: Uuid) -> Result<bool, StoreError> {
        self.apply_enrichment(id, &EnrichmentUpdate::default()).await
    }

    async fn replace_by_cnpj(
        &self,
        resellers: &[NewReseller],
    ) -> Result<ReplaceOutcome, StoreError> {
        if self.fail_imports.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("import batch rejected".to_string()));
        }
        let cnpjs: HashSet<&str> = resellers.iter().filter_map(|r| r.cnpj.as_deref()).collect();

        let mut inner = self.lock();
        let before = inner.records.len();
        inner
            .records
            .retain(|r| !r.cnpj.as_deref().is_some_and(|c| cnpjs.contains(c)));
        let removed = (before - inner.records.len()) as u64;
        for reseller in resellers {
            inner.records.push(reseller.clone().into_reseller());
        }
        Ok(ReplaceOutcome {
            removed,
            inserted: resellers.len() as u64,
        })
    }

    async fn insert_one(&self, reseller: &NewReseller) -> Result<Reseller, StoreError> {
        let record = reseller.clone().into_reseller();
        self.lock().records.push(record.clone());
        Ok(record)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<Reseller>, StoreError> {
        let mut inner = self.lock();
        Ok(inner.records.iter_mut().find(|r| r.id == id).map(|r| {
            r.active = active;
            r.clone()
        }))
    }

    async fn reset_enrichment(&self, only: Option<&str>) -> Result<u64, StoreError> {
        let mut inner = self.lock();
        let mut reset = 0_u64;
        let mut cleared = Vec::new();
        for record in &mut inner.records {
            let matches = match only {
                Some(wanted) => {
                    record.cnpj.as_deref().map(cnpj::normalize).as_deref() == Some(wanted)
                }
                None => true,
            };
            if matches && record.data_enriched {
                record.data_enriched = false;
                reset += 1;
            }
            if matches {
                cleared.push(record.id);
            }
        }
        for id in cleared {
            inner.claims.remove(&id);
        }
        Ok(reset)
    }

    async fn stats(&self) -> Result<ResellerStats, StoreError> {
        self.check_reads()?;
        let inner = self.lock();
        let count = |pred: &dyn Fn(&Reseller) -> bool| {
            i64::try_from(inner.records.iter().filter(|r| pred(r)).count()).unwrap_or(i64::MAX)
        };
        Ok(ResellerStats {
            total: count(&|_| true),
            active: count(&|r| r.active),
            enriched: count(&|r| r.data_enriched),
            with_coordinates: count(&|r| r.coordinates.is_some()),
            with_registry_data: count(&|r| r.registry_data.is_some()),
            with_phone: count(&|r| !r.phone.is_empty()),
            with_whatsapp: count(&|r| !r.whatsapp.is_empty()),
            primary_geocoded: count(&|r| r.geocoding_source == Some(CoordinateSource::GoogleMaps)),
            high_priority: count(&|r| r.priority > 5),
            ..ResellerStats::default()
        }
        .with_percentages())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_reads()
    }
}
