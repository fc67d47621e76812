//! The persistence seam used by search, enrichment, and import.

use async_trait::async_trait;
use revloc_core::{EnrichmentUpdate, NewReseller, Reseller, ResellerStats};
use revloc_db::ReplaceOutcome;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Reseller persistence as the engine needs it.
///
/// Every conditional write reports whether it landed; `false` means another
/// writer got there first, never an error.
#[async_trait]
pub trait ResellerStore: Send + Sync {
    /// Active records with coordinates, in a stable order.
    async fn list_searchable(&self) -> Result<Vec<Reseller>, StoreError>;

    /// Unenriched records carrying a CNPJ, optionally active ones only.
    async fn list_enrichment_candidates(&self, active_only: bool)
        -> Result<Vec<Reseller>, StoreError>;

    async fn claim_for_enrichment(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn release_claim(&self, id: Uuid) -> Result<(), StoreError>;

    async fn apply_enrichment(&self, id: Uuid, update: &EnrichmentUpdate)
        -> Result<bool, StoreError>;

    async fn mark_enriched_without_data(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Swap out every record sharing a CNPJ with `resellers` for the new
    /// batch. All or nothing: on error the previous records are still there.
    async fn replace_by_cnpj(&self, resellers: &[NewReseller])
        -> Result<ReplaceOutcome, StoreError>;

    async fn insert_one(&self, reseller: &NewReseller) -> Result<Reseller, StoreError>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<Reseller>, StoreError>;

    /// `cnpj` is already normalized; `None` resets every record.
    async fn reset_enrichment(&self, cnpj: Option<&str>) -> Result<u64, StoreError>;

    async fn stats(&self) -> Result<ResellerStats, StoreError>;

    /// Liveness probe for health reporting.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ResellerStore for PgStore {
    async fn list_searchable(&self) -> Result<Vec<Reseller>, StoreError> {
        let rows = revloc_db::list_searchable_resellers(&self.pool).await?;
        Ok(rows.into_iter().map(revloc_db::ResellerRow::into_reseller).collect())
    }

    async fn list_enrichment_candidates(
        &self,
        active_only: bool,
    ) -> Result<Vec<Reseller>, StoreError> {
        let rows = revloc_db::list_enrichment_candidates(&self.pool, active_only).await?;
        Ok(rows.into_iter().map(revloc_db::ResellerRow::into_reseller).collect())
    }

    async fn claim_for_enrichment(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(revloc_db::claim_for_enrichment(&self.pool, id).await?)
    }

    async fn release_claim(&self, id: Uuid) -> Result<(), StoreError> {
        Ok(revloc_db::release_enrichment_claim(&self.pool, id).await?)
    }

    async fn apply_enrichment(
        &self,
        id: Uuid,
        update: &EnrichmentUpdate,
    ) -> Result<bool, StoreError> {
        Ok(revloc_db::apply_enrichment(&self.pool, id, update).await?)
    }

    async fn mark_enriched_without_data(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(revloc_db::mark_enriched_without_data(&self.pool, id).await?)
    }

    async fn replace_by_cnpj(
        &self,
        resellers: &[NewReseller],
    ) -> Result<ReplaceOutcome, StoreError> {
        Ok(revloc_db::replace_resellers_by_cnpj(&self.pool, resellers).await?)
    }

    async fn insert_one(&self, reseller: &NewReseller) -> Result<Reseller, StoreError> {
        let row = revloc_db::insert_reseller(&self.pool, reseller).await?;
        Ok(row.into_reseller())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<Reseller>, StoreError> {
        let row = revloc_db::set_reseller_active(&self.pool, id, active).await?;
        Ok(row.map(revloc_db::ResellerRow::into_reseller))
    }

    async fn reset_enrichment(&self, cnpj: Option<&str>) -> Result<u64, StoreError> {
        Ok(revloc_db::reset_enrichment(&self.pool, cnpj).await?)
    }

    async fn stats(&self) -> Result<ResellerStats, StoreError> {
        Ok(revloc_db::reseller_stats(&self.pool).await?.into_stats())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(revloc_db::ping(&self.pool).await?)
    }
}
