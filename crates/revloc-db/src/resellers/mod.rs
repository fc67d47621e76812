//! Database operations for the `resellers` table.

mod read;
mod types;
mod write;

pub use read::{
    get_reseller, list_enrichment_candidates, list_searchable_resellers, reseller_stats,
};
pub use types::{ResellerRow, ResellerStatsRow};
pub use write::{
    apply_enrichment, claim_for_enrichment, delete_resellers_by_cnpjs, insert_reseller,
    insert_resellers, mark_enriched_without_data, release_enrichment_claim,
    replace_resellers_by_cnpj, reset_enrichment, set_reseller_active, ReplaceOutcome,
    CLAIM_STALE_AFTER,
};

