//! The registry lookup seam and its batched form.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use revloc_core::{cnpj, CompanyRegistration};

/// Anything that can answer "what company is behind this CNPJ".
///
/// Implementations swallow their own failures: a miss, an invalid id, a rate
/// limit, and a timeout all come back as `None`.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    async fn lookup(&self, raw_cnpj: &str) -> Option<CompanyRegistration>;

    /// Look up many ids in fixed-size groups.
    ///
    /// Each group runs concurrently; `delay` is slept between groups. The map
    /// is keyed by normalized CNPJ and holds an entry for every distinct input
    /// id, `None` where the lookup did not produce data.
    async fn batch_lookup(
        &self,
        raw_cnpjs: &[String],
        concurrency: usize,
        delay: Duration,
    ) -> HashMap<String, Option<CompanyRegistration>> {
        let mut seen = std::collections::HashSet::new();
        let ids: Vec<String> = raw_cnpjs
            .iter()
            .map(|raw| cnpj::normalize(raw))
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let mut results = HashMap::with_capacity(ids.len());
        for (index, group) in ids.chunks(concurrency.max(1)).enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let found = futures::future::join_all(group.iter().map(|id| self.lookup(id))).await;
            results.extend(group.iter().cloned().zip(found));
        }

        let hits = results.values().filter(|r| r.is_some()).count();
        tracing::info!(
            requested = ids.len(),
            found = hits,
            "batch registry lookup complete"
        );
        results
    }
}
