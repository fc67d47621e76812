//! In-process registry double for tests in this and downstream crates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use revloc_core::{cnpj, CompanyRegistration};

use crate::lookup::RegistryLookup;

/// Answers from a fixed table keyed by normalized CNPJ.
#[derive(Default)]
pub struct StaticRegistry {
    entries: HashMap<String, CompanyRegistration>,
    calls: AtomicUsize,
}

impl StaticRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_company(mut self, registration: CompanyRegistration) -> Self {
        self.entries
            .insert(cnpj::normalize(&registration.cnpj), registration);
        self
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryLookup for StaticRegistry {
    async fn lookup(&self, raw_cnpj: &str) -> Option<CompanyRegistration> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entries.get(&cnpj::normalize(raw_cnpj)).cloned()
    }
}
