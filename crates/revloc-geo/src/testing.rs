//! In-process geocoder doubles for tests in this and downstream crates.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use revloc_core::{AddressComponents, Coordinates, GeocodeResult, GeocodeSource};

use crate::error::GeoError;
use crate::provider::Geocoder;

/// Answers from a fixed table: the first entry whose key is contained in the
/// query wins. Unknown queries resolve to `Ok(None)`.
pub struct StaticGeocoder {
    source: GeocodeSource,
    answers: Vec<(String, Coordinates)>,
    failing: bool,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl StaticGeocoder {
    #[must_use]
    pub fn new(source: GeocodeSource) -> Self {
        Self {
            source,
            answers: Vec::new(),
            failing: false,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// A geocoder whose every call errors.
    #[must_use]
    pub fn failing(source: GeocodeSource) -> Self {
        Self {
            failing: true,
            ..Self::new(source)
        }
    }

    #[must_use]
    pub fn with_answer(mut self, key: &str, coordinates: Coordinates) -> Self {
        self.answers.push((key.to_string(), coordinates));
        self
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    fn source(&self) -> GeocodeSource {
        self.source
    }

    async fn geocode(&self, query: &str) -> Result<Option<GeocodeResult>, GeoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_string());

        if self.failing {
            return Err(GeoError::Provider {
                provider: self.source.as_str(),
                status: "503 Service Unavailable".to_string(),
            });
        }

        Ok(self
            .answers
            .iter()
            .find(|(key, _)| query.contains(key.as_str()))
            .map(|(_, coordinates)| GeocodeResult {
                coordinates: *coordinates,
                components: AddressComponents::default(),
                formatted_address: query.to_string(),
                source: self.source,
                place_id: None,
            }))
    }
}
