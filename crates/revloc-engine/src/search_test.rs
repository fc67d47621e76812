use std::sync::Arc;

use revloc_core::{Coordinates, GeocodeSource};
use revloc_geo::testing::StaticGeocoder;
use revloc_geo::{GeocodingGateway, PostalCodeResolver};

use super::*;
use crate::fixtures::{reseller, SAO_PAULO};
use crate::testing::MemoryStore;

fn engine(store: Arc<MemoryStore>, geocoder: StaticGeocoder) -> ProximitySearchEngine {
    let gateway = GeocodingGateway::new(None, Arc::new(geocoder));
    ProximitySearchEngine::new(
        PostalCodeResolver::new(Arc::new(gateway)),
        store,
        SearchSettings::default(),
    )
}

fn offline() -> StaticGeocoder {
    StaticGeocoder::new(GeocodeSource::OpenStreetMap)
}

/// A point roughly `km` kilometers north of São Paulo's center.
fn north_of_sao_paulo(km: f64) -> Coordinates {
    Coordinates::new(SAO_PAULO.lat + km / 111.2, SAO_PAULO.lng)
}

#[tokio::test]
async fn invalid_cep_is_a_non_success_without_lookups() {
    let store = Arc::new(MemoryStore::with_records(vec![reseller("A", Some(SAO_PAULO))]));
    let geocoder = offline();
    let outcome = engine(store, geocoder)
        .search(&SearchRequest::new("123"))
        .await
        .expect("search");

    assert!(!outcome.success);
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.message.as_deref(), Some(INVALID_CEP_MESSAGE));
}

#[tokio::test]
async fn unresolvable_cep_is_an_empty_success() {
    let store = Arc::new(MemoryStore::with_records(vec![reseller("A", Some(SAO_PAULO))]));
    // Prefix 99 has no regional entry and the geocoder knows nothing.
    let outcome = engine(store, offline())
        .search(&SearchRequest::new("99999-999"))
        .await
        .expect("search");

    assert!(outcome.success);
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.message.as_deref(), Some(ORIGIN_NOT_FOUND_MESSAGE));
}

#[tokio::test]
async fn empty_store_reports_no_resellers() {
    let store = Arc::new(MemoryStore::new());
    let outcome = engine(store, offline())
        .search(&SearchRequest::new("01310-100"))
        .await
        .expect("search");

    assert!(outcome.success);
    assert_eq!(outcome.message.as_deref(), Some(NO_RESELLERS_MESSAGE));
}

#[tokio::test]
async fn far_resellers_only_report_none_nearby() {
    let rio = Coordinates::new(-22.9068, -43.1729);
    let store = Arc::new(MemoryStore::with_records(vec![reseller("Rio", Some(rio))]));
    let outcome = engine(store, offline())
        .search(&SearchRequest::new("01310100"))
        .await
        .expect("search");

    assert!(outcome.success);
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.message.as_deref(), Some(NONE_NEARBY_MESSAGE));
}

#[tokio::test]
async fn results_are_sorted_bounded_and_exclude_inactive() {
    let mut records: Vec<_> = (0..15)
        .map(|i| reseller(&format!("R{i}"), Some(north_of_sao_paulo(f64::from(i) * 4.0))))
        .collect();
    let mut inactive = reseller("closed", Some(SAO_PAULO));
    inactive.active = false;
    records.push(inactive);
    records.push(reseller("no-coords", None));

    let store = Arc::new(MemoryStore::with_records(records));
    let geocoder = offline().with_answer("01310-100", SAO_PAULO);
    let outcome = engine(store, geocoder)
        .search(&SearchRequest::new("01310-100"))
        .await
        .expect("search");

    assert!(outcome.success);
    assert!(outcome.message.is_none());
    assert_eq!(outcome.results.len(), 10);
    assert!(outcome.results.iter().all(|r| r.distance <= 50.0));
    assert!(outcome
        .results
        .windows(2)
        .all(|w| w[0].distance <= w[1].distance));
    assert!(outcome.results.iter().all(|r| r.name != "closed"));
    assert_eq!(outcome.results[0].name, "R0");
    assert!(outcome.results[0].distance.abs() < f64::EPSILON);
}

#[tokio::test]
async fn per_request_overrides_are_sanitised() {
    let records: Vec<_> = (0..5)
        .map(|i| reseller(&format!("R{i}"), Some(north_of_sao_paulo(f64::from(i) * 10.0))))
        .collect();
    let store = Arc::new(MemoryStore::with_records(records));
    let engine = engine(store, offline().with_answer("01310-100", SAO_PAULO));

    let narrow = engine
        .search(&SearchRequest {
            cep: "01310-100".to_string(),
            max_distance_km: Some(15.0),
            limit: Some(0),
        })
        .await
        .expect("search");
    assert_eq!(narrow.results.len(), 1, "limit 0 clamps to 1");

    let bogus_radius = engine
        .search(&SearchRequest {
            cep: "01310-100".to_string(),
            max_distance_km: Some(-3.0),
            limit: Some(1000),
        })
        .await
        .expect("search");
    // Negative radius falls back to the 50 km default: 0, 10, 20, 30, 40.
    assert_eq!(bogus_radius.results.len(), 5);
}

#[tokio::test]
async fn regional_fallback_supplies_origin_when_geocoder_is_down() {
    let store = Arc::new(MemoryStore::with_records(vec![reseller("Centro", Some(SAO_PAULO))]));
    let outcome = engine(store, StaticGeocoder::failing(GeocodeSource::OpenStreetMap))
        .search(&SearchRequest::new("01001-000"))
        .await
        .expect("search");

    assert!(outcome.success);
    assert_eq!(outcome.results.len(), 1);
}

#[tokio::test]
async fn store_failure_is_the_only_error() {
    let store = Arc::new(MemoryStore::new());
    store.fail_reads();
    let result = engine(store, offline().with_answer("01310-100", SAO_PAULO))
        .search(&SearchRequest::new("01310-100"))
        .await;

    assert!(matches!(result, Err(SearchError::Persistence(_))));
}

#[test]
fn rank_keeps_input_order_for_ties() {
    let a = reseller("first", Some(north_of_sao_paulo(5.0)));
    let b = reseller("second", Some(north_of_sao_paulo(5.0)));
    let ranked = rank(SAO_PAULO, &[a, b], 50.0, 10);
    let names: Vec<_> = ranked.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["first", "second"]);
}

#[test]
fn rank_skips_unknown_distances() {
    let broken = reseller("broken", Some(Coordinates::new(f64::NAN, 0.0)));
    let ranked = rank(SAO_PAULO, &[broken], f64::INFINITY, 10);
    assert!(ranked.is_empty());
}
