use std::sync::Arc;
use std::time::Duration;

use revloc_core::{CompanyRegistration, CoordinateSource, Coordinates, GeocodeSource};
use revloc_geo::testing::StaticGeocoder;
use revloc_geo::GeocodingGateway;
use revloc_registry::testing::StaticRegistry;

use super::*;
use crate::store::ResellerStore;
use crate::fixtures::candidate;
use crate::testing::MemoryStore;

fn immediate() -> EnrichmentSettings {
    EnrichmentSettings {
        batch_delay: Duration::ZERO,
        record_delay: Duration::ZERO,
        smart_batch_delay: Duration::ZERO,
        registry_delay: Duration::ZERO,
        geocode_delay: Duration::ZERO,
        ..EnrichmentSettings::default()
    }
}

fn company(cnpj: &str, name: &str, street: &str) -> CompanyRegistration {
    CompanyRegistration {
        cnpj: cnpj.to_string(),
        company_name: Some(name.to_string()),
        street: Some(street.to_string()),
        number: Some("100".to_string()),
        city: Some("SAO PAULO".to_string()),
        state: Some("SP".to_string()),
        postal_code: Some("01302000".to_string()),
        formatted_address: format!("{street}, 100, SAO PAULO, SP, CEP: 01302000"),
        source: "brasilapi".to_string(),
        ..CompanyRegistration::default()
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    registry: Arc<StaticRegistry>,
    geocoder: Arc<StaticGeocoder>,
    pipeline: EnrichmentPipeline,
}

fn harness(
    records: Vec<Reseller>,
    registry: StaticRegistry,
    geocoder: StaticGeocoder,
    settings: EnrichmentSettings,
) -> Harness {
    let store = Arc::new(MemoryStore::with_records(records));
    let registry = Arc::new(registry);
    let geocoder = Arc::new(geocoder);
    let gateway = Arc::new(GeocodingGateway::new(None, geocoder.clone()));
    let pipeline = EnrichmentPipeline::new(store.clone(), registry.clone(), gateway, settings);
    Harness {
        store,
        registry,
        geocoder,
        pipeline,
    }
}

const CONSOLACAO: Coordinates = Coordinates::new(-23.5530, -46.6590);

#[tokio::test]
async fn plain_pass_merges_registry_and_geocode() {
    let record = candidate("loja", "12.345.678/0001-95");
    let id = record.id;
    let h = harness(
        vec![record],
        StaticRegistry::new().with_company(company("12345678000195", "LOJA LTDA", "RUA DA CONSOLACAO")),
        StaticGeocoder::new(GeocodeSource::OpenStreetMap).with_answer("CONSOLACAO", CONSOLACAO),
        immediate(),
    );

    let report = h.pipeline.run(EnrichmentKind::Plain).await;

    assert!(report.success);
    assert_eq!(report.considered, 1);
    assert_eq!(report.enriched, 1);
    let stored = h.store.get(id).expect("record");
    assert!(stored.data_enriched);
    assert_eq!(stored.name, "LOJA LTDA");
    assert_eq!(stored.address, "RUA DA CONSOLACAO, 100");
    assert_eq!(stored.cep, "01302-000");
    assert_eq!(stored.coordinates, Some(CONSOLACAO));
    assert_eq!(stored.geocoding_source, Some(CoordinateSource::OpenStreetMap));
    assert!(stored.registry_data.is_some());

    let queries = h.geocoder.queries();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].ends_with("Brasil"), "got {queries:?}");
}

#[tokio::test]
async fn registry_miss_still_marks_record_enriched() {
    let record = candidate("ghost", "99999999000199");
    let id = record.id;
    let h = harness(
        vec![record],
        StaticRegistry::new(),
        StaticGeocoder::new(GeocodeSource::OpenStreetMap),
        immediate(),
    );

    let report = h.pipeline.run(EnrichmentKind::Plain).await;

    assert_eq!(report.marked_without_data, 1);
    assert_eq!(report.enriched, 0);
    let stored = h.store.get(id).expect("record");
    assert!(stored.data_enriched);
    assert!(stored.registry_data.is_none());
    assert!(stored.coordinates.is_none());
    assert_eq!(h.geocoder.calls(), 0);
}

#[tokio::test]
async fn second_pass_finds_nothing_to_do() {
    let h = harness(
        vec![candidate("ghost", "99999999000199")],
        StaticRegistry::new(),
        StaticGeocoder::new(GeocodeSource::OpenStreetMap),
        immediate(),
    );

    h.pipeline.run(EnrichmentKind::Plain).await;
    let again = h.pipeline.run(EnrichmentKind::Plain).await;

    assert!(again.success);
    assert_eq!(again.considered, 0);
    assert_eq!(again.message, "No resellers to enrich.");
    assert_eq!(h.registry.calls(), 1);
}

#[tokio::test]
async fn record_claimed_by_another_pass_is_skipped() {
    let taken = candidate("taken", "11111111000111");
    let free = candidate("free", "22222222000122");
    let taken_id = taken.id;
    let h = harness(
        vec![taken, free],
        StaticRegistry::new(),
        StaticGeocoder::new(GeocodeSource::OpenStreetMap),
        immediate(),
    );
    h.store.claim_externally(taken_id);

    let report = h.pipeline.run(EnrichmentKind::Plain).await;

    assert_eq!(report.skipped, 1);
    assert_eq!(report.marked_without_data, 1);
    assert!(!h.store.get(taken_id).expect("record").data_enriched);
    assert_eq!(h.registry.calls(), 1);
}

#[tokio::test]
async fn write_failure_is_isolated_and_releases_claim() {
    let broken = candidate("broken", "11111111000111");
    let fine = candidate("fine", "22222222000122");
    let broken_id = broken.id;
    let h = harness(
        vec![broken, fine],
        StaticRegistry::new()
            .with_company(company("11111111000111", "BROKEN LTDA", "RUA A"))
            .with_company(company("22222222000122", "FINE LTDA", "RUA B")),
        StaticGeocoder::new(GeocodeSource::OpenStreetMap),
        immediate(),
    );
    h.store.fail_writes_for(broken_id);

    let report = h.pipeline.run(EnrichmentKind::Plain).await;

    assert!(report.success);
    assert_eq!(report.failed, 1);
    assert_eq!(report.enriched, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("broken:"), "got {:?}", report.errors);
    assert!(!h.store.get(broken_id).expect("record").data_enriched);
    assert!(h
        .store
        .claim_for_enrichment(broken_id)
        .await
        .expect("claim"));
}

#[tokio::test]
async fn candidate_load_failure_is_reported_not_raised() {
    let h = harness(
        vec![candidate("a", "11111111000111")],
        StaticRegistry::new(),
        StaticGeocoder::new(GeocodeSource::OpenStreetMap),
        immediate(),
    );
    h.store.fail_reads();

    for kind in [EnrichmentKind::Plain, EnrichmentKind::Smart] {
        let report = h.pipeline.run(kind).await;
        assert!(!report.success);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.considered, 0);
    }
}

#[tokio::test]
async fn plain_pass_paces_records() {
    let settings = EnrichmentSettings {
        record_delay: Duration::from_millis(100),
        ..immediate()
    };
    let h = harness(
        vec![
            candidate("a", "11111111000111"),
            candidate("b", "22222222000122"),
            candidate("c", "33333333000133"),
        ],
        StaticRegistry::new(),
        StaticGeocoder::new(GeocodeSource::OpenStreetMap),
        settings,
    );

    let start = tokio::time::Instant::now();
    h.pipeline.run(EnrichmentKind::Plain).await;
    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn smart_pass_skips_inactive_and_respects_cap() {
    let mut inactive = candidate("inactive", "11111111000111");
    inactive.active = false;
    let mut best = candidate("best", "22222222000122");
    best.address = "Rua B".to_string();
    let mut geolocated = candidate("geolocated", "33333333000133");
    geolocated.coordinates = Some(CONSOLACAO);
    let plain = candidate("plain", "44444444000144");
    let (inactive_id, geolocated_id) = (inactive.id, geolocated.id);

    let settings = EnrichmentSettings {
        smart_cap: 2,
        smart_batch_size: 1,
        ..immediate()
    };
    let h = harness(
        vec![inactive, geolocated, best, plain],
        StaticRegistry::new().with_company(company("22222222000122", "BEST LTDA", "RUA B")),
        StaticGeocoder::new(GeocodeSource::OpenStreetMap).with_answer("RUA B", CONSOLACAO),
        settings,
    );

    let planned = h.pipeline.plan(EnrichmentKind::Smart).await.expect("plan");
    let names: Vec<_> = planned.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["best", "plain"]);

    let report = h.pipeline.run(EnrichmentKind::Smart).await;

    assert_eq!(report.considered, 2);
    assert_eq!(report.enriched, 1);
    assert_eq!(report.marked_without_data, 1);
    assert!(!h.store.get(inactive_id).expect("record").data_enriched);
    assert!(!h.store.get(geolocated_id).expect("record").data_enriched);
}

#[tokio::test]
async fn smart_pass_batches_lookups_and_geocodes() {
    let records: Vec<_> = (1..=4)
        .map(|i| candidate(&format!("r{i}"), &format!("{i}{i}{i}{i}{i}{i}{i}{i}000{i}{i}{i}")))
        .collect();
    let ids: Vec<_> = records.iter().map(|r| r.id).collect();
    let h = harness(
        records,
        StaticRegistry::new()
            .with_company(company("11111111000111", "UM LTDA", "RUA UM"))
            .with_company(company("33333333000333", "TRES LTDA", "RUA TRES")),
        StaticGeocoder::new(GeocodeSource::OpenStreetMap).with_answer("RUA UM", CONSOLACAO),
        immediate(),
    );

    let report = h.pipeline.run(EnrichmentKind::Smart).await;

    assert_eq!(report.considered, 4);
    assert_eq!(report.enriched, 2);
    assert_eq!(report.marked_without_data, 2);
    assert_eq!(h.registry.calls(), 4);
    assert_eq!(h.geocoder.calls(), 2);

    let first = h.store.get(ids[0]).expect("record");
    assert_eq!(first.coordinates, Some(CONSOLACAO));
    let third = h.store.get(ids[2]).expect("record");
    assert_eq!(third.name, "TRES LTDA");
    assert!(third.coordinates.is_none());
    assert!(h.store.snapshot().iter().all(|r| r.data_enriched));
}

#[tokio::test]
async fn reset_reopens_records_for_another_pass() {
    let a = candidate("a", "11111111000111");
    let b = candidate("b", "22222222000122");
    let h = harness(
        vec![a, b],
        StaticRegistry::new(),
        StaticGeocoder::new(GeocodeSource::OpenStreetMap),
        immediate(),
    );
    h.pipeline.run(EnrichmentKind::Plain).await;

    let one = h.pipeline.reset(Some("11.111.111/0001-11")).await.expect("reset");
    assert_eq!(one, 1);
    let planned = h.pipeline.plan(EnrichmentKind::Plain).await.expect("plan");
    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].name, "a");

    let rest = h.pipeline.reset(Some("  ")).await.expect("reset");
    assert_eq!(rest, 1);
}
