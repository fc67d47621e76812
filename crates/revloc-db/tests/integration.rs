//! Offline unit tests for revloc-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use revloc_core::{AppConfig, CoordinateSource, Environment};
use revloc_db::{PoolConfig, ResellerRow, ResellerStatsRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use uuid::Uuid;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        google_maps_api_key: None,
        http_timeout_secs: 10,
        user_agent: "ua".to_string(),
        google_base_url: "http://google.invalid/".to_string(),
        nominatim_base_url: "http://nominatim.invalid/".to_string(),
        registry_base_url: "http://registry.invalid/".to_string(),
        nominatim_min_interval_ms: 1000,
        rate_limit_backoff_ms: 500,
        search_max_distance_km: 50.0,
        search_limit: 10,
        enrich_batch_size: 10,
        enrich_batch_delay_ms: 1000,
        enrich_record_delay_ms: 300,
        smart_enrich_cap: 1000,
        smart_enrich_batch_size: 15,
        smart_enrich_batch_delay_ms: 500,
        registry_batch_concurrency: 3,
        registry_batch_delay_ms: 300,
        geocode_batch_concurrency: 5,
        geocode_batch_delay_ms: 200,
        enrich_cron: None,
    }
}

fn row() -> ResellerRow {
    ResellerRow {
        id: Uuid::new_v4(),
        name: "Loja Centro".to_string(),
        cnpj: Some("12345678000195".to_string()),
        address: "Rua A, 10".to_string(),
        neighborhood: "Centro".to_string(),
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
        cep: "01001-000".to_string(),
        phone: String::new(),
        whatsapp: String::new(),
        hours: "Segunda a Sábado: 8h às 18h".to_string(),
        latitude: Some(-23.55),
        longitude: Some(-46.63),
        geocoding_source: Some("openstreetmap".to_string()),
        active: true,
        data_enriched: true,
        service_radius_km: None,
        priority: 3,
        registry_data: Some(serde_json::json!({
            "cnpj": "12345678000195",
            "company_name": "LOJA CENTRO LTDA",
            "trade_name": null,
            "main_activity": null,
            "status": "ATIVA",
            "phone": null,
            "email": null
        })),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn row_converts_into_domain_record() {
    let reseller = row().into_reseller();

    let coords = reseller.coordinates.expect("coordinates");
    assert!((coords.lat + 23.55).abs() < f64::EPSILON);
    assert_eq!(reseller.geocoding_source, Some(CoordinateSource::OpenStreetMap));
    let registry = reseller.registry_data.as_ref().expect("registry data");
    assert_eq!(registry.company_name.as_deref(), Some("LOJA CENTRO LTDA"));
    assert!(reseller.is_searchable());
}

#[test]
fn row_with_half_a_coordinate_pair_has_no_coordinates() {
    let mut r = row();
    r.longitude = None;
    assert!(r.into_reseller().coordinates.is_none());
}

#[test]
fn row_drops_unknown_source_and_unreadable_registry_payload() {
    let mut r = row();
    r.geocoding_source = Some("carrier_pigeon".to_string());
    r.registry_data = Some(serde_json::json!(["not", "an", "object"]));

    let reseller = r.into_reseller();
    assert!(reseller.geocoding_source.is_none());
    assert!(reseller.registry_data.is_none());
}

#[test]
fn stats_row_fills_percentages() {
    let stats = ResellerStatsRow {
        total: 8,
        active: 6,
        enriched: 3,
        with_coordinates: 2,
        with_registry_data: 3,
        with_phone: 5,
        with_whatsapp: 1,
        primary_geocoded: 1,
        high_priority: 0,
    }
    .into_stats();

    assert_eq!(stats.total, 8);
    assert!((stats.enrichment_pct - 37.5).abs() < 1e-9);
    assert!((stats.coordinates_pct - 25.0).abs() < 1e-9);
    assert!((stats.primary_geocoded_pct - 12.5).abs() < 1e-9);
}

#[test]
fn empty_stats_row_has_zero_percentages() {
    let stats = ResellerStatsRow::default().into_stats();
    assert_eq!(stats.total, 0);
    assert!(stats.enrichment_pct.abs() < f64::EPSILON);
}
