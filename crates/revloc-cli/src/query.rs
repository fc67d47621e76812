//! Read-only query handlers: proximity search and provider passthroughs.

use std::sync::Arc;

use revloc_engine::{PgStore, ProximitySearchEngine, SearchRequest, SearchSettings};
use revloc_geo::{GeocodingGateway, PostalCodeResolver};
use revloc_registry::RegistryClient;

use crate::data::truncate;

/// Search for resellers near a CEP and print them nearest first.
///
/// # Errors
///
/// Returns an error if the geocoding gateway cannot be built or the
/// candidate list cannot be loaded.
pub(crate) async fn run_search(
    pool: &sqlx::PgPool,
    config: &revloc_core::AppConfig,
    cep: String,
    max_distance_km: Option<f64>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let gateway = GeocodingGateway::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build geocoding gateway: {e}"))?;
    let engine = ProximitySearchEngine::new(
        PostalCodeResolver::new(Arc::new(gateway)),
        Arc::new(PgStore::new(pool.clone())),
        SearchSettings::from_app_config(config),
    );

    let request = SearchRequest {
        cep,
        max_distance_km,
        limit,
    };
    let outcome = engine.search(&request).await?;

    if let Some(message) = &outcome.message {
        println!("{message}");
    }
    if outcome.results.is_empty() {
        return Ok(());
    }

    println!("{:<10}{:<40}{:<24}PHONE", "KM", "NAME", "CITY");
    for result in &outcome.results {
        println!(
            "{:<10.1}{:<40}{:<24}{}",
            result.distance,
            truncate(&result.name, 38),
            truncate(&format!("{}/{}", result.city, result.state), 22),
            result.phone
        );
    }
    Ok(())
}

/// Look up a CNPJ and print the registry record as JSON.
///
/// # Errors
///
/// Returns an error if the client cannot be built, the CNPJ is invalid, or
/// the registry request fails.
pub(crate) async fn run_lookup(
    config: &revloc_core::AppConfig,
    raw_cnpj: &str,
) -> anyhow::Result<()> {
    if !revloc_core::cnpj::validate(raw_cnpj) {
        anyhow::bail!("invalid CNPJ '{raw_cnpj}'");
    }

    let client = RegistryClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build registry client: {e}"))?;

    match client.try_lookup(raw_cnpj).await? {
        Some(company) => println!("{}", serde_json::to_string_pretty(&company)?),
        None => println!(
            "no registry record for CNPJ {}",
            revloc_core::cnpj::normalize(raw_cnpj)
        ),
    }
    Ok(())
}

/// Geocode an address through the provider chain.
///
/// # Errors
///
/// Returns an error if the gateway cannot be built.
pub(crate) async fn run_geocode(
    config: &revloc_core::AppConfig,
    address: &str,
    city: Option<&str>,
    state: Option<&str>,
) -> anyhow::Result<()> {
    let gateway = GeocodingGateway::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build geocoding gateway: {e}"))?;

    match gateway.resolve_address(address, city, state).await {
        Some(found) => println!(
            "{:.6},{:.6} ({}) {}",
            found.coordinates.lat,
            found.coordinates.lng,
            found.source.as_str(),
            found.formatted_address
        ),
        None => println!("could not locate '{address}'"),
    }
    Ok(())
}
