//! Data maintenance command handlers: import, enrichment, reset, stats.
//!
//! These are called from `main` after the database pool and config are
//! established. Enrichment failures on single records are reported in the
//! summary rather than aborting the run.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use revloc_engine::{
    import_csv, EnrichmentKind, EnrichmentPipeline, EnrichmentSettings, PgStore, ResellerStore,
};
use revloc_geo::GeocodingGateway;
use revloc_registry::RegistryClient;

/// Wire the enrichment pipeline over the Postgres store and live providers.
pub(crate) fn build_pipeline(
    pool: &sqlx::PgPool,
    config: &revloc_core::AppConfig,
) -> anyhow::Result<EnrichmentPipeline> {
    let registry = RegistryClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build registry client: {e}"))?;
    let gateway = GeocodingGateway::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build geocoding gateway: {e}"))?;

    Ok(EnrichmentPipeline::new(
        Arc::new(PgStore::new(pool.clone())),
        Arc::new(registry),
        Arc::new(gateway),
        EnrichmentSettings::from_app_config(config),
    ))
}

/// Import a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the import reports failure.
pub(crate) async fn run_import(pool: &sqlx::PgPool, path: &Path) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let store = PgStore::new(pool.clone());
    let report = import_csv(&store, &bytes).await;

    for error in &report.errors {
        tracing::warn!(file = %path.display(), error = %error, "import row skipped");
    }
    println!("{}", report.message);

    if !report.success {
        tracing::error!(file = %path.display(), message = %report.message, "import failed");
        anyhow::bail!("import of {} failed", path.display());
    }
    tracing::info!(
        file = %path.display(),
        imported = report.total_imported,
        skipped = report.errors.len(),
        "import complete"
    );
    Ok(())
}

/// Run a plain or smart enrichment pass.
///
/// When `dry_run` is `true` the planned records are printed and no provider
/// is called.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be built, the candidates cannot be
/// loaded, or the pass reports failure.
pub(crate) async fn run_enrich(
    pool: &sqlx::PgPool,
    config: &revloc_core::AppConfig,
    smart: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let kind = if smart {
        EnrichmentKind::Smart
    } else {
        EnrichmentKind::Plain
    };
    let pipeline = build_pipeline(pool, config)?;

    if dry_run {
        let planned = pipeline.plan(kind).await?;
        println!(
            "dry-run: {kind} pass would process {} resellers",
            planned.len()
        );
        println!("{:<16}{:<40}CITY", "CNPJ", "NAME");
        for reseller in &planned {
            println!(
                "{:<16}{:<40}{}",
                reseller.cnpj.as_deref().unwrap_or_default(),
                truncate(&reseller.name, 38),
                reseller.city
            );
        }
        return Ok(());
    }

    let report = pipeline.run(kind).await;
    for error in &report.errors {
        tracing::warn!(pass = %kind, error = %error, "reseller enrichment failed");
    }
    println!("{}", report.message);

    if !report.success {
        tracing::error!(pass = %kind, message = %report.message, "enrichment pass failed");
        anyhow::bail!("{kind} enrichment pass failed");
    }
    tracing::info!(
        pass = %kind,
        considered = report.considered,
        enriched = report.enriched,
        "enrichment pass complete"
    );
    Ok(())
}

/// Reopen enriched records.
///
/// # Errors
///
/// Returns an error if the update fails.
pub(crate) async fn run_reset(
    pool: &sqlx::PgPool,
    config: &revloc_core::AppConfig,
    cnpj: Option<&str>,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(pool, config)?;
    let count = pipeline.reset(cnpj).await?;
    tracing::info!(cnpj = ?cnpj, count, "enrichment flags reset");
    match cnpj {
        Some(id) => println!("reset {count} reseller(s) matching CNPJ {id}"),
        None => println!("reset {count} reseller(s)"),
    }
    Ok(())
}

/// Print data-quality counters.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_stats(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let stats = PgStore::new(pool.clone()).stats().await?;

    println!("{:<22}{}", "total", stats.total);
    println!("{:<22}{}", "active", stats.active);
    println!(
        "{:<22}{} ({:.1}%)",
        "enriched", stats.enriched, stats.enrichment_pct
    );
    println!(
        "{:<22}{} ({:.1}%)",
        "with coordinates", stats.with_coordinates, stats.coordinates_pct
    );
    println!(
        "{:<22}{} ({:.1}%)",
        "google geocoded", stats.primary_geocoded, stats.primary_geocoded_pct
    );
    println!("{:<22}{}", "with registry data", stats.with_registry_data);
    println!("{:<22}{}", "with phone", stats.with_phone);
    println!("{:<22}{}", "with whatsapp", stats.with_whatsapp);
    println!("{:<22}{}", "high priority", stats.high_priority);
    Ok(())
}

/// Shorten `value` to at most `max` characters for table output.
pub(crate) fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        format!("{}...", value.chars().take(max.saturating_sub(3)).collect::<String>())
    } else {
        value.to_string()
    }
}
