//! Read operations for the `resellers` table.

use sqlx::PgPool;
use uuid::Uuid;

use super::types::{ResellerRow, ResellerStatsRow};

/// Return every active reseller that has coordinates.
///
/// Ordered by `created_at, id` so search ties resolve the same way on
/// every call.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_searchable_resellers(pool: &PgPool) -> Result<Vec<ResellerRow>, sqlx::Error> {
    sqlx::query_as::<_, ResellerRow>(
        "SELECT id, name, cnpj, address, neighborhood, city, state, cep, phone, whatsapp, \
                hours, latitude, longitude, geocoding_source, active, data_enriched, \
                service_radius_km, priority, registry_data, created_at, updated_at \
         FROM resellers \
         WHERE active = TRUE \
           AND latitude IS NOT NULL \
           AND longitude IS NOT NULL \
         ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await
}

/// Return records not yet enriched that carry a CNPJ with at least one digit.
///
/// With `active_only`, inactive records are left out as well.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_enrichment_candidates(
    pool: &PgPool,
    active_only: bool,
) -> Result<Vec<ResellerRow>, sqlx::Error> {
    sqlx::query_as::<_, ResellerRow>(
        "SELECT id, name, cnpj, address, neighborhood, city, state, cep, phone, whatsapp, \
                hours, latitude, longitude, geocoding_source, active, data_enriched, \
                service_radius_km, priority, registry_data, created_at, updated_at \
         FROM resellers \
         WHERE data_enriched = FALSE \
           AND cnpj ~ '[0-9]' \
           AND ($1 = FALSE OR active = TRUE) \
         ORDER BY created_at, id",
    )
    .bind(active_only)
    .fetch_all(pool)
    .await
}

/// Fetch a single reseller by id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_reseller(pool: &PgPool, id: Uuid) -> Result<Option<ResellerRow>, sqlx::Error> {
    sqlx::query_as::<_, ResellerRow>(
        "SELECT id, name, cnpj, address, neighborhood, city, state, cep, phone, whatsapp, \
                hours, latitude, longitude, geocoding_source, active, data_enriched, \
                service_radius_km, priority, registry_data, created_at, updated_at \
         FROM resellers \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Aggregate counters over the whole table.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn reseller_stats(pool: &PgPool) -> Result<ResellerStatsRow, sqlx::Error> {
    sqlx::query_as::<_, ResellerStatsRow>(
        "SELECT \
            COUNT(*) AS total, \
            COUNT(*) FILTER (WHERE active = TRUE) AS active, \
            COUNT(*) FILTER (WHERE data_enriched = TRUE) AS enriched, \
            COUNT(*) FILTER (\
                WHERE latitude IS NOT NULL AND longitude IS NOT NULL\
            ) AS with_coordinates, \
            COUNT(*) FILTER (WHERE registry_data IS NOT NULL) AS with_registry_data, \
            COUNT(*) FILTER (WHERE phone != '') AS with_phone, \
            COUNT(*) FILTER (WHERE whatsapp != '') AS with_whatsapp, \
            COUNT(*) FILTER (WHERE geocoding_source = 'google_maps') AS primary_geocoded, \
            COUNT(*) FILTER (WHERE priority > 5) AS high_priority \
         FROM resellers",
    )
    .fetch_one(pool)
    .await
}
