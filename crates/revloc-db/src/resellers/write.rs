//! Write operations for the `resellers` table.

use std::time::Duration;

use revloc_core::{EnrichmentUpdate, NewReseller};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::types::ResellerRow;

/// Age after which an enrichment claim no longer blocks another pass.
pub const CLAIM_STALE_AFTER: Duration = Duration::from_secs(15 * 60);

const INSERT_CHUNK_SIZE: usize = 1000;

/// Insert a batch of new resellers, `INSERT_CHUNK_SIZE` rows per statement.
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if any chunk fails. Chunks already written stay
/// written.
pub async fn insert_resellers(pool: &PgPool, resellers: &[NewReseller]) -> Result<u64, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    insert_batch(&mut conn, resellers).await
}

/// Rows touched by [`replace_resellers_by_cnpj`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub removed: u64,
    pub inserted: u64,
}

/// Delete every existing reseller sharing a CNPJ with the batch, then insert
/// the batch.
///
/// Both steps run inside a single transaction; if any insert fails the
/// deletions are rolled back and the table is left as it was.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if any statement or the commit fails.
pub async fn replace_resellers_by_cnpj(
    pool: &PgPool,
    resellers: &[NewReseller],
) -> Result<ReplaceOutcome, sqlx::Error> {
    let cnpjs: Vec<String> = resellers.iter().filter_map(|r| r.cnpj.clone()).collect();

    let mut tx = pool.begin().await?;
    let removed = delete_by_cnpjs_on(&mut tx, &cnpjs).await?;
    let inserted = insert_batch(&mut tx, resellers).await?;
    tx.commit().await?;

    Ok(ReplaceOutcome { removed, inserted })
}

async fn insert_batch(conn: &mut PgConnection, resellers: &[NewReseller]) -> Result<u64, sqlx::Error> {
    let mut inserted = 0_u64;
    for chunk in resellers.chunks(INSERT_CHUNK_SIZE) {
        inserted += insert_chunk(conn, chunk).await?;
    }
    Ok(inserted)
}

async fn insert_chunk(conn: &mut PgConnection, chunk: &[NewReseller]) -> Result<u64, sqlx::Error> {
    if chunk.is_empty() {
        return Ok(0);
    }

    // One parallel Vec per column for UNNEST binding.
    let n = chunk.len();
    let mut ids: Vec<Uuid> = Vec::with_capacity(n);
    let mut names: Vec<String> = Vec::with_capacity(n);
    let mut cnpjs: Vec<Option<String>> = Vec::with_capacity(n);
    let mut addresses: Vec<String> = Vec::with_capacity(n);
    let mut neighborhoods: Vec<String> = Vec::with_capacity(n);
    let mut cities: Vec<String> = Vec::with_capacity(n);
    let mut states: Vec<String> = Vec::with_capacity(n);
    let mut ceps: Vec<String> = Vec::with_capacity(n);
    let mut phones: Vec<String> = Vec::with_capacity(n);
    let mut whatsapps: Vec<String> = Vec::with_capacity(n);
    let mut hours: Vec<String> = Vec::with_capacity(n);
    let mut latitudes: Vec<Option<f64>> = Vec::with_capacity(n);
    let mut longitudes: Vec<Option<f64>> = Vec::with_capacity(n);
    let mut sources: Vec<Option<String>> = Vec::with_capacity(n);
    let mut actives: Vec<bool> = Vec::with_capacity(n);
    let mut enriched: Vec<bool> = Vec::with_capacity(n);
    let mut radii: Vec<Option<f64>> = Vec::with_capacity(n);
    let mut priorities: Vec<i32> = Vec::with_capacity(n);

    for r in chunk {
        ids.push(Uuid::new_v4());
        names.push(r.name.clone());
        cnpjs.push(r.cnpj.clone());
        addresses.push(r.address.clone());
        neighborhoods.push(r.neighborhood.clone());
        cities.push(r.city.clone());
        states.push(r.state.clone());
        ceps.push(r.cep.clone());
        phones.push(r.phone.clone());
        whatsapps.push(r.whatsapp.clone());
        hours.push(r.hours.clone());
        latitudes.push(r.coordinates.map(|c| c.lat));
        longitudes.push(r.coordinates.map(|c| c.lng));
        sources.push(r.geocoding_source.map(|s| s.as_str().to_string()));
        actives.push(r.active);
        enriched.push(r.data_enriched);
        radii.push(r.service_radius_km);
        priorities.push(r.priority);
    }

    let rows_affected = sqlx::query(
        "INSERT INTO resellers \
             (id, name, cnpj, address, neighborhood, city, state, cep, phone, whatsapp, \
              hours, latitude, longitude, geocoding_source, active, data_enriched, \
              service_radius_km, priority) \
         SELECT * FROM UNNEST(\
              $1::uuid[], $2::text[], $3::text[], $4::text[], $5::text[], $6::text[], \
              $7::text[], $8::text[], $9::text[], $10::text[], $11::text[], \
              $12::float8[], $13::float8[], $14::text[], $15::bool[], $16::bool[], \
              $17::float8[], $18::int4[])",
    )
    .bind(&ids)
    .bind(&names)
    .bind(&cnpjs)
    .bind(&addresses)
    .bind(&neighborhoods)
    .bind(&cities)
    .bind(&states)
    .bind(&ceps)
    .bind(&phones)
    .bind(&whatsapps)
    .bind(&hours)
    .bind(&latitudes)
    .bind(&longitudes)
    .bind(&sources)
    .bind(&actives)
    .bind(&enriched)
    .bind(&radii)
    .bind(&priorities)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(rows_affected)
}

/// Insert one reseller and return the stored row.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the insert fails.
pub async fn insert_reseller(pool: &PgPool, reseller: &NewReseller) -> Result<ResellerRow, sqlx::Error> {
    sqlx::query_as::<_, ResellerRow>(
        "INSERT INTO resellers \
             (id, name, cnpj, address, neighborhood, city, state, cep, phone, whatsapp, \
              hours, latitude, longitude, geocoding_source, active, data_enriched, \
              service_radius_km, priority) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
         RETURNING id, name, cnpj, address, neighborhood, city, state, cep, phone, whatsapp, \
                   hours, latitude, longitude, geocoding_source, active, data_enriched, \
                   service_radius_km, priority, registry_data, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(&reseller.name)
    .bind(&reseller.cnpj)
    .bind(&reseller.address)
    .bind(&reseller.neighborhood)
    .bind(&reseller.city)
    .bind(&reseller.state)
    .bind(&reseller.cep)
    .bind(&reseller.phone)
    .bind(&reseller.whatsapp)
    .bind(&reseller.hours)
    .bind(reseller.coordinates.map(|c| c.lat))
    .bind(reseller.coordinates.map(|c| c.lng))
    .bind(reseller.geocoding_source.map(|s| s.as_str()))
    .bind(reseller.active)
    .bind(reseller.data_enriched)
    .bind(reseller.service_radius_km)
    .bind(reseller.priority)
    .fetch_one(pool)
    .await
}

/// Delete every reseller whose CNPJ is in `cnpjs`. Returns the count removed.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn delete_resellers_by_cnpjs(pool: &PgPool, cnpjs: &[String]) -> Result<u64, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    delete_by_cnpjs_on(&mut conn, cnpjs).await
}

async fn delete_by_cnpjs_on(conn: &mut PgConnection, cnpjs: &[String]) -> Result<u64, sqlx::Error> {
    if cnpjs.is_empty() {
        return Ok(0);
    }
    let rows_affected = sqlx::query("DELETE FROM resellers WHERE cnpj = ANY($1::text[])")
        .bind(cnpjs)
        .execute(conn)
        .await?
        .rows_affected();
    Ok(rows_affected)
}

/// Try to claim a record for enrichment.
///
/// Succeeds only while the record is still unenriched and carries no claim
/// younger than [`CLAIM_STALE_AFTER`]. Returns `false` when another pass
/// holds it or it was enriched in the meantime.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn claim_for_enrichment(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let claimed = sqlx::query_scalar::<_, Uuid>(
        "UPDATE resellers \
         SET enrichment_claimed_at = NOW() \
         WHERE id = $1 \
           AND data_enriched = FALSE \
           AND (enrichment_claimed_at IS NULL \
                OR enrichment_claimed_at < NOW() - make_interval(secs => $2)) \
         RETURNING id",
    )
    .bind(id)
    .bind(CLAIM_STALE_AFTER.as_secs_f64())
    .fetch_optional(pool)
    .await?;
    Ok(claimed.is_some())
}

/// Drop a claim without enriching, so a later pass can pick the record up.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn release_enrichment_claim(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE resellers SET enrichment_claimed_at = NULL WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Write an enrichment result and mark the record enriched.
///
/// `None` fields keep their stored value. The write only lands while
/// `data_enriched` is still false; returns whether it did.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails or `registry_data` cannot be
/// encoded.
pub async fn apply_enrichment(
    pool: &PgPool,
    id: Uuid,
    update: &EnrichmentUpdate,
) -> Result<bool, sqlx::Error> {
    let registry_data = update
        .registry_data
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    let written = sqlx::query_scalar::<_, Uuid>(
        "UPDATE resellers SET \
             name             = COALESCE($2, name), \
             address          = COALESCE($3, address), \
             neighborhood     = COALESCE($4, neighborhood), \
             city             = COALESCE($5, city), \
             state            = COALESCE($6, state), \
             cep              = COALESCE($7, cep), \
             phone            = COALESCE($8, phone), \
             registry_data    = COALESCE($9, registry_data), \
             latitude         = COALESCE($10, latitude), \
             longitude        = COALESCE($11, longitude), \
             geocoding_source = CASE WHEN $10 IS NULL THEN geocoding_source \
                                     ELSE COALESCE($12, geocoding_source) END, \
             data_enriched    = TRUE, \
             enrichment_claimed_at = NULL, \
             updated_at       = NOW() \
         WHERE id = $1 AND data_enriched = FALSE \
         RETURNING id",
    )
    .bind(id)
    .bind(&update.name)
    .bind(&update.address)
    .bind(&update.neighborhood)
    .bind(&update.city)
    .bind(&update.state)
    .bind(&update.cep)
    .bind(&update.phone)
    .bind(registry_data)
    .bind(update.coordinates.map(|c| c.lat))
    .bind(update.coordinates.map(|c| c.lng))
    .bind(update.geocoding_source.map(|s| s.as_str()))
    .fetch_optional(pool)
    .await?;

    Ok(written.is_some())
}

/// Mark a record enriched without changing any data (registry miss).
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn mark_enriched_without_data(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let written = sqlx::query_scalar::<_, Uuid>(
        "UPDATE resellers \
         SET data_enriched = TRUE, enrichment_claimed_at = NULL, updated_at = NOW() \
         WHERE id = $1 AND data_enriched = FALSE \
         RETURNING id",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(written.is_some())
}

/// Toggle the `active` flag. Returns the updated row, or `None` if no such id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn set_reseller_active(
    pool: &PgPool,
    id: Uuid,
    active: bool,
) -> Result<Option<ResellerRow>, sqlx::Error> {
    sqlx::query_as::<_, ResellerRow>(
        "UPDATE resellers SET active = $2, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, name, cnpj, address, neighborhood, city, state, cep, phone, whatsapp, \
                   hours, latitude, longitude, geocoding_source, active, data_enriched, \
                   service_radius_km, priority, registry_data, created_at, updated_at",
    )
    .bind(id)
    .bind(active)
    .fetch_optional(pool)
    .await
}

/// Clear `data_enriched` and any claim, for one CNPJ or for every record.
///
/// `cnpj` must already be normalized. Returns the number of rows reset.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn reset_enrichment(pool: &PgPool, cnpj: Option<&str>) -> Result<u64, sqlx::Error> {
    let rows_affected = sqlx::query(
        "UPDATE resellers \
         SET data_enriched = FALSE, enrichment_claimed_at = NULL, updated_at = NOW() \
         WHERE (data_enriched = TRUE OR enrichment_claimed_at IS NOT NULL) \
           AND ($1::text IS NULL OR cnpj = $1)",
    )
    .bind(cnpj)
    .execute(pool)
    .await?
    .rows_affected();
    Ok(rows_affected)
}
