//! Reseller handlers: proximity search, listing, and administrative writes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use revloc_core::{cnpj, CoordinateSource, Coordinates, NewReseller, Reseller, SearchResult};
use revloc_engine::{SearchRequest, StoreError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    pub success: bool,
    pub data: Vec<SearchResult>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub meta: ResponseMeta,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateResellerRequest {
    pub name: String,
    pub cnpj: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub whatsapp: String,
    pub hours: Option<String>,
    pub coordinates: Coordinates,
    pub service_radius_km: Option<f64>,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateResellerRequest {
    pub active: bool,
}

/// Search never fails on bad input: an invalid CEP is a `success: false`
/// body with a 200.
pub(super) async fn search_resellers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let outcome = state
        .search
        .search(&request)
        .await
        .map_err(|e| {
            tracing::error!(cep = %request.cep, error = %e, "reseller search failed");
            ApiError::new(req_id.0.clone(), "internal_error", "failed to load resellers")
        })?;

    Ok(Json(SearchResponse {
        success: outcome.success,
        total: outcome.results.len(),
        data: outcome.results,
        message: outcome.message,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_resellers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Reseller>>>, ApiError> {
    let data = state
        .store
        .list_searchable()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_reseller(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateResellerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Reseller>>), ApiError> {
    let new = validate_create(body).map_err(|msg| {
        ApiError::new(req_id.0.clone(), "validation_error", msg)
    })?;

    let created = state.store.insert_one(&new).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::new(
                req_id.0.clone(),
                "conflict",
                "a reseller with this CNPJ already exists",
            )
        } else {
            map_store_error(req_id.0.clone(), &e)
        }
    })?;

    tracing::info!(id = %created.id, name = %created.name, "reseller created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: created,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn update_reseller(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateResellerRequest>,
) -> Result<Json<ApiResponse<Reseller>>, ApiError> {
    let updated = state
        .store
        .set_active(id, body.active)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("reseller {id} not found"),
            )
        })?;

    tracing::info!(id = %id, active = body.active, "reseller active flag updated");
    Ok(Json(ApiResponse {
        data: updated,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn validate_create(body: CreateResellerRequest) -> Result<NewReseller, String> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err("name must not be empty".to_string());
    }
    if !body.coordinates.is_valid() {
        return Err("coordinates must be a valid latitude/longitude pair".to_string());
    }
    let cnpj = match body.cnpj.as_deref().map(str::trim) {
        Some(raw) if cnpj::is_present(raw) => {
            if !cnpj::validate(raw) {
                return Err(format!("invalid CNPJ: {raw}"));
            }
            Some(cnpj::normalize(raw))
        }
        _ => None,
    };
    if body.service_radius_km.is_some_and(|r| !r.is_finite() || r <= 0.0) {
        return Err("service_radius_km must be a positive number".to_string());
    }

    Ok(NewReseller {
        name: name.to_string(),
        cnpj,
        address: body.address,
        neighborhood: body.neighborhood,
        city: body.city,
        state: body.state,
        cep: body.cep,
        phone: body.phone,
        whatsapp: body.whatsapp,
        hours: body
            .hours
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| revloc_core::DEFAULT_HOURS.to_string()),
        coordinates: Some(body.coordinates),
        geocoding_source: Some(CoordinateSource::Manual),
        active: true,
        data_enriched: false,
        service_radius_km: body.service_radius_km,
        priority: body.priority,
    })
}

fn is_unique_violation(error: &StoreError) -> bool {
    match error {
        StoreError::Sqlx(sqlx::Error::Database(db)) => db.is_unique_violation(),
        _ => false,
    }
}
