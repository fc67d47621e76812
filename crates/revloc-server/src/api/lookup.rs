//! Passthrough lookups: CNPJ registry and free-form address geocoding.

use axum::{extract::State, Extension, Json};
use revloc_core::{cnpj, CompanyRegistration, Coordinates, GeocodeSource};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct LookupRequest {
    pub cnpj: String,
}

#[derive(Debug, Serialize)]
pub(super) struct LookupResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CompanyRegistration>,
    pub message: String,
    pub meta: ResponseMeta,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeRequest {
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct GeocodeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<GeocodeSource>,
    pub message: String,
    pub meta: ResponseMeta,
}

pub(super) async fn lookup_company(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<LookupRequest>,
) -> Json<LookupResponse> {
    let meta = ResponseMeta::new(req_id.0);

    if !cnpj::validate(&body.cnpj) {
        return Json(LookupResponse {
            success: false,
            data: None,
            message: "Invalid CNPJ.".to_string(),
            meta,
        });
    }

    match state.registry.lookup(&body.cnpj).await {
        Some(company) => Json(LookupResponse {
            success: true,
            data: Some(company),
            message: "Company found.".to_string(),
            meta,
        }),
        None => Json(LookupResponse {
            success: false,
            data: None,
            message: "Company not found in the registry.".to_string(),
            meta,
        }),
    }
}

pub(super) async fn geocode_address(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<GeocodeRequest>,
) -> Json<GeocodeResponse> {
    let meta = ResponseMeta::new(req_id.0);

    if body.address.trim().is_empty() {
        return Json(GeocodeResponse {
            success: false,
            data: None,
            source: None,
            message: "Address is required.".to_string(),
            meta,
        });
    }

    let result = state
        .gateway
        .resolve_address(&body.address, body.city.as_deref(), body.state.as_deref())
        .await;

    match result {
        Some(found) => Json(GeocodeResponse {
            success: true,
            data: Some(found.coordinates),
            source: Some(found.source),
            message: "Address located.".to_string(),
            meta,
        }),
        None => Json(GeocodeResponse {
            success: false,
            data: None,
            source: None,
            message: "Could not locate the informed address.".to_string(),
            meta,
        }),
    }
}
