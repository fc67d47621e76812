//! Administrative data handlers: CSV import, enrichment passes, reset, stats.

use axum::{extract::State, Extension, Json};
use revloc_core::ResellerStats;
use revloc_engine::{import_csv, EnrichmentKind, EnrichmentReport, ImportReport};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Shared shape for import and enrichment results.
#[derive(Debug, Serialize)]
pub(super) struct DataOperationResponse {
    pub success: bool,
    pub total_imported: usize,
    pub total_enriched: usize,
    pub errors: Vec<String>,
    pub message: String,
    pub meta: ResponseMeta,
}

impl DataOperationResponse {
    fn from_import(report: ImportReport, meta: ResponseMeta) -> Self {
        Self {
            success: report.success,
            total_imported: report.total_imported,
            total_enriched: 0,
            errors: report.errors,
            message: report.message,
            meta,
        }
    }

    fn from_enrichment(report: EnrichmentReport, meta: ResponseMeta) -> Self {
        Self {
            success: report.success,
            total_imported: report.considered,
            total_enriched: report.enriched,
            errors: report.errors,
            message: report.message,
            meta,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ResetRequest {
    #[serde(default)]
    pub cnpj: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ResetResponse {
    pub success: bool,
    pub total_reset: u64,
    pub meta: ResponseMeta,
}

/// The body is the raw CSV text.
pub(super) async fn import_resellers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: String,
) -> Json<DataOperationResponse> {
    let report = import_csv(state.store.as_ref(), body.as_bytes()).await;
    Json(DataOperationResponse::from_import(
        report,
        ResponseMeta::new(req_id.0),
    ))
}

pub(super) async fn run_enrichment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<DataOperationResponse> {
    run_pass(&state, req_id, EnrichmentKind::Plain).await
}

pub(super) async fn run_smart_enrichment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<DataOperationResponse> {
    run_pass(&state, req_id, EnrichmentKind::Smart).await
}

async fn run_pass(
    state: &AppState,
    req_id: RequestId,
    kind: EnrichmentKind,
) -> Json<DataOperationResponse> {
    let report = state.enrichment.run(kind).await;
    Json(DataOperationResponse::from_enrichment(
        report,
        ResponseMeta::new(req_id.0),
    ))
}

/// Without a body (or without `cnpj`) every record is reopened.
pub(super) async fn reset_enrichment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Option<Json<ResetRequest>>,
) -> Result<Json<ResetResponse>, ApiError> {
    let Json(request) = body.unwrap_or_default();
    let total_reset = state
        .enrichment
        .reset(request.cnpj.as_deref())
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ResetResponse {
        success: true,
        total_reset,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn reseller_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ResellerStats>>, ApiError> {
    let data = state
        .store
        .stats()
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
