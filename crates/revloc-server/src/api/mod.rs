mod data;
mod lookup;
mod resellers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use revloc_engine::{
    EnrichmentPipeline, EnrichmentSettings, ProximitySearchEngine, ResellerStore, SearchSettings,
    StoreError,
};
use revloc_geo::{GeocodingGateway, PostalCodeResolver};
use revloc_registry::RegistryLookup;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResellerStore>,
    pub search: Arc<ProximitySearchEngine>,
    pub enrichment: Arc<EnrichmentPipeline>,
    pub registry: Arc<dyn RegistryLookup>,
    pub gateway: Arc<GeocodingGateway>,
}

impl AppState {
    /// Wire the search engine and enrichment pipeline over shared
    /// collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn ResellerStore>,
        registry: Arc<dyn RegistryLookup>,
        gateway: Arc<GeocodingGateway>,
        search: SearchSettings,
        enrichment: EnrichmentSettings,
    ) -> Self {
        let resolver = PostalCodeResolver::new(Arc::clone(&gateway));
        let search = Arc::new(ProximitySearchEngine::new(
            resolver,
            Arc::clone(&store),
            search,
        ));
        let enrichment = Arc::new(EnrichmentPipeline::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            Arc::clone(&gateway),
            enrichment,
        ));
        Self {
            store,
            search,
            enrichment,
            registry,
            gateway,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_store_error(request_id: String, error: &StoreError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

/// Storefront-facing routes: rate limited, no credentials.
fn public_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/resellers/search", post(resellers::search_resellers))
        .route("/api/v1/resellers", get(resellers::list_resellers))
        .route("/api/v1/registry/lookup", post(lookup::lookup_company))
        .route("/api/v1/geocode", post(lookup::geocode_address))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

fn admin_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/resellers", post(resellers::create_reseller))
        .route("/api/v1/resellers/{id}", patch(resellers::update_reseller))
        .route("/api/v1/data/import", post(data::import_resellers))
        .route("/api/v1/data/enrich", post(data::run_enrichment))
        .route("/api/v1/data/smart-enrich", post(data::run_smart_enrichment))
        .route(
            "/api/v1/data/reset-enrichment",
            post(data::reset_enrichment),
        )
        .route("/api/v1/data/stats", get(data::reseller_stats))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let health_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(health_routes)
        .merge(public_router(rate_limit.clone()))
        .merge(admin_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
