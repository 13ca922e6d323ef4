//! HTTP handlers, thin over the ledger.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ayurtrace_ledger::{
    bundle_recent_validated, LedgerError, LedgerStats, ProvenanceTimeline,
};
use ayurtrace_types::{
    score, CollectionEvent, CollectionEventDraft, FinalQuality, ProcessingStep,
    ProcessingStepDraft, Product, ProductDraft, QualityTest, QualityTestDraft, RecordId,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::router::AppState;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ── Collection events ───────────────────────────────────────────────

pub async fn create_collection_event(
    State(state): State<AppState>,
    Json(draft): Json<CollectionEventDraft>,
) -> ApiResult<(StatusCode, Json<CollectionEvent>)> {
    let id = state.store.append_collection_event(draft)?;
    let event = state
        .store
        .get_collection_event(&id)?
        .ok_or_else(|| ApiError::Internal("appended record missing".into()))?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_collection_events(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CollectionEvent>>> {
    Ok(Json(state.store.collection_events()?))
}

pub async fn list_pending_collections(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CollectionEvent>>> {
    Ok(Json(state.store.collections_pending_quality_test()?))
}

pub async fn get_collection_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CollectionEvent>> {
    state
        .store
        .get_collection_event(&RecordId::new(id.clone()))?
        .map(Json)
        .ok_or(ApiError::NotFound(format!("collection event {id}")))
}

// ── Quality tests ───────────────────────────────────────────────────

pub async fn create_quality_test(
    State(state): State<AppState>,
    Json(draft): Json<QualityTestDraft>,
) -> ApiResult<(StatusCode, Json<QualityTest>)> {
    let id = state.store.append_quality_test(draft)?;
    let test = state
        .store
        .get_quality_test(&id)?
        .ok_or_else(|| ApiError::Internal("appended record missing".into()))?;
    Ok((StatusCode::CREATED, Json(test)))
}

pub async fn list_quality_tests(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<QualityTest>>> {
    Ok(Json(state.store.quality_tests()?))
}

// ── Processing steps ────────────────────────────────────────────────

pub async fn create_processing_step(
    State(state): State<AppState>,
    Json(draft): Json<ProcessingStepDraft>,
) -> ApiResult<(StatusCode, Json<ProcessingStep>)> {
    let id = state.store.append_processing_step(draft)?;
    let step = state
        .store
        .get_processing_step(&id)?
        .ok_or_else(|| ApiError::Internal("appended record missing".into()))?;
    Ok((StatusCode::CREATED, Json(step)))
}

pub async fn list_processing_steps(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProcessingStep>>> {
    Ok(Json(state.store.processing_steps()?))
}

// ── Products ────────────────────────────────────────────────────────

/// Assembly request: metadata plus the selection policy bounds. The
/// bundle itself is picked server-side from the validated pool.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    pub batch_id: String,
    pub product_name: String,
    pub manufacturer: String,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default = "default_max_collections")]
    pub max_collections: usize,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_max_collections() -> usize {
    3
}

fn default_max_steps() -> usize {
    5
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let bundle = bundle_recent_validated(&state.store, request.max_collections, request.max_steps)?;
    if bundle.collection_events.is_empty() {
        return Err(ApiError::Validation(
            "no validated collections available for assembly".into(),
        ));
    }

    let overall_score = score::overall_score(&bundle.quality_tests);
    let id = state.store.assemble_product(ProductDraft {
        batch_id: request.batch_id,
        product_name: request.product_name,
        manufacturer: request.manufacturer,
        collection_events: bundle.collection_events,
        quality_tests: bundle.quality_tests,
        processing_steps: bundle.processing_steps,
        final_quality: FinalQuality {
            overall_score,
            certifications: request.certifications,
        },
        created_at: Utc::now(),
    })?;

    let product = state
        .store
        .get_product(&id)?
        .ok_or_else(|| ApiError::Internal("assembled product missing".into()))?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.store.products()?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    state
        .store
        .get_product(&RecordId::new(id.clone()))?
        .map(Json)
        .ok_or(ApiError::NotFound(format!("product {id}")))
}

pub async fn get_product_by_qr(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<Product>> {
    state
        .store
        .get_product_by_qr(&code)?
        .map(Json)
        .ok_or(ApiError::NotFound(format!("product with QR code {code}")))
}

pub async fn product_traceability(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProvenanceTimeline>> {
    Ok(Json(state.store.provenance(&RecordId::new(id))?))
}

// ── Ledger surface ──────────────────────────────────────────────────

pub async fn ledger_stats(State(state): State<AppState>) -> ApiResult<Json<LedgerStats>> {
    Ok(Json(state.store.stats()?))
}

/// Chain verification report.
#[derive(Debug, Serialize)]
pub struct ChainReport {
    pub intact: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

pub async fn verify_chain(State(state): State<AppState>) -> ApiResult<Json<ChainReport>> {
    match state.store.verify_chain() {
        Ok(()) => Ok(Json(ChainReport {
            intact: true,
            detail: None,
        })),
        Err(error @ LedgerError::IntegrityViolation { .. }) => Ok(Json(ChainReport {
            intact: false,
            detail: Some(error.to_string()),
        })),
        Err(other) => Err(other.into()),
    }
}
