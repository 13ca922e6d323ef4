//! API router configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use ayurtrace_ledger::LedgerStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared handler state: the single process-wide ledger, injected at
/// startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LedgerStore>,
}

/// Create the main API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Collection events
        .route(
            "/collections",
            get(handlers::list_collection_events).post(handlers::create_collection_event),
        )
        .route("/collections/pending", get(handlers::list_pending_collections))
        .route("/collections/:id", get(handlers::get_collection_event))
        // Quality tests
        .route(
            "/quality-tests",
            get(handlers::list_quality_tests).post(handlers::create_quality_test),
        )
        // Processing steps
        .route(
            "/processing-steps",
            get(handlers::list_processing_steps).post(handlers::create_processing_step),
        )
        // Products
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/products/qr/:code", get(handlers::get_product_by_qr))
        .route("/products/:id", get(handlers::get_product))
        .route("/products/:id/traceability", get(handlers::product_traceability))
        // Ledger surface
        .route("/stats", get(handlers::ledger_stats))
        .route("/chain/verify", post(handlers::verify_chain));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt as _;

    fn test_router() -> Router {
        create_router(AppState {
            store: Arc::new(LedgerStore::with_defaults()),
        })
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn collection_body(species: &str) -> serde_json::Value {
        serde_json::json!({
            "occurred_at": "2025-12-10T06:00:00Z",
            "collector": { "id": "COL001", "name": "Ramesh Kumar" },
            "species": species,
            "location": {
                "latitude": 12.9,
                "longitude": 77.5,
                "address": "Kerala, India"
            },
            "quantity_kg": 25.0,
            "quality": {
                "moisture_pct": 9.5,
                "purity_pct": 98.0,
                "maturity": "optimal"
            },
            "sustainability_score": 88
        })
    }

    fn quality_body(event_id: &str) -> serde_json::Value {
        serde_json::json!({
            "occurred_at": "2025-12-12T10:00:00Z",
            "lab": { "id": "LAB001", "name": "Central Herbal Lab" },
            "collection_event_id": event_id,
            "results": {
                "moisture_pct": 8.0,
                "pesticide_ppm": 0.02,
                "dna_authenticity": true,
                "heavy_metals_ppm": 0.01,
                "microbial_load_cfu": 200.0,
                "alkaloid_pct": 1.0
            },
            "certification": "AYUSH-CERTIFIED"
        })
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn collection_event_round_trips_through_the_api() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/collections",
                collection_body("Ashwagandha"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["validated"], serde_json::json!(true));
        let id = created["id"].as_str().unwrap().to_string();

        let response = router
            .oneshot(
                Request::get(format!("/api/v1/collections/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["id"], serde_json::json!(id));
        assert_eq!(fetched["species"], serde_json::json!("Ashwagandha"));
    }

    #[tokio::test]
    async fn malformed_draft_is_rejected() {
        let mut body = collection_body("Tulsi");
        body["quantity_kg"] = serde_json::json!(-3.0);

        let response = test_router()
            .oneshot(json_request("POST", "/api/v1/collections", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let error = body_json(response).await;
        assert_eq!(error["code"], serde_json::json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let response = test_router()
            .oneshot(
                Request::get("/api/v1/products/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error = body_json(response).await;
        assert_eq!(error["code"], serde_json::json!("NOT_FOUND"));
    }

    #[tokio::test]
    async fn assembled_product_is_reachable_by_qr() {
        let router = test_router();

        let created = body_json(
            router
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/api/v1/collections",
                    collection_body("Tulsi"),
                ))
                .await
                .unwrap(),
        )
        .await;
        let event_id = created["id"].as_str().unwrap();

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/quality-tests",
                quality_body(event_id),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/products",
                serde_json::json!({
                    "batch_id": "BATCH-2025-001",
                    "product_name": "Herbal Root Powder",
                    "manufacturer": "Ayurvedic Wellness Co.",
                    "certifications": ["AYUSH-CERTIFIED"]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let product = body_json(response).await;
        assert_eq!(product["final_quality"]["overall_score"], serde_json::json!(100));
        let qr_code = product["qr_code"].as_str().unwrap();

        let response = router
            .clone()
            .oneshot(
                Request::get(format!("/api/v1/products/qr/{qr_code}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["id"], product["id"]);

        let product_id = product["id"].as_str().unwrap();
        let response = router
            .oneshot(
                Request::get(format!("/api/v1/products/{product_id}/traceability"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let timeline = body_json(response).await;
        assert_eq!(timeline["overall_score"], serde_json::json!(100));
    }
}
