//! HTTP routes for the inference UI and its JSON API

use crate::error::{AppError, AppResult};
use crate::form::collect_input;
use crate::metrics::{MetricsSnapshot, PredictionMetrics};
use crate::models::artifacts::{ArtifactBundle, ArtifactCache};
use crate::models::inference::InferenceEngine;
use crate::types::prediction::{Explanation, Prediction, PredictionReport};
use crate::types::record::TransactionInput;
use crate::ui::page::{render_error_page, render_page, Outcome};
use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub artifacts: Arc<ArtifactCache>,
    pub metrics: Arc<PredictionMetrics>,
}

impl AppState {
    pub fn new(artifacts: ArtifactCache) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
            metrics: Arc::new(PredictionMetrics::new()),
        }
    }
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/v1/predict", post(predict_json))
        .route("/api/v1/stats", get(stats))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run predict + explain for one record and account for it
fn score(
    state: &AppState,
    bundle: Arc<ArtifactBundle>,
    record: &TransactionInput,
) -> AppResult<(Prediction, Explanation)> {
    let started = Instant::now();
    let engine = InferenceEngine::new(bundle);

    let result = engine.predict(record).and_then(|prediction| {
        let explanation = engine.explain(&prediction)?;
        Ok((prediction, explanation))
    });

    match &result {
        Ok((prediction, _)) => {
            state.metrics.record_prediction(
                started.elapsed(),
                prediction.fraud_probability(),
                prediction.is_fraud(),
            );
            info!(
                label = prediction.label,
                fraud_probability = prediction.fraud_probability(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "Transaction scored"
            );
        }
        Err(_) => state.metrics.record_failure(),
    }

    result
}

fn error_page(error: &AppError) -> Response {
    (error.status_code(), Html(render_error_page(error))).into_response()
}

/// Form with the submitted (or default) values and no prediction yet
async fn index(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(e) = state.artifacts.get() {
        return error_page(&e);
    }
    let record = collect_input(&params);
    Html(render_page(&record, Outcome::Pending)).into_response()
}

async fn predict_form(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let bundle = match state.artifacts.get() {
        Ok(bundle) => bundle,
        Err(e) => return error_page(&e),
    };

    let record = collect_input(&fields);
    match score(&state, bundle, &record) {
        Ok((prediction, explanation)) => Html(render_page(
            &record,
            Outcome::Scored {
                prediction: &prediction,
                explanation: &explanation,
            },
        ))
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Prediction failed");
            (
                e.status_code(),
                Html(render_page(&record, Outcome::Failed(&e))),
            )
                .into_response()
        }
    }
}

/// Same widget semantics as the form: values are clamped, unknown or missing
/// ones take the default.
async fn predict_json(
    State(state): State<AppState>,
    Json(body): Json<HashMap<String, Value>>,
) -> AppResult<Json<PredictionReport>> {
    let bundle = state.artifacts.get()?;
    let record = collect_input(&as_form_fields(body));
    let (prediction, explanation) = score(&state, bundle, &record)?;
    Ok(Json(PredictionReport::new(&prediction, explanation)))
}

fn as_form_fields(body: HashMap<String, Value>) -> HashMap<String, String> {
    body.into_iter()
        .map(|(name, value)| {
            let raw = match value {
                Value::String(s) => s,
                Value::Bool(b) => u8::from(b).to_string(),
                other => other.to_string(),
            };
            (name, raw)
        })
        .collect()
}

async fn stats(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    artifacts_loaded: bool,
    timestamp: i64,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            artifacts_loaded: state.artifacts.load_count() > 0,
            timestamp: chrono::Utc::now().timestamp(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::artifacts::tests::forest_bundle_json;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::io::Write;
    use tower::ServiceExt;

    const RISKY_FORM: &str = "kyc_status=incomplete&days_since_kyc_incomplete=120\
        &transaction_amount=150000&transaction_method=online\
        &transaction_category=loan&suspicion_indicator=1";

    fn bundle_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    fn state_for(path: &std::path::Path) -> AppState {
        AppState::new(ArtifactCache::new(path))
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/predict")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_artifacts_shows_only_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(&dir.path().join("fraud_detection_artifacts.json"));
        let app = create_router(state);

        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let html = body_text(response).await;
        assert!(html.contains("Model artifacts not found"));
        assert!(!html.contains("input-form"));
    }

    #[tokio::test]
    async fn test_index_loads_artifacts_once() {
        let file = bundle_file(&forest_bundle_json(false));
        let state = state_for(file.path());
        let app = create_router(state.clone());

        for _ in 0..3 {
            let response = app.clone().oneshot(get("/")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(state.artifacts.load_count(), 1);
    }

    #[tokio::test]
    async fn test_index_presets_widgets_from_query() {
        let file = bundle_file(&forest_bundle_json(false));
        let app = create_router(state_for(file.path()));

        let response = app.oneshot(get("/?transaction_method=upi&age=500")).await.unwrap();
        let html = body_text(response).await;
        assert!(html.contains(r#"<option value="upi" selected>"#));
        assert!(html.contains("<td>100</td>"));
    }

    #[tokio::test]
    async fn test_form_prediction_renders_banner_and_chart() {
        let file = bundle_file(&forest_bundle_json(true));
        let state = state_for(file.path());
        let app = create_router(state.clone());

        let response = app.oneshot(post_form(RISKY_FORM)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("FRAUD DETECTED (Probability: 75.00%)"));
        assert!(html.contains(r#"<svg class="force-plot""#));

        let snapshot = state.metrics.snapshot();
        assert_eq!(snapshot.predictions_served, 1);
        assert_eq!(snapshot.fraud_flagged, 1);
    }

    #[tokio::test]
    async fn test_empty_form_uses_defaults() {
        let file = bundle_file(&forest_bundle_json(false));
        let app = create_router(state_for(file.path()));

        let response = app.oneshot(post_form("")).await.unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Transaction is likely NOT FRAUDULENT (Probability: 93.00%)"));
    }

    #[tokio::test]
    async fn test_json_prediction() {
        let file = bundle_file(&forest_bundle_json(true));
        let app = create_router(state_for(file.path()));

        let response = app
            .oneshot(post_json(serde_json::json!({
                "kyc_status": "incomplete",
                "transaction_amount": 150000,
                "transaction_method": "online",
                "transaction_category": "loan",
                "suspicion_indicator": 1
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let report: PredictionReport = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(report.is_fraud);
        assert!((report.probabilities[1] - 0.75).abs() < 1e-9);
        assert_eq!(report.explanation.contributions.len(), 11);
        assert!((report.explanation.output_value() - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unseen_category_is_unprocessable() {
        let json = forest_bundle_json(true).replace(r#""online", "upi""#, r#""online""#);
        let file = bundle_file(&json);
        let state = state_for(file.path());
        let app = create_router(state.clone());

        let response = app
            .oneshot(post_json(serde_json::json!({"transaction_method": "upi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], 422);
        assert!(body["error"].as_str().unwrap().contains("upi"));
        assert_eq!(state.metrics.snapshot().failures, 1);
    }

    #[tokio::test]
    async fn test_stats_and_health() {
        let file = bundle_file(&forest_bundle_json(false));
        let state = state_for(file.path());
        let app = create_router(state);

        app.clone().oneshot(post_form("")).await.unwrap();

        let response = app.clone().oneshot(get("/api/v1/stats")).await.unwrap();
        let stats: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(stats["predictions_served"], 1);
        assert_eq!(stats["fraud_flagged"], 0);

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let health: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["artifacts_loaded"], true);
    }
}
