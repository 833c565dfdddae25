use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{sync::Arc, time::Instant};
use tokio::task::JoinError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use crate::{
    engine::PhishEngine,
    error::{internal_error, AppError},
    normalize::normalize_url,
    types::{CheckRequest, CheckResponse, HealthResponse},
};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PhishEngine>,
    pub metrics: Option<PrometheusHandle>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/check", post(check))
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn check(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<CheckResponse>, AppError> {
    let start = Instant::now();
    metrics::counter!("phishcheck_requests_total").increment(1);

    // An unreadable body is treated the same as one without a URL
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Rejected check body: {}", rejection);
            CheckRequest::default()
        }
    };
    let url = normalize_url(request.url.as_deref())?;

    let check_id = Uuid::new_v4();
    let span = info_span!("check", %check_id, url = %url);
    let engine = state.engine.clone();

    // Extraction runs in its own task so a panic becomes an error response
    let report = tokio::spawn(async move { engine.analyze(&url).await }.instrument(span))
        .await
        .map_err(|e| extraction_failure(check_id, e))?;

    let response = CheckResponse::from(&report);
    if response.is_phishing {
        metrics::counter!("phishcheck_phishing_verdicts_total").increment(1);
    }

    let latency = start.elapsed().as_secs_f64() * 1000.0;
    metrics::histogram!("phishcheck_request_duration_ms").record(latency);

    info!(
        %check_id,
        is_phishing = response.is_phishing,
        confidence = response.confidence,
        "Check completed in {:.1}ms",
        latency
    );
    Ok(Json(response))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        classifier_loaded: state.engine.classifier_loaded(),
    })
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or_else(|| internal_error("metrics recorder is not installed"))
}

fn extraction_failure(check_id: Uuid, err: JoinError) -> AppError {
    let detail = if err.is_panic() {
        let panic = err.into_panic();
        panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "feature extraction panicked".to_string())
    } else {
        err.to_string()
    };

    error!(%check_id, "Analysis failed: {}", detail);
    AppError::Extraction(detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_panics_become_extraction_errors() {
        let err = tokio::spawn(async { panic!("suffix table exploded") })
            .await
            .unwrap_err();
        let app_error = extraction_failure(Uuid::new_v4(), err);
        assert_eq!(app_error.to_string(), "Error analyzing URL: suffix table exploded");

        let detail = String::from("bad label");
        let err = tokio::spawn(async move { std::panic::panic_any(detail) })
            .await
            .unwrap_err();
        let app_error = extraction_failure(Uuid::new_v4(), err);
        assert_eq!(app_error.to_string(), "Error analyzing URL: bad label");
    }
}
