//! Conditions HTTP endpoint.
//!
//! - GET /api/v1/conditions?destination=NAME

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::{AppError, ErrorResponse};
use crate::services::conditions::{resolve_conditions, ConditionsReport};
use crate::services::destinations::find_destination;
use crate::services::owm::OwmClient;
use crate::services::scoring::ConditionsScorer;

/// Shared application state for the conditions endpoint.
#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub(crate) owm_client: OwmClient,
    pub(crate) scorer: Arc<dyn ConditionsScorer>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConditionsQuery {
    /// Destination display name (e.g. "Red River Gorge, KY")
    pub destination: Option<String>,
}

/// Current Climbing Conditions Score, 8-day outlook and chart series for
/// a destination.
///
/// The destination is validated before any upstream call. Both upstream
/// weather payloads must be available; otherwise the request fails with 502.
#[utoipa::path(
    get,
    path = "/api/v1/conditions",
    tag = "Conditions",
    params(ConditionsQuery),
    responses(
        (status = 200, description = "Scored conditions for the destination", body = ConditionsReport),
        (status = 400, description = "Missing or unknown destination", body = ErrorResponse),
        (status = 500, description = "Scoring failed", body = ErrorResponse),
        (status = 502, description = "Weather data unavailable or malformed", body = ErrorResponse),
    )
)]
pub async fn get_conditions(
    State(state): State<AppState>,
    Query(params): Query<ConditionsQuery>,
) -> Result<Json<ConditionsReport>, AppError> {
    let name = params
        .destination
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("destination query parameter is required".to_string()))?;

    let destination = find_destination(name)?;

    let report = resolve_conditions(
        &state.owm_client,
        state.scorer.as_ref(),
        destination,
        Utc::now().timestamp(),
    )
    .await?;

    tracing::info!(
        "Served conditions for {} ({} forecast days)",
        destination.name,
        report.conditions.forecast.len()
    );

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::conditions::test_support::{forecast_json, onecall_json};
    use crate::services::scoring::test_support::constant_scorer;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app(server: &MockServer) -> Router {
        let state = AppState {
            owm_client: OwmClient::new(&server.uri(), "k", Duration::from_secs(2)),
            scorer: Arc::new(constant_scorer(6.0)),
        };
        Router::new()
            .route("/api/v1/conditions", get(get_conditions))
            .with_state(state)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unknown_destination_makes_no_upstream_call() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (status, body) = get_json(app(&server), "/api/v1/conditions?destination=Mount%20Doom").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid destination: Mount Doom");
    }

    #[tokio::test]
    async fn test_missing_destination_is_bad_request() {
        let server = MockServer::start().await;
        let (status, _) = get_json(app(&server), "/api/v1/conditions").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(path("/data/3.0/onecall"))
            .respond_with(ResponseTemplate::new(200).set_body_json(onecall_json()))
            .mount(&server)
            .await;

        let (status, body) =
            get_json(app(&server), "/api/v1/conditions?destination=Bishop%2C%20CA").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Weather data unavailable");
    }

    #[tokio::test]
    async fn test_conditions_ok() {
        let server = MockServer::start().await;
        Mock::given(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json()))
            .mount(&server)
            .await;
        Mock::given(path("/data/3.0/onecall"))
            .respond_with(ResponseTemplate::new(200).set_body_json(onecall_json()))
            .mount(&server)
            .await;

        let (status, body) =
            get_json(app(&server), "/api/v1/conditions?destination=Bishop%2C%20CA").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["conditions"]["destination"], "Bishop, CA");
        assert_eq!(body["conditions"]["climbing_conditions_score"], 6.0);
        assert!(body["conditions"]["forecast"].is_array());
        assert!(body["graphs"]["points"].is_array());
    }
}
