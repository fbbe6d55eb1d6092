//! HTTP surface: `/CityInfo` lookup and `/health`.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use cityinfo_core::{CityInfoService, CityWeatherRecord, ErrorKind, LookupError};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: CityInfoService,
}

impl AppState {
    pub fn new(service: CityInfoService) -> Self {
        Self { service }
    }
}

#[derive(Debug, Deserialize)]
pub struct CityInfoQuery {
    #[serde(rename = "zipCode", alias = "zipcode", alias = "ZipCode")]
    pub zip_code: Option<String>,
}

/// RFC 9457 problem body returned when an upstream service has no data.
#[derive(Debug, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
}

impl Problem {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            type_url: "https://tools.ietf.org/html/rfc9110#section-15.6.1".to_owned(),
            title: "An error occurred while processing your request.".to_owned(),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Maps a [`LookupError`] to the response the caller sees.
#[derive(Debug)]
pub struct ApiError(pub LookupError);

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = kind.status_code();
        let message = self.0.public_message();
        match kind {
            ErrorKind::UpstreamUnavailable => (
                status,
                [(header::CONTENT_TYPE, APPLICATION_PROBLEM_JSON)],
                Json(Problem::new(status, message)),
            )
                .into_response(),
            _ => (status, message).into_response(),
        }
    }
}

/// `GET /CityInfo?zipCode=...`. A missing parameter is validated as an empty zip code.
pub async fn city_info(
    State(state): State<AppState>,
    Query(query): Query<CityInfoQuery>,
) -> Result<Json<CityWeatherRecord>, ApiError> {
    let zip_code = query.zip_code.unwrap_or_default();
    let record = state.service.lookup(&zip_code).await?;
    Ok(Json(record))
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/CityInfo", get(city_info))
        .route("/cityinfo", get(city_info))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
