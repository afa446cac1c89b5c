use axum::{extract::State, response::IntoResponse, Json};
use http::StatusCode;
use langs_types::app::AppInfo;
use serde::Serialize;

use crate::{service::LanguageService, state::AppState};

pub const HEALTHY: &str = "OK";

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "PascalCase")]
pub struct HealthCodes {
    pub application: String,
    pub database_connection: String,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "PascalCase")]
pub struct HealthCheck {
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub info: AppInfo,
    pub health_codes: HealthCodes,
}

impl HealthCheck {
    pub fn is_healthy(&self) -> bool {
        self.health_codes.application == HEALTHY && self.health_codes.database_connection == HEALTHY
    }
}

fn status_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/health", tag = "Health", operation_id = "health",
    responses((status = StatusCode::OK, description = "Application and store are healthy", body = HealthCheck),
    (status = StatusCode::INTERNAL_SERVER_ERROR, description = "Store did not answer", body = HealthCheck))))]
pub async fn health(State(state): State<AppState>, service: LanguageService) -> impl IntoResponse {
    let store_status = if service.ping().await {
        HEALTHY.to_string()
    } else {
        status_text(StatusCode::INTERNAL_SERVER_ERROR)
    };
    let report = HealthCheck {
        info: state.config().info.clone(),
        health_codes: HealthCodes {
            application: HEALTHY.to_string(),
            database_connection: store_status,
        },
    };
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/health", axum::routing::get(health))
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(health))]
    struct ApiDocs;
    ApiDocs::openapi()
}
