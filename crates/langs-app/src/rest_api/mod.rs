pub mod language;

use crate::state::AppState;

/// Languages resource mounted at the server root.
pub fn router() -> axum::Router<AppState> {
    language::router()
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    language::api_docs()
}
