use axum::response::{IntoResponse, Response};
use http::StatusCode;
use tracing::{debug, error};

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("The given id is not a valid id")]
    InvalidId,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    DatabaseError(#[from] langs_dal::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidQuery(detail) => {
                debug!("Invalid query: {detail}");
                (StatusCode::BAD_REQUEST, "Invalid query string").into_response()
            }
            ApiError::InvalidBody(detail) => {
                debug!("Invalid body: {detail}");
                (StatusCode::BAD_REQUEST, "Invalid request body").into_response()
            }
            ApiError::InvalidId => {
                (StatusCode::BAD_REQUEST, "The given id is not a valid id").into_response()
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::DatabaseError(e) => {
                error!("Error processing request: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred processing this request",
                )
                    .into_response()
            }
        }
    }
}
