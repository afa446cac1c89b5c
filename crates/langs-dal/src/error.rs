pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid stored document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("Invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("Invalid collection name: {0}")]
    InvalidCollectionName(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
