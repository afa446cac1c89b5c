pub type Error = anyhow::Error;
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Store at {0} did not answer, giving up")]
    StoreUnavailable(String),
}
