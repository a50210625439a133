/// Core error type.
///
/// Adapter crates map their client-library errors into this type so the lookup
/// workflow can tell recorded outcomes (unknown username, failed cleanup) apart
/// from failures that must abort the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("prompt error: {0}")]
    Prompt(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("username not occupied: {0}")]
    UsernameNotOccupied(String),

    #[error("username invalid: {0}")]
    UsernameInvalid(String),

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("contact cleanup failed: {0}")]
    Cleanup(String),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// Whether the lookup workflow may record this error and carry on.
    ///
    /// Everything else is unclassified and aborts the batch.
    pub fn is_classified(&self) -> bool {
        matches!(
            self,
            Error::UsernameNotOccupied(_)
                | Error::UsernameInvalid(_)
                | Error::EntityNotFound(_)
                | Error::Cleanup(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
