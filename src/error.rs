use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("storage unavailable")]
    StorageUnavailable(#[source] BoxError),

    #[error("failed to parse payload: {0}")]
    ParseFailure(String),

    #[error("event not found: {0}")]
    EventNotFound(String),

    #[error("event with this combination of startTimestamp, eventType and locationId already exists")]
    DuplicateEvent,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn storage(source: impl Into<BoxError>) -> Self {
        Error::StorageUnavailable(source.into())
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::StorageUnavailable(Box::new(e))
    }
}
