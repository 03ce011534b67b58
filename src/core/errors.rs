use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transient store failure; the next stale read retries the refresh.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("not supported: {0}")]
    Unsupported(&'static str),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether retrying later may succeed without any change on our side.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::BackendUnavailable(_))
    }
}

impl From<object_store::Error> for Error {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => Error::NotFound(path),
            // Transport failures surface as `Generic` from the HTTP-backed stores.
            object_store::Error::Generic { store, source } => {
                Error::BackendUnavailable(format!("{store}: {source}"))
            }
            other => Error::Backend(other.to_string()),
        }
    }
}
