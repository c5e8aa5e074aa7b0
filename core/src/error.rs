use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    /// A query was issued before any corpus was built.
    #[error("index not ready: no corpus has been built yet")]
    NotReady,

    /// The query is well-formed text but unusable in the requested mode.
    #[error("usage error: {0}")]
    Usage(String),

    #[error("unknown query mode: {0}")]
    UnknownMode(String),

    #[error("invalid weighting scheme: {0}")]
    InvalidScheme(String),

    #[error("invalid normalizer: {0}")]
    InvalidNormalizer(String),

    #[error("corpus error: {0}")]
    Corpus(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    pub fn usage<S: Into<String>>(msg: S) -> Self {
        SearchError::Usage(msg.into())
    }

    /// Errors caused by the query itself rather than by engine state.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SearchError::Usage(_)
                | SearchError::UnknownMode(_)
                | SearchError::InvalidScheme(_)
                | SearchError::InvalidNormalizer(_)
        )
    }
}
