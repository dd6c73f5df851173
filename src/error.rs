use thiserror::Error;

/// Errors from the document store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Opening the database file or connection pool failed.
    #[error("failed to open store: {0}")]
    Open(#[source] sqlx::Error),

    /// Running schema migrations failed.
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A write or update statement failed.
    #[error("write failed: {0}")]
    Write(#[source] sqlx::Error),

    /// A read query failed.
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// An update or delete targeted an identifier that does not exist.
    /// Detected from the affected-row count, never pre-checked.
    #[error("no document with id '{0}'")]
    NotFound(String),
}

/// Failure from a remote food database. Transport, decoding and
/// missing-product cases all surface as this one undifferentiated error;
/// callers decide how to present it.
#[derive(Error, Debug)]
#[error("food data retrieval failed: {reason}")]
pub struct RetrievalError {
    reason: String,
}

impl RetrievalError {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for RetrievalError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}
