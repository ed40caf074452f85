//! Error taxonomy shared by every StorePulse crate.
//!
//! Nothing here knows about SQLite or diesel; `storage-sqlite` maps its own
//! failures into [`DatabaseError`] at the crate boundary.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the orchestration core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("storage: {0}")]
    Database(#[from] DatabaseError),

    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("job engine: {0}")]
    Job(#[from] JobError),

    #[error("serialization: {0}")]
    Serialization(String),

    #[error("unexpected: {0}")]
    Unexpected(String),
}

/// Storage failures, carried as strings so the core stays backend-free.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("cannot build connection pool: {0}")]
    PoolCreationFailed(String),

    #[error("query error: {0}")]
    QueryFailed(String),

    /// No row matched an update or lookup that required one.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    UniqueViolation(String),

    #[error("migration error: {0}")]
    MigrationFailed(String),

    /// Writer actor and other plumbing failures.
    #[error("storage internals: {0}")]
    Internal(String),
}

/// Validation errors for caller input.
///
/// Returned synchronously; nothing is persisted when one of these is raised.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("field '{0}' is required")]
    MissingField(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Malformed payload for '{event_type}': {reason}")]
    MalformedPayload { event_type: String, reason: String },
}

/// Errors raised while talking to the job engine.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Job submission rejected: {0}")]
    SubmissionFailed(String),

    #[error("No handler registered for '{0}'")]
    UnknownHandler(String),

    #[error("Completion context could not be decoded: {0}")]
    InvalidContext(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Rejects blank identifiers with a `MissingField` validation error.
pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field.to_string()).into());
    }
    Ok(())
}
