use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// Payload rejected before touching the store.
    #[error("{0}")]
    Invalid(String),

    #[error("{0} already exists")]
    Duplicate(&'static str),

    #[error("email is already registered")]
    DuplicateEmail,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("no free {prefix} identifier after {attempts} attempts")]
    IdentifierExhausted { prefix: &'static str, attempts: u32 },

    #[error("stored value is not valid JSON: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("DB lock poisoned: {0}")]
    Poisoned(String),
}

/// Column list of a violated UNIQUE/PRIMARY KEY constraint, as SQLite
/// reports it (`"claims.owner_id, claims.query"`).
pub(crate) fn unique_violation(err: &DbError) -> Option<&str> {
    match err {
        DbError::Sqlite(rusqlite::Error::SqliteFailure(e, Some(msg)))
            if e.code == ErrorCode::ConstraintViolation =>
        {
            msg.strip_prefix("UNIQUE constraint failed: ")
        }
        _ => None,
    }
}
