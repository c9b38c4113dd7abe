#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// True for `CREATE DATABASE` on a name that is already taken (SQLSTATE 42P04).
    pub fn is_duplicate_database(&self) -> bool {
        if let AppError::Database(sqlx::Error::Database(db_err)) = self
            && db_err.code().as_deref() == Some("42P04")
        {
            return true;
        }
        false
    }
}

/// Why a raw API item could not be turned into a vacancy record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("invalid value for field '{0}'")]
    InvalidField(&'static str),
}
