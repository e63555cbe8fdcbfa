use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Query execution error: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Record not found: {0}")]
    NotFound(String),
}

impl DatabaseError {
    /// Classify a sqlx error, pulling unique-constraint violations out into
    /// their own variant so callers can map them to a conflict response.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation {
                return DatabaseError::UniqueViolation(db_err.message().to_string());
            }
        }
        DatabaseError::QueryError(err)
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
