//! [`DbError`] and its mapping onto the grading engine's [`StoreError`].
//!
//! Constraint violations on insert are classified so the HTTP layer can
//! answer 409 or 404 instead of 500.

use marksheet_grading::StoreError;

/// `PostgreSQL` SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// `PostgreSQL` SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Query or connection failure.
    #[error("database error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A schema migration did not apply.
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A row with the same natural key already exists.
    #[error("{0} already exists")]
    Conflict(String),

    /// A referenced row (student, subject, exam event) does not exist.
    #[error("referenced {0} does not exist")]
    MissingReference(String),

    /// A stored value could not be converted into its domain type.
    #[error("corrupt {entity} row: {detail}")]
    Decode {
        /// The table the row came from.
        entity: &'static str,
        /// What was wrong with the row.
        detail: String,
    },

    /// Unusable pool settings, such as a malformed URL.
    #[error("invalid database settings: {0}")]
    Config(String),
}

impl DbError {
    /// Classify an insert failure, turning constraint violations into
    /// [`DbError::Conflict`] or [`DbError::MissingReference`].
    pub fn on_insert(err: sqlx::Error, what: &str) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db| db.code())
            .map(|c| c.into_owned());
        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => Self::Conflict(what.to_owned()),
            Some(FOREIGN_KEY_VIOLATION) => {
                Self::MissingReference(String::from("student, subject or exam event"))
            }
            _ => Self::Postgres(err),
        }
    }

    /// Build a [`DbError::Decode`] for a column of `entity`.
    pub fn decode(entity: &'static str, detail: impl core::fmt::Display) -> Self {
        Self::Decode {
            entity,
            detail: detail.to_string(),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Decode { entity, detail } => Self::Corrupt { entity, detail },
            other => Self::Backend(other.to_string()),
        }
    }
}
