use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<sea_orm::DbErr> for ModelError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}

/// Map an insert failure, turning unique-index violations into `Conflict`.
pub(crate) fn insert_error(what: &str, e: sea_orm::DbErr) -> ModelError {
    match e.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => ModelError::Conflict(format!("{what} already exists")),
        _ => ModelError::Db(e.to_string()),
    }
}

/// Reject blank values and values longer than `max` characters.
pub(crate) fn check_len(field: &str, value: &str, max: usize) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} required")));
    }
    if value.chars().count() > max {
        return Err(ModelError::Validation(format!("{field} must be at most {max} characters")));
    }
    Ok(())
}
