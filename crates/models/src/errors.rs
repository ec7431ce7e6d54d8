use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("already exists: {0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    /// Unique-key violations become `Duplicate`, everything else `Db`.
    pub fn unique(e: sea_orm::DbErr, what: &str) -> Self {
        match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => ModelError::Duplicate(what.to_string()),
            _ => ModelError::Db(e.to_string()),
        }
    }
}

impl From<sea_orm::DbErr> for ModelError {
    fn from(e: sea_orm::DbErr) -> Self { ModelError::Db(e.to_string()) }
}
