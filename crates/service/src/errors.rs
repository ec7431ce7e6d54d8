use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use models::errors::ModelError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("plan limit exceeded: {0}")]
    LimitExceeded(String),
    #[error("payment error: {0}")]
    Payment(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Map a database error, turning unique-key violations into `Conflict`.
    pub fn from_db(e: DbErr, what: &str) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict(format!("{what} already exists")),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => Self::Validation(format!("{what} references a missing record")),
            _ => Self::Db(e.to_string()),
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self { ServiceError::Db(e.to_string()) }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => ServiceError::Validation(msg),
            ModelError::Duplicate(what) => ServiceError::Conflict(format!("{what} already exists")),
            ModelError::Db(msg) => ServiceError::Db(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_validation_stays_validation() {
        let e: ServiceError = ModelError::Validation("name required".into()).into();
        assert!(matches!(e, ServiceError::Validation(m) if m == "name required"));
    }

    #[test]
    fn duplicate_row_is_conflict() {
        let e: ServiceError = ModelError::Duplicate("account with this email".into()).into();
        assert!(matches!(e, ServiceError::Conflict(m) if m.contains("email")));
    }

    #[test]
    fn plain_db_error_maps_to_db() {
        let e = ServiceError::from_db(DbErr::Custom("boom".into()), "room");
        assert!(matches!(e, ServiceError::Db(_)));
    }
}
