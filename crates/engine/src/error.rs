//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`NotFound`] when a referenced row does not exist.
//! - [`Forbidden`] when the row exists but belongs to another user.
//! - [`Validation`] when the input is malformed or incomplete.
//! - [`Conflict`] when the write would collide with an existing row.
//!
//! Every variant is raised before the first write of an operation, so the
//! surrounding database transaction rolls back with nothing applied.
//!
//!  [`NotFound`]: EngineError::NotFound
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`Validation`]: EngineError::Validation
//!  [`Conflict`]: EngineError::Conflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} belongs to another user")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" already present!")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Message safe to show to the end user.
    ///
    /// `NotFound` and `Forbidden` produce the same text so that the existence
    /// of another user's rows is never revealed.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(label) | Self::Forbidden(label) => {
                format!("That {label} does not exist.")
            }
            Self::Validation(msg) => msg.clone(),
            Self::Conflict(name) => format!("\"{name}\" already exists."),
            Self::Database(_) => "Something went wrong, please try again.".to_string(),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_reads_like_not_found() {
        let missing = EngineError::NotFound("wallet".to_string());
        let foreign = EngineError::Forbidden("wallet".to_string());

        assert_ne!(missing, foreign);
        assert_eq!(missing.user_message(), foreign.user_message());
        assert_eq!(missing.user_message(), "That wallet does not exist.");
    }
}
