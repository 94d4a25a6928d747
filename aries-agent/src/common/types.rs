use rst_common::with_errors::thiserror::{self, Error};

#[derive(Debug, PartialEq, Error)]
pub enum CommonError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("db error: {0}")]
    DBError(String),
}

/// `ToValidate` is implemented by every configuration section
pub trait ToValidate {
    fn validate(&self) -> Result<(), CommonError>;
}
