use thiserror::Error;

use crate::actor_framework::FrameworkError;

pub type MachineResult<T> = std::result::Result<T, MachineError>;

/// Errors raised by the soda machine domain and its transaction service.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MachineError {
    /// Malformed input: blank name, non-positive price or quantity, nil id, negative amount.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },
    #[error("There is not enough money to debit")]
    InsufficientFunds,
    #[error("There is not enough inventory available")]
    OutOfStock,
    #[error("There is no item in the selected list")]
    EmptySelection,
    #[error("Record store error: {0}")]
    Store(#[from] FrameworkError),
}

impl MachineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        MachineError::InvalidArgument(message.into())
    }

    pub fn not_found(kind: &'static str, key: impl ToString) -> Self {
        MachineError::NotFound { kind, key: key.to_string() }
    }
}
