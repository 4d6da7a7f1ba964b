use thiserror::Error;

use crate::domain::{CustomerId, TransactionId, ValidationError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Data service error: {0}")]
    DataService(#[from] anyhow::Error),
}

impl AppError {
    /// True for failures caught before the data service was contacted.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}
