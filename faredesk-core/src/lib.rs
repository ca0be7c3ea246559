pub mod identity;
pub mod notify;

/// Error taxonomy shared across the booking engine. Validation, price and
/// inventory failures are detected before any write; Internal covers storage
/// and other infrastructure faults.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Submitted total {submitted} does not match the computed total {computed}")]
    PriceMismatch { submitted: i64, computed: i64 },
    #[error("Not enough seats: requested {requested}, available {available}")]
    InsufficientInventory { requested: i32, available: i32 },
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal service error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable machine-readable code carried on every error response.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::PriceMismatch { .. } => "PRICE_MISMATCH",
            CoreError::InsufficientInventory { .. } => "INSUFFICIENT_INVENTORY",
            CoreError::Forbidden(_) => "FORBIDDEN",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
