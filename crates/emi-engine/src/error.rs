use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("No convergence: installment {installment} does not exceed the interest-only payment {interest_only} on the reduced balance")]
    NoConvergence {
        installment: Decimal,
        interest_only: Decimal,
    },

    #[error("Capacity exceeded: at most {capacity} loans can be compared")]
    CapacityExceeded { capacity: usize },

    #[error("Not found: no entry with id {id}")]
    NotFound { id: Uuid },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}: amounts exceed the representable range")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::SerializationError(e.to_string())
    }
}
