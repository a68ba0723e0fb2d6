use thiserror::Error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A recurrence rule that cannot be advanced (unknown step or a step that
    /// does not move the clock forward). Detected before any projection loop
    /// runs, since such a rule would otherwise never terminate.
    #[error("Invalid recurrence rule: {0}")]
    InvalidRecurrenceRule(String),

    /// A bill whose stored amounts violate the model-level invariants.
    /// Normally impossible: the model rejects these at save time.
    #[error("Invalid bill definition: {0}")]
    InvalidBillDefinition(String),

    /// Error from decimal operations. Monetary arithmetic is always checked,
    /// never silently degraded to floating point.
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// Error from date operations
    #[error("Date error: {0}")]
    Date(String),
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
