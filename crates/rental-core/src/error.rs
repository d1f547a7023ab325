//! Domain errors

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No fallback admin account exists for role code: {0}")]
    FallbackAdminMissing(String),

    #[error("Invalid contract status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Renewal produced an out-of-range end date for contract {0}")]
    RenewalOutOfRange(Uuid),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
