use ayurtrace_fingerprint::FingerprintError;
use ayurtrace_types::RecordId;
use thiserror::Error;

/// Errors returned by ledger append and query operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("ledger lock poisoned")]
    LockPoisoned,

    #[error("chain integrity violation at record {record_id}: {reason}")]
    IntegrityViolation { record_id: RecordId, reason: String },
}

impl From<FingerprintError> for LedgerError {
    fn from(value: FingerprintError) -> Self {
        match value {
            FingerprintError::Serialization(msg) => Self::Serialization(msg),
        }
    }
}
