use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Audit trail integrity check failed at sequence {sequence}")]
    IntegrityCheckError { sequence: u64 },

    #[error("Audit serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
