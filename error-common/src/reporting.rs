// Error reporting at the gateway boundary

use crate::context::ErrorContext;
use crate::types::{ErrorKind, ErrorResponse, IntakeError};

/// Logs boundary errors with their request identifier and converts them
/// into caller-facing responses.
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, context: &ErrorContext, error: &IntakeError) -> ErrorResponse {
        let request_id = context.request_id.as_deref().unwrap_or("unknown");
        let operation = context.operation.as_deref().unwrap_or("unknown");

        match error.kind() {
            ErrorKind::Fatal => tracing::error!(
                request_id = request_id,
                operation = operation,
                error_code = error.code(),
                error = %error,
                "Request aborted"
            ),
            _ => tracing::warn!(
                request_id = request_id,
                operation = operation,
                error_code = error.code(),
                error = %error,
                "Request failed"
            ),
        }

        ErrorResponse {
            code: error.code().to_string(),
            kind: error.kind(),
            message: error.public_message(),
            request_id: context.request_id.clone(),
            occurred_at: chrono::Utc::now(),
        }
    }
}
