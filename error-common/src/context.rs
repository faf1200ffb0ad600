use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh request identifier
pub fn new_request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

/// Where an error happened, attached when it is reported
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    pub request_id: Option<String>,
    pub operation: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_request(request_id: impl Into<String>) -> Self {
        Self::new().with_request_id(request_id.into())
    }

    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }
}
