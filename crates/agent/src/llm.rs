use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// One schema-constrained completion: a system instruction, a user instruction and
/// the response shape the backend is asked to honour.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub schema_name: &'static str,
    pub schema: Value,
    pub temperature: f32,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("backend request timed out")]
    Timeout,
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Backend seam. Returns the raw text of the model reply; parsing is the caller's job.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}
