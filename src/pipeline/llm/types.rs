use async_trait::async_trait;

use super::LlmError;

/// Prompt in, raw reply text out. Replaceable by a deterministic stub in tests.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Identifier of the backing model, for logs.
    fn model_name(&self) -> &str;
}
