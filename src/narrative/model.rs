use async_trait::async_trait;

use super::error::NarrativeError;

/// A text-generation model.
#[async_trait]
pub trait NarrativeModel: Send + Sync {
    /// Model identifier for logs.
    fn name(&self) -> &str;

    /// Generate text for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError>;
}
