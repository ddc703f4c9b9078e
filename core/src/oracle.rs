//! Single-call text-completion seam shared by SQL generation and chart planning.

use async_trait::async_trait;
use std::sync::Arc;

/// A best-effort text-generation backend.
///
/// One prompt in, one completion out. Failures (network, quota, blocked
/// prompts, malformed responses) surface as an opaque message.
#[async_trait]
pub trait TextOracle: Send + Sync {
    /// Completes `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, String>;
}

#[async_trait]
impl<T: TextOracle + ?Sized> TextOracle for Arc<T> {
    async fn complete(&self, prompt: &str) -> Result<String, String> {
        (**self).complete(prompt).await
    }
}
