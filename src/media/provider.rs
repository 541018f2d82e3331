use super::types::{FailureReason, MediaResult, ProviderInput};
use async_trait::async_trait;

/// One strategy for turning a TikTok link into a media address.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Name used in config `order` lists and logs
    fn name(&self) -> &'static str;

    /// Makes a single attempt, with no retries of its own.
    async fn attempt(&self, input: &ProviderInput) -> Result<MediaResult, FailureReason>;
}
