use async_trait::async_trait;
use crate::application::errors::MediaError;

/// Resolves a short-video page URL into a direct media URL
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, source_url: &str) -> Result<String, MediaError>;
}
