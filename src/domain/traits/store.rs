use async_trait::async_trait;
use crate::application::errors::StorageError;
use crate::domain::entities::SessionCredentials;

/// Store trait - abstraction for session credential persistence
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the stored session, or a fresh one if nothing is stored
    async fn load(&self) -> Result<SessionCredentials, StorageError>;

    /// Persist the session
    async fn save(&self, session: &SessionCredentials) -> Result<(), StorageError>;
}
