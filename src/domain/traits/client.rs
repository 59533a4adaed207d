use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{
    ClientEvent, GroupMetadata, OutgoingMessage, ParticipantAction, SessionCredentials,
};

/// Operations exposed by a live WhatsApp connection
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    /// Send a message to a chat, returning the message id
    async fn send_message(&self, jid: &str, message: OutgoingMessage) -> Result<String, BotError>;

    /// Fetch the current metadata of a group
    async fn group_metadata(&self, group_id: &str) -> Result<GroupMetadata, BotError>;

    /// Add, remove, promote or demote participants of a group
    async fn group_participants_update(
        &self,
        group_id: &str,
        participants: &[String],
        action: ParticipantAction,
    ) -> Result<(), BotError>;

    /// Tear the connection down
    async fn close(&self) -> Result<(), BotError> {
        Ok(())
    }
}

/// Opens connections to the protocol client
#[async_trait]
pub trait Connector: Send + Sync {
    /// Latest web client version the servers accept
    async fn latest_version(&self) -> Result<ProtocolVersion, BotError>;

    /// Open a connection with the given session state
    async fn connect(&self, options: ConnectOptions) -> Result<Connection, BotError>;
}

/// A live connection: the client handle plus its event stream
pub struct Connection {
    pub client: Arc<dyn ProtocolClient>,
    pub events: mpsc::Receiver<ClientEvent>,
}

/// WhatsApp Web version triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion(pub [u32; 3]);

impl Default for ProtocolVersion {
    fn default() -> Self {
        ProtocolVersion([2, 3000, 1_015_901_307])
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, patch] = self.0;
        write!(f, "{}.{}.{}", major, minor, patch)
    }
}

/// Everything needed to open a connection
#[derive(Debug, Clone, Serialize)]
pub struct ConnectOptions {
    pub version: ProtocolVersion,
    pub browser: [String; 3],
    pub credentials: SessionCredentials,
}
