//! Console adapter for development/testing
//!
//! Each stdin line becomes a group message from a single console user, who is
//! also the group's only admin. Outbound messages are printed.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{
    ClientEvent, ConnectionUpdate, GroupMetadata, MessagesUpsert, OutgoingMessage, Participant,
    ParticipantAction, WebMessage,
};
use crate::domain::entities::event::{MessageContent, MessageKey};
use crate::domain::traits::{ConnectOptions, Connection, Connector, ProtocolClient, ProtocolVersion};

pub const CONSOLE_GROUP: &str = "console@g.us";
pub const CONSOLE_USER: &str = "console@s.whatsapp.net";

/// Status reported on stdin EOF, so the supervisor stops instead of reconnecting
const EOF_STATUS: u16 = 401;

/// Console connector for local development
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleConnector;

impl ConsoleConnector {
    pub fn new() -> Self {
        Self
    }

    fn upsert(text: String) -> ClientEvent {
        ClientEvent::MessagesUpsert(MessagesUpsert {
            kind: "notify".to_string(),
            messages: vec![WebMessage {
                key: MessageKey {
                    remote_jid: CONSOLE_GROUP.to_string(),
                    from_me: false,
                    participant: Some(CONSOLE_USER.to_string()),
                    id: Some(uuid::Uuid::new_v4().to_string()),
                },
                message: Some(MessageContent {
                    conversation: Some(text),
                    extended_text_message: None,
                }),
                push_name: Some("console".to_string()),
                message_timestamp: Some(chrono::Utc::now().timestamp().into()),
            }],
        })
    }

    /// Open a connection fed by `input` instead of stdin
    pub async fn connect_reader<R>(input: R) -> Result<Connection, BotError>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        tx.send(ClientEvent::ConnectionUpdate(ConnectionUpdate::open()))
            .await
            .map_err(|e| BotError::Internal(e.to_string()))?;
        tokio::spawn(Self::read_lines(input, tx));

        Ok(Connection {
            client: Arc::new(ConsoleClient),
            events: rx,
        })
    }

    async fn read_lines<R>(input: R, tx: mpsc::Sender<ClientEvent>)
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    if tx.send(Self::upsert(line)).await.is_err() {
                        return;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }

        let closed = ConnectionUpdate::closed(Some(EOF_STATUS), "console input closed");
        let _ = tx.send(ClientEvent::ConnectionUpdate(closed)).await;
    }
}

#[async_trait]
impl Connector for ConsoleConnector {
    async fn latest_version(&self) -> Result<ProtocolVersion, BotError> {
        Ok(ProtocolVersion::default())
    }

    async fn connect(&self, _options: ConnectOptions) -> Result<Connection, BotError> {
        tracing::info!("Starting console bot (dev mode), type commands as {}", CONSOLE_USER);
        Self::connect_reader(BufReader::new(tokio::io::stdin())).await
    }
}

/// Prints what a real client would send
pub struct ConsoleClient;

#[async_trait]
impl ProtocolClient for ConsoleClient {
    async fn send_message(&self, _jid: &str, message: OutgoingMessage) -> Result<String, BotError> {
        if let Some(text) = &message.text {
            println!("[BOT] {}", text);
        }
        if let Some(video) = &message.video {
            println!("[BOT] <video {}> {}", video.url, message.caption.as_deref().unwrap_or(""));
        }
        if !message.mentions.is_empty() {
            println!("  [Mentions] {}", message.mentions.join(", "));
        }
        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn group_metadata(&self, group_id: &str) -> Result<GroupMetadata, BotError> {
        Ok(GroupMetadata {
            id: group_id.to_string(),
            subject: Some("console".to_string()),
            participants: vec![Participant::admin(CONSOLE_USER)],
        })
    }

    async fn group_participants_update(
        &self,
        group_id: &str,
        participants: &[String],
        action: ParticipantAction,
    ) -> Result<(), BotError> {
        println!("[BOT] {} {} in {}", action.as_str(), participants.join(", "), group_id);
        Ok(())
    }
}
