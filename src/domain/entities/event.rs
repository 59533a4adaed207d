//! Events emitted by the protocol client, decoded into one variant per kind

use serde::Deserialize;
use serde_json::{Map, Value};

use super::group::ParticipantAction;

/// Event envelope as it crosses the adapter boundary
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// A typed client event
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Partial credential state to merge and persist
    CredsUpdate(Map<String, Value>),
    ConnectionUpdate(ConnectionUpdate),
    GroupParticipantsUpdate(GroupParticipantsUpdate),
    MessagesUpsert(MessagesUpsert),
}

impl ClientEvent {
    /// Decode an envelope. Unknown event names yield `Ok(None)`.
    pub fn decode(raw: RawEvent) -> Result<Option<Self>, serde_json::Error> {
        let event = match raw.event.as_str() {
            "creds.update" => ClientEvent::CredsUpdate(serde_json::from_value(raw.data)?),
            "connection.update" => ClientEvent::ConnectionUpdate(serde_json::from_value(raw.data)?),
            "group-participants.update" => {
                ClientEvent::GroupParticipantsUpdate(serde_json::from_value(raw.data)?)
            }
            "messages.upsert" => ClientEvent::MessagesUpsert(serde_json::from_value(raw.data)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::CredsUpdate(_) => "creds.update",
            ClientEvent::ConnectionUpdate(_) => "connection.update",
            ClientEvent::GroupParticipantsUpdate(_) => "group-participants.update",
            ClientEvent::MessagesUpsert(_) => "messages.upsert",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Open,
    Close,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionUpdate {
    #[serde(default)]
    pub connection: Option<ConnectionStatus>,
    #[serde(default)]
    pub last_disconnect: Option<LastDisconnect>,
    #[serde(default)]
    pub qr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LastDisconnect {
    #[serde(default)]
    pub error: Option<DisconnectError>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DisconnectError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub output: Option<ErrorOutput>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    #[serde(default)]
    pub status_code: Option<u16>,
}

impl ConnectionUpdate {
    pub fn open() -> Self {
        Self {
            connection: Some(ConnectionStatus::Open),
            ..Default::default()
        }
    }

    pub fn qr(code: impl Into<String>) -> Self {
        Self {
            qr: Some(code.into()),
            ..Default::default()
        }
    }

    pub fn closed(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            connection: Some(ConnectionStatus::Close),
            last_disconnect: Some(LastDisconnect {
                error: Some(DisconnectError {
                    message: Some(message.into()),
                    output: Some(ErrorOutput { status_code }),
                }),
            }),
            qr: None,
        }
    }

    fn error(&self) -> Option<&DisconnectError> {
        self.last_disconnect.as_ref()?.error.as_ref()
    }

    pub fn status_code(&self) -> Option<u16> {
        self.error()?.output.as_ref()?.status_code
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error()?.message.as_deref()
    }

    pub fn disconnect_reason(&self) -> DisconnectReason {
        DisconnectReason::from_status(self.status_code())
    }
}

/// Why the connection closed, keyed by the client's status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    LoggedOut,
    Forbidden,
    ConnectionLost,
    MultideviceMismatch,
    ConnectionClosed,
    ConnectionReplaced,
    BadSession,
    UnavailableService,
    RestartRequired,
    Unknown(Option<u16>),
}

impl DisconnectReason {
    pub fn from_status(code: Option<u16>) -> Self {
        match code {
            Some(401) => DisconnectReason::LoggedOut,
            Some(403) => DisconnectReason::Forbidden,
            Some(408) => DisconnectReason::ConnectionLost,
            Some(411) => DisconnectReason::MultideviceMismatch,
            Some(428) => DisconnectReason::ConnectionClosed,
            Some(440) => DisconnectReason::ConnectionReplaced,
            Some(500) => DisconnectReason::BadSession,
            Some(503) => DisconnectReason::UnavailableService,
            Some(515) => DisconnectReason::RestartRequired,
            other => DisconnectReason::Unknown(other),
        }
    }

    /// A logged-out session cannot be resumed; everything else reconnects
    pub fn is_terminal(&self) -> bool {
        matches!(self, DisconnectReason::LoggedOut)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupParticipantsUpdate {
    pub id: String,
    #[serde(default)]
    pub participants: Vec<String>,
    pub action: ParticipantAction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessagesUpsert {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub messages: Vec<WebMessage>,
}

impl MessagesUpsert {
    /// Only live notifications are acted upon, not history appends
    pub fn is_notify(&self) -> bool {
        self.kind == "notify"
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebMessage {
    pub key: MessageKey,
    #[serde(default)]
    pub message: Option<MessageContent>,
    #[serde(default)]
    pub push_name: Option<String>,
    /// Seconds since epoch; clients send either a number or a numeric string
    #[serde(default)]
    pub message_timestamp: Option<Value>,
}

impl WebMessage {
    pub fn timestamp_secs(&self) -> Option<i64> {
        match self.message_timestamp.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKey {
    pub remote_jid: String,
    #[serde(default)]
    pub from_me: bool,
    #[serde(default)]
    pub participant: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    #[serde(default)]
    pub conversation: Option<String>,
    #[serde(default)]
    pub extended_text_message: Option<ExtendedTextMessage>,
}

impl MessageContent {
    pub fn text(&self) -> Option<&str> {
        self.conversation
            .as_deref()
            .or_else(|| self.extended_text_message.as_ref()?.text.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExtendedTextMessage {
    #[serde(default)]
    pub text: Option<String>,
}
