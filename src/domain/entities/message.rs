use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JID server suffix for multi-participant group chats
pub const GROUP_SERVER: &str = "@g.us";

/// JID server suffix for individual users
pub const USER_SERVER: &str = "@s.whatsapp.net";

/// The user part of a JID (everything before `@`)
pub fn jid_user(jid: &str) -> &str {
    jid.split('@').next().unwrap_or(jid)
}

/// Whether the JID belongs to the group-chat namespace
pub fn is_group_jid(jid: &str) -> bool {
    jid.ends_with(GROUP_SERVER)
}

/// Build a user JID from a phone number
pub fn user_jid(number: &str) -> String {
    format!("{}{}", number, USER_SERVER)
}

/// A text message received in a group, ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: String,
    pub sender: String,
    pub group_id: String,
    pub text: String,
    pub from_self: bool,
    pub push_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(group_id: impl Into<String>, sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: sender.into(),
            group_id: group_id.into(),
            text: text.into(),
            from_self: false,
            push_name: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_from_self(mut self, from_self: bool) -> Self {
        self.from_self = from_self;
        self
    }

    pub fn with_push_name(mut self, name: Option<String>) -> Self {
        self.push_name = name;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Only non-empty, foreign, group messages are eligible for commands
    pub fn is_dispatchable(&self) -> bool {
        !self.from_self && !self.text.is_empty() && is_group_jid(&self.group_id)
    }
}

/// Video attachment referenced by URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
}

/// Content of an outbound message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<MediaRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self {
            video: Some(MediaRef { url: url.into() }),
            ..Default::default()
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_mentions(mut self, mentions: Vec<String>) -> Self {
        self.mentions = mentions;
        self
    }
}
