//! Message parser - Turns raw upserts into dispatchable messages

use chrono::{TimeZone, Utc};

use crate::domain::entities::{InboundMessage, MessagesUpsert, WebMessage};

/// Extracts the group text messages the dispatcher cares about
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageParser;

impl MessageParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse every dispatchable message of a live notification batch
    pub fn parse_upsert(&self, upsert: &MessagesUpsert) -> Vec<InboundMessage> {
        if !upsert.is_notify() {
            return Vec::new();
        }

        upsert
            .messages
            .iter()
            .filter_map(|m| self.parse(m))
            .filter(InboundMessage::is_dispatchable)
            .collect()
    }

    /// Parse one message. Returns `None` for messages without content.
    pub fn parse(&self, raw: &WebMessage) -> Option<InboundMessage> {
        let content = raw.message.as_ref()?;

        let group_id = raw.key.remote_jid.clone();
        let sender = raw.key.participant.clone().unwrap_or_else(|| group_id.clone());
        let text = content.text().unwrap_or_default();

        let mut message = InboundMessage::new(group_id, sender, text)
            .with_from_self(raw.key.from_me)
            .with_push_name(raw.push_name.clone());

        if let Some(id) = &raw.key.id {
            message = message.with_id(id.clone());
        }
        if let Some(ts) = raw.timestamp_secs().and_then(|s| Utc.timestamp_opt(s, 0).single()) {
            message = message.with_timestamp(ts);
        }

        Some(message)
    }
}
