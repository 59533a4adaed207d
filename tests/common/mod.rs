//! Shared fakes for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use tokio::sync::mpsc;

use wa_groupbot::application::errors::{BotError, MediaError};
use wa_groupbot::domain::entities::{
    ClientEvent, GroupMetadata, OutgoingMessage, Participant, ParticipantAction,
};
use wa_groupbot::domain::traits::{
    ConnectOptions, Connection, Connector, MediaResolver, ProtocolClient, ProtocolVersion,
};

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Calls observed by [`FakeClient`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Send { jid: String, message: OutgoingMessage },
    Metadata { group_id: String },
    Participants { group_id: String, participants: Vec<String>, action: ParticipantAction },
}

/// In-memory protocol client that records every call
#[derive(Default)]
pub struct FakeClient {
    pub calls: Mutex<Vec<Call>>,
    pub participants: Vec<Participant>,
    pub fail_metadata: bool,
}

impl FakeClient {
    pub fn with_participants(participants: Vec<Participant>) -> Self {
        Self {
            participants,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().filter_map(|m| m.text).collect()
    }

    pub fn removals(&self) -> Vec<(String, Vec<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Participants { group_id, participants, action: ParticipantAction::Remove } => {
                    Some((group_id, participants))
                }
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ProtocolClient for FakeClient {
    async fn send_message(&self, jid: &str, message: OutgoingMessage) -> Result<String, BotError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(Call::Send { jid: jid.to_string(), message });
        Ok(format!("MSG{}", calls.len()))
    }

    async fn group_metadata(&self, group_id: &str) -> Result<GroupMetadata, BotError> {
        self.calls.lock().unwrap().push(Call::Metadata { group_id: group_id.to_string() });
        if self.fail_metadata {
            return Err(BotError::Network("metadata unavailable".to_string()));
        }
        Ok(GroupMetadata {
            id: group_id.to_string(),
            subject: None,
            participants: self.participants.clone(),
        })
    }

    async fn group_participants_update(
        &self,
        group_id: &str,
        participants: &[String],
        action: ParticipantAction,
    ) -> Result<(), BotError> {
        self.calls.lock().unwrap().push(Call::Participants {
            group_id: group_id.to_string(),
            participants: participants.to_vec(),
            action,
        });
        Ok(())
    }
}

/// Media resolver returning a fixed outcome
pub struct StubResolver(pub Result<String, MediaError>);

#[async_trait]
impl MediaResolver for StubResolver {
    async fn resolve(&self, _source_url: &str) -> Result<String, MediaError> {
        self.0.clone()
    }
}

/// Connector that replays one scripted event list per connection
pub struct ScriptedConnector {
    pub client: Arc<FakeClient>,
    scripts: Mutex<VecDeque<Vec<ClientEvent>>>,
    pub connects: Mutex<Vec<ConnectOptions>>,
}

impl ScriptedConnector {
    pub fn new(client: Arc<FakeClient>, scripts: Vec<Vec<ClientEvent>>) -> Self {
        Self {
            client,
            scripts: Mutex::new(scripts.into()),
            connects: Mutex::new(Vec::new()),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.lock().unwrap().len()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn latest_version(&self) -> Result<ProtocolVersion, BotError> {
        Err(BotError::Network("version endpoint offline".to_string()))
    }

    async fn connect(&self, options: ConnectOptions) -> Result<Connection, BotError> {
        self.connects.lock().unwrap().push(options);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BotError::Network("no more scripted connections".to_string()))?;

        let (tx, rx) = mpsc::channel(script.len().max(1));
        for event in script {
            tx.send(event).await.map_err(|e| BotError::Internal(e.to_string()))?;
        }

        Ok(Connection {
            client: self.client.clone(),
            events: rx,
        })
    }
}
