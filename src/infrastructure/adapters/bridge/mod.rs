//! WhatsApp Web bridge adapter
//!
//! The protocol itself (noise handshake, Signal sessions, pairing) runs in a
//! separate bridge process. This adapter speaks its HTTP/JSON API: one session
//! per connection, events pulled by long polling.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::application::errors::{BotError, ConfigError};
use crate::domain::entities::{
    ClientEvent, ConnectionUpdate, GroupMetadata, OutgoingMessage, ParticipantAction, RawEvent,
};
use crate::domain::traits::{ConnectOptions, Connection, Connector, ProtocolClient, ProtocolVersion};

/// Events buffered between the poller and the supervisor
const EVENT_BUFFER: usize = 64;

/// Consecutive poll failures before the connection is reported closed
const MAX_POLL_FAILURES: u32 = 3;

/// Status reported when the bridge stops answering (connection lost)
const LOST_STATUS: u16 = 408;

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: [u32; 3],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    cursor: u64,
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    jid: &'a str,
    content: &'a OutgoingMessage,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    key: SentKey,
}

#[derive(Debug, Deserialize)]
struct SentKey {
    id: String,
}

#[derive(Debug, Serialize)]
struct ParticipantsRequest<'a> {
    participants: &'a [String],
    action: ParticipantAction,
}

/// Build `base/segments...`, escaping each segment
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, BotError> {
    let mut url = Url::parse(base)
        .map_err(|e| ConfigError::InvalidValue(format!("bridge url {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| BotError::Internal(format!("bridge url {} cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn check(response: Response) -> Result<Response, BotError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BotError::Protocol(format!("bridge returned {}: {}", status, body)))
}

/// Opens bridge sessions
pub struct BridgeConnector {
    http: Client,
    base_url: String,
    poll_timeout: Duration,
}

impl BridgeConnector {
    pub fn new(base_url: impl Into<String>, poll_timeout: Duration, request_timeout: Duration) -> Result<Self, BotError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| BotError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            poll_timeout,
        })
    }
}

#[async_trait]
impl Connector for BridgeConnector {
    async fn latest_version(&self) -> Result<ProtocolVersion, BotError> {
        let response = self
            .http
            .get(endpoint(&self.base_url, &["version"])?)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let data: VersionResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(ProtocolVersion(data.version))
    }

    async fn connect(&self, options: ConnectOptions) -> Result<Connection, BotError> {
        let response = self
            .http
            .post(endpoint(&self.base_url, &["sessions"])?)
            .json(&options)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let data: CreateSessionResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        tracing::info!("Opened bridge session {}", data.session_id);

        let client = BridgeClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            session_id: data.session_id,
        };

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let poller = EventPoller {
            http: self.http.clone(),
            url: endpoint(&self.base_url, &["sessions", client.session_id.as_str(), "events"])?,
            timeout: self.poll_timeout,
        };
        tokio::spawn(poller.run(tx));

        Ok(Connection {
            client: Arc::new(client),
            events: rx,
        })
    }
}

/// Long-polls a session's event feed into a channel
struct EventPoller {
    http: Client,
    url: Url,
    timeout: Duration,
}

impl EventPoller {
    async fn poll(&self, cursor: u64) -> Result<EventsResponse, BotError> {
        let response = self
            .http
            .get(self.url.clone())
            .query(&[("cursor", cursor), ("timeout", self.timeout.as_secs())])
            .timeout(self.timeout + Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        check(response)
            .await?
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))
    }

    /// Runs until the receiver is dropped or the bridge stops answering
    async fn run(self, tx: mpsc::Sender<ClientEvent>) {
        let mut cursor = 0;
        let mut failures = 0;

        while !tx.is_closed() {
            let batch = match self.poll(cursor).await {
                Ok(batch) => {
                    failures = 0;
                    batch
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!("Event poll failed ({}/{}): {}", failures, MAX_POLL_FAILURES, e);
                    if failures >= MAX_POLL_FAILURES {
                        let closed = ConnectionUpdate::closed(Some(LOST_STATUS), e.to_string());
                        let _ = tx.send(ClientEvent::ConnectionUpdate(closed)).await;
                        return;
                    }
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };

            cursor = batch.cursor;
            for raw in batch.events {
                let name = raw.event.clone();
                match ClientEvent::decode(raw) {
                    Ok(Some(event)) => {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => tracing::debug!("Skipping event {}", name),
                    Err(e) => tracing::warn!("Malformed {} payload: {}", name, e),
                }
            }
        }
    }
}

/// Client handle for one bridge session
pub struct BridgeClient {
    http: Client,
    base_url: String,
    session_id: String,
}

impl BridgeClient {
    fn url(&self, segments: &[&str]) -> Result<Url, BotError> {
        let mut all = vec!["sessions", self.session_id.as_str()];
        all.extend_from_slice(segments);
        endpoint(&self.base_url, &all)
    }
}

#[async_trait]
impl ProtocolClient for BridgeClient {
    async fn send_message(&self, jid: &str, message: OutgoingMessage) -> Result<String, BotError> {
        tracing::debug!("Sending to {}: {:?}", jid, message.text);

        let response = self
            .http
            .post(self.url(&["messages"])?)
            .json(&SendMessageRequest { jid, content: &message })
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let data: SendMessageResponse = check(response)
            .await?
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(data.key.id)
    }

    async fn group_metadata(&self, group_id: &str) -> Result<GroupMetadata, BotError> {
        let response = self
            .http
            .get(self.url(&["groups", group_id])?)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        check(response)
            .await?
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))
    }

    async fn group_participants_update(
        &self,
        group_id: &str,
        participants: &[String],
        action: ParticipantAction,
    ) -> Result<(), BotError> {
        let response = self
            .http
            .post(self.url(&["groups", group_id, "participants"])?)
            .json(&ParticipantsRequest { participants, action })
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        check(response).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), BotError> {
        let response = self
            .http
            .delete(self.url(&[])?)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        check(response).await?;
        tracing::debug!("Closed bridge session {}", self.session_id);
        Ok(())
    }
}
