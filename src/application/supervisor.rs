//! Connection lifecycle supervisor
//!
//! Owns the connection for the life of the process. Each pass loads the stored
//! session, negotiates a version, connects and then drains the event stream one
//! event at a time. A close that is not a logout starts a new pass from scratch;
//! a logout ends the run. Restarts are bounded by [`ReconnectPolicy`].

use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::BotError;
use crate::application::messaging::MessageDispatcher;
use crate::application::services::WelcomeService;
use crate::domain::entities::{ClientEvent, ConnectionStatus, ConnectionUpdate, SessionCredentials};
use crate::domain::traits::{ConnectOptions, Connection, Connector, ProtocolClient, ProtocolVersion, SessionStore};
use crate::infrastructure::qr::QrPresenter;

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    ClosedRetryable,
    ClosedTerminal,
}

/// Bound on consecutive restarts that never reach `open`
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(1),
        }
    }
}

/// Result of a run that ended by logout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of connections opened, including the first
    pub connections: u32,
}

/// How a single connection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Retry,
    LoggedOut,
}

pub struct Supervisor {
    connector: Arc<dyn Connector>,
    store: Arc<dyn SessionStore>,
    dispatcher: MessageDispatcher,
    welcome: WelcomeService,
    qr: QrPresenter,
    browser: [String; 3],
    policy: ReconnectPolicy,
    state: ConnectionState,
}

impl Supervisor {
    pub fn new(
        connector: Arc<dyn Connector>,
        store: Arc<dyn SessionStore>,
        dispatcher: MessageDispatcher,
        qr: QrPresenter,
    ) -> Self {
        Self {
            connector,
            store,
            dispatcher,
            welcome: WelcomeService::new(),
            qr,
            browser: ["Ubuntu".to_string(), "Chrome".to_string(), "22.04.4".to_string()],
            policy: ReconnectPolicy::default(),
            state: ConnectionState::Connecting,
        }
    }

    pub fn with_browser(mut self, browser: [String; 3]) -> Self {
        self.browser = browser;
        self
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Run until the session is logged out or the restart bound is exceeded
    pub async fn run(&mut self) -> Result<RunSummary, BotError> {
        let mut connections = 0;
        let mut failures = 0;

        loop {
            self.transition(ConnectionState::Connecting);
            connections += 1;

            match self.run_once().await {
                Ok(SessionEnd::LoggedOut) => {
                    self.transition(ConnectionState::ClosedTerminal);
                    return Ok(RunSummary { connections });
                }
                Ok(SessionEnd::Retry) => {}
                Err(e) => tracing::error!("Connection attempt failed: {}", e),
            }

            if self.state == ConnectionState::Open {
                failures = 0;
            }
            self.transition(ConnectionState::ClosedRetryable);

            failures += 1;
            if failures > self.policy.max_attempts {
                return Err(BotError::ReconnectLimit(self.policy.max_attempts));
            }

            tracing::info!("Reconnecting (attempt {}/{})", failures, self.policy.max_attempts);
            tokio::time::sleep(self.policy.delay).await;
        }
    }

    async fn run_once(&mut self) -> Result<SessionEnd, BotError> {
        let mut session = self.store.load().await?;
        if session.is_fresh() {
            tracing::info!("No stored session, waiting for QR pairing");
        }

        let version = match self.connector.latest_version().await {
            Ok(version) => version,
            Err(e) => {
                tracing::warn!("Failed to fetch latest version: {}, using default", e);
                ProtocolVersion::default()
            }
        };
        tracing::info!("Using WA v{}", version);

        let Connection { client, mut events } = self
            .connector
            .connect(ConnectOptions {
                version,
                browser: self.browser.clone(),
                credentials: session.clone(),
            })
            .await?;

        let end = loop {
            let Some(event) = events.recv().await else {
                tracing::warn!("Event stream ended without a close");
                break SessionEnd::Retry;
            };

            if let Some(end) = self.handle_event(client.as_ref(), &mut session, event).await {
                break end;
            }
        };

        if let Err(e) = client.close().await {
            tracing::debug!("Error closing connection: {}", e);
        }
        Ok(end)
    }

    async fn handle_event(
        &mut self,
        client: &dyn ProtocolClient,
        session: &mut SessionCredentials,
        event: ClientEvent,
    ) -> Option<SessionEnd> {
        tracing::trace!("Handling {}", event.name());
        match event {
            ClientEvent::CredsUpdate(update) => {
                session.merge(update);
                if let Err(e) = self.store.save(session).await {
                    tracing::error!("Failed to persist credentials: {}", e);
                }
                None
            }
            ClientEvent::ConnectionUpdate(update) => self.handle_connection_update(&update),
            ClientEvent::GroupParticipantsUpdate(update) => {
                if let Err(e) = self.welcome.handle(client, &update).await {
                    tracing::error!("Failed to welcome participants in {}: {}", update.id, e);
                }
                None
            }
            ClientEvent::MessagesUpsert(upsert) => {
                for message in self.dispatcher.parse_upsert(&upsert) {
                    if let Err(e) = self.dispatcher.dispatch(client, &message).await {
                        tracing::error!("[{}] Command failed: {}", message.group_id, e);
                    }
                }
                None
            }
        }
    }

    fn handle_connection_update(&mut self, update: &ConnectionUpdate) -> Option<SessionEnd> {
        if let Some(code) = &update.qr {
            self.qr.present(code);
        }

        match update.connection {
            Some(ConnectionStatus::Open) => {
                self.transition(ConnectionState::Open);
                tracing::info!("✅ BOT is online");
                None
            }
            Some(ConnectionStatus::Close) => {
                let reason = update.disconnect_reason();
                let should_reconnect = !reason.is_terminal();
                tracing::info!(
                    "Connection closed due to {:?} ({}), reconnecting: {}",
                    reason,
                    update.error_message().unwrap_or("no error"),
                    should_reconnect
                );
                Some(if should_reconnect { SessionEnd::Retry } else { SessionEnd::LoggedOut })
            }
            Some(ConnectionStatus::Connecting) | None => None,
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            tracing::debug!("Connection state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}
