use crate::application::errors::BotError;
use crate::domain::entities::message::jid_user;
use crate::domain::entities::{GroupParticipantsUpdate, OutgoingMessage, ParticipantAction};
use crate::domain::traits::ProtocolClient;

/// Greets participants as they are added to a group
#[derive(Debug, Default, Clone, Copy)]
pub struct WelcomeService;

impl WelcomeService {
    pub fn new() -> Self {
        Self
    }

    pub fn welcome_text(participant: &str) -> String {
        format!("👋 Welcome @{} to the group!", jid_user(participant))
    }

    /// Send one welcome per added participant, in order. Returns how many were sent.
    pub async fn handle(
        &self,
        client: &dyn ProtocolClient,
        update: &GroupParticipantsUpdate,
    ) -> Result<usize, BotError> {
        if update.action != ParticipantAction::Add {
            return Ok(0);
        }

        for participant in &update.participants {
            let message = OutgoingMessage::text(Self::welcome_text(participant))
                .with_mentions(vec![participant.clone()]);
            client.send_message(&update.id, message).await?;
        }

        tracing::info!("Welcomed {} participant(s) in {}", update.participants.len(), update.id);
        Ok(update.participants.len())
    }
}
