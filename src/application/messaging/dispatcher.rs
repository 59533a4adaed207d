//! Message dispatcher - Routes group messages to command handlers

use crate::application::errors::BotError;
use crate::application::services::command_service::{CommandContext, CommandService};
use crate::domain::entities::{InboundMessage, MessagesUpsert};
use crate::domain::traits::ProtocolClient;
use super::parser::MessageParser;

/// Message dispatcher - filters inbound messages and runs the matching command
pub struct MessageDispatcher {
    parser: MessageParser,
    commands: CommandService,
}

impl MessageDispatcher {
    pub fn new(commands: CommandService) -> Self {
        Self {
            parser: MessageParser::new(),
            commands,
        }
    }

    /// Messages of an upsert batch that pass the dispatch preconditions
    pub fn parse_upsert(&self, upsert: &MessagesUpsert) -> Vec<InboundMessage> {
        self.parser.parse_upsert(upsert)
    }

    /// Dispatch one message.
    ///
    /// Returns the trigger of the command that ran, or `None` when the message
    /// was ignored. Self-authored, non-group and empty messages are ignored
    /// without logging.
    pub async fn dispatch(
        &self,
        client: &dyn ProtocolClient,
        message: &InboundMessage,
    ) -> Result<Option<&'static str>, BotError> {
        if !message.is_dispatchable() {
            return Ok(None);
        }

        let Some((command, args)) = self.commands.find(&message.text) else {
            return Ok(None);
        };

        let trigger = command.spec.trigger.as_str();
        tracing::debug!("[{}] {} from {}", message.group_id, trigger.trim_end(), message.sender);

        let ctx = CommandContext {
            client,
            message,
            args,
            commands: &self.commands,
        };
        command.run(&ctx).await?;

        Ok(Some(trigger))
    }
}
