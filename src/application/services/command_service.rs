//! Group commands and the ordered table they are matched from

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::{BotError, MediaError};
use crate::domain::entities::message::{jid_user, user_jid};
use crate::domain::entities::{first_token, CommandSpec, InboundMessage, OutgoingMessage, ParticipantAction};
use crate::domain::traits::{MediaResolver, ProtocolClient};

pub const ADMIN_REFUSAL: &str = "🚫 You must be an admin to use this command.";
pub const REMOVE_REFUSAL: &str = "🚫 Only admins can use this command.";
pub const DOWNLOAD_CAPTION: &str = "📥 Downloaded media:";
pub const DOWNLOAD_FAILED: &str = "❌ Failed to download media.";
pub const DOWNLOAD_ERROR: &str = "❌ Error downloading media.";

/// Everything a handler may touch while running one command
pub struct CommandContext<'a> {
    pub client: &'a dyn ProtocolClient,
    pub message: &'a InboundMessage,
    /// Text after the trigger; empty for exact triggers
    pub args: &'a str,
    pub commands: &'a CommandService,
}

impl CommandContext<'_> {
    /// Reply in the group the command came from
    pub async fn reply(&self, message: OutgoingMessage) -> Result<String, BotError> {
        self.client.send_message(&self.message.group_id, message).await
    }

    /// Fresh admin check against live group metadata
    pub async fn sender_is_admin(&self) -> Result<bool, BotError> {
        let metadata = self.client.group_metadata(&self.message.group_id).await?;
        Ok(metadata.is_admin(&self.message.sender))
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), BotError>;
}

/// A (trigger, handler) pair
pub struct Command {
    pub spec: CommandSpec,
    handler: Box<dyn CommandHandler>,
}

impl Command {
    pub fn new<H: CommandHandler + 'static>(spec: CommandSpec, handler: H) -> Self {
        Self {
            spec,
            handler: Box::new(handler),
        }
    }

    pub async fn run(&self, ctx: &CommandContext<'_>) -> Result<(), BotError> {
        self.handler.handle(ctx).await
    }
}

/// Ordered command table; the first matching trigger wins
#[derive(Default)]
pub struct CommandService {
    commands: Vec<Command>,
}

impl CommandService {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in group commands, in matching order
    pub fn with_defaults(media: Arc<dyn MediaResolver>) -> Self {
        let mut service = Self::new();
        service.register(Command::new(CommandSpec::exact("!hello"), HelloCommand));
        service.register(Command::new(CommandSpec::exact("!help"), HelpCommand));
        service.register(Command::new(CommandSpec::exact("!admin"), AdminCommand));
        service.register(Command::new(CommandSpec::exact("@all"), MentionAllCommand));
        service.register(Command::new(
            CommandSpec::prefix("!download ", "!download <url>"),
            DownloadCommand { media },
        ));
        service.register(Command::new(
            CommandSpec::prefix("!remove ", "!remove <number>"),
            RemoveCommand,
        ));
        service
    }

    pub fn register(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Find the first command matching the text, with its argument remainder
    pub fn find<'t>(&self, text: &'t str) -> Option<(&Command, &'t str)> {
        self.commands
            .iter()
            .find_map(|c| c.spec.trigger.matches(text).map(|args| (c, args)))
    }

    pub fn specs(&self) -> impl Iterator<Item = &CommandSpec> {
        self.commands.iter().map(|c| &c.spec)
    }

    pub fn help_text(&self) -> String {
        let mut help = "🛠 *Available Commands*:".to_string();
        for spec in self.specs() {
            help.push('\n');
            help.push_str(spec.usage);
        }
        help
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

struct HelloCommand;

#[async_trait]
impl CommandHandler for HelloCommand {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), BotError> {
        let sender = &ctx.message.sender;
        let text = format!("👋 Hello @{}!", jid_user(sender));
        ctx.reply(OutgoingMessage::text(text).with_mentions(vec![sender.clone()])).await?;
        Ok(())
    }
}

struct HelpCommand;

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), BotError> {
        ctx.reply(OutgoingMessage::text(ctx.commands.help_text())).await?;
        Ok(())
    }
}

struct AdminCommand;

#[async_trait]
impl CommandHandler for AdminCommand {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), BotError> {
        let reply = if ctx.sender_is_admin().await? {
            let sender = &ctx.message.sender;
            OutgoingMessage::text(format!("🫡 Hello Admin @{}", jid_user(sender)))
                .with_mentions(vec![sender.clone()])
        } else {
            OutgoingMessage::text(ADMIN_REFUSAL)
        };
        ctx.reply(reply).await?;
        Ok(())
    }
}

struct MentionAllCommand;

#[async_trait]
impl CommandHandler for MentionAllCommand {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), BotError> {
        let metadata = ctx.client.group_metadata(&ctx.message.group_id).await?;
        let mentions = metadata.participant_ids();

        let mut text = "📢 @all\n".to_string();
        for id in &mentions {
            text.push('@');
            text.push_str(jid_user(id));
            text.push(' ');
        }

        ctx.reply(OutgoingMessage::text(text).with_mentions(mentions)).await?;
        Ok(())
    }
}

struct DownloadCommand {
    media: Arc<dyn MediaResolver>,
}

#[async_trait]
impl CommandHandler for DownloadCommand {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), BotError> {
        let Some(url) = first_token(ctx.args) else {
            return Ok(());
        };

        let reply = match self.media.resolve(url).await {
            Ok(media_url) => OutgoingMessage::video(media_url).with_caption(DOWNLOAD_CAPTION),
            Err(MediaError::ResolutionFailed(reason)) => {
                tracing::warn!("Media resolution failed for {}: {}", url, reason);
                OutgoingMessage::text(DOWNLOAD_FAILED)
            }
            Err(MediaError::Transport(reason)) => {
                tracing::error!("Download error: {}", reason);
                OutgoingMessage::text(DOWNLOAD_ERROR)
            }
        };

        ctx.reply(reply).await?;
        Ok(())
    }
}

struct RemoveCommand;

#[async_trait]
impl CommandHandler for RemoveCommand {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<(), BotError> {
        if !ctx.sender_is_admin().await? {
            ctx.reply(OutgoingMessage::text(REMOVE_REFUSAL)).await?;
            return Ok(());
        }

        let Some(number) = first_token(ctx.args).map(digits_only).filter(|n| !n.is_empty()) else {
            return Ok(());
        };

        let target = user_jid(&number);
        tracing::info!("Removing {} from {}", target, ctx.message.group_id);
        ctx.client
            .group_participants_update(&ctx.message.group_id, &[target], ParticipantAction::Remove)
            .await
    }
}

/// Keep only ASCII digits. Length and country code are not validated.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
