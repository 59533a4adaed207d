//! Application services - Command table and group membership handling

pub mod command_service;
pub mod welcome_service;

pub use command_service::{Command, CommandContext, CommandHandler, CommandService};
pub use welcome_service::WelcomeService;
