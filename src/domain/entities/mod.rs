//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod event;
pub mod group;
pub mod message;
pub mod session;

pub use command::{first_token, CommandSpec, Trigger};
pub use event::{
    ClientEvent, ConnectionStatus, ConnectionUpdate, DisconnectReason, GroupParticipantsUpdate,
    MessagesUpsert, RawEvent, WebMessage,
};
pub use group::{AdminRole, GroupMetadata, Participant, ParticipantAction};
pub use message::{InboundMessage, MediaRef, OutgoingMessage};
pub use session::SessionCredentials;
