//! Domain layer - Core types with no infrastructure dependencies
//!
//! This layer contains:
//! - Entities: Messages, group metadata, client events, session state, commands
//! - Traits: Abstractions for infrastructure (ProtocolClient, Connector, SessionStore, MediaResolver)

pub mod entities;
pub mod traits;
