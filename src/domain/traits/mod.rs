//! Domain traits - Abstractions for infrastructure implementations

pub mod client;
pub mod media;
pub mod store;

pub use client::{ConnectOptions, Connection, Connector, ProtocolClient, ProtocolVersion};
pub use media::MediaResolver;
pub use store::SessionStore;
