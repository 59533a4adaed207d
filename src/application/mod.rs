//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Errors: Application-wide error types
//! - Messaging: Message parsing and command dispatch
//! - Services: Command table and group membership welcomer
//! - Supervisor: Connection lifecycle and reconnects

pub mod errors;
pub mod messaging;
pub mod services;
pub mod supervisor;

pub use supervisor::{ConnectionState, ReconnectPolicy, RunSummary, Supervisor};
