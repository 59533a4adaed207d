//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Multi-file session persistence
//! - Media: Short-video URL resolution over HTTP
//! - Adapters: Protocol client integrations (bridge, console)
//! - QR: Pairing code presentation

pub mod adapters;
pub mod config;
pub mod media;
pub mod qr;
pub mod storage;
