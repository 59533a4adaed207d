//! WhatsApp group bot: connection supervision, group welcomes and a small
//! command set on top of an external protocol client.

pub mod application;
pub mod domain;
pub mod infrastructure;
