//! Message handling - Parsing and dispatching inbound group messages

pub mod dispatcher;
pub mod parser;

pub use dispatcher::MessageDispatcher;
pub use parser::MessageParser;
