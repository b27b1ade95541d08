//! Database layer for groupwrap
//!
//! Provides an in-memory SQLite store per export, with embedded migrations.

pub mod messages;
pub mod repo;
pub mod schema;

pub use messages::{parse_messages, ChatMessage};
pub use repo::{Database, LoadSummary};
