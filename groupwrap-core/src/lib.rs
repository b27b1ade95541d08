//! # groupwrap-core
//!
//! Core library for groupwrap - a "Wrapped"-style summary of an exported group
//! chat.
//!
//! This library provides:
//! - Ingestion of raw chat exports (bracketed and dash-separated line layouts)
//!   into canonical lines with unambiguous UTC timestamps
//! - An in-memory SQLite analytics store answering aggregate queries
//! - The personality card engine
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three stages:
//! - **Ingest:** raw text is cleaned, its convention detected, and every
//!   message header rewritten to `[DD.MM.YY, HH:MM:SS]`
//! - **Aggregate:** canonical lines are loaded into SQLite and summarised
//!   into a [`Stats`] snapshot
//! - **Cards:** the [`CardEngine`](analytics::CardEngine) awards superlatives
//!
//! ## Example
//!
//! ```rust,no_run
//! use groupwrap_core::analytics::generate_wrapped;
//! use groupwrap_core::Config;
//! use rand::SeedableRng;
//!
//! let config = Config::load().expect("failed to load config");
//! let transcript = std::fs::read_to_string("chat.txt").expect("failed to read export");
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//!
//! let output = generate_wrapped(&transcript, &config, &mut rng).expect("ingest failed");
//! println!("{}", serde_json::to_string_pretty(&output).unwrap());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use ingest::{ingest, IngestedExport};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod types;
