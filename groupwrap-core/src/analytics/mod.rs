//! Analytics for groupwrap
//!
//! Turns a loaded export into its Wrapped output:
//! - [`store`]: the aggregate queries an analytics backend answers
//! - [`stats`]: gathers every query into one [`Stats`](crate::Stats) snapshot
//! - [`cards`]: picks superlative cards from the snapshot
//! - [`wrapped`]: the end-to-end pipeline from raw text to output

pub mod cards;
pub mod stats;
pub mod store;
pub mod wrapped;

pub use cards::CardEngine;
pub use stats::collect_stats;
pub use store::AnalyticsStore;
pub use wrapped::generate_wrapped;
