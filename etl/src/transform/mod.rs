//! Event log transformation.
//!
//! This module turns the raw event log into the final table:
//! - Events: payload decoding and composite keys
//! - Linker: transactions matched to same-time completions
//! - Aggregator: one row per person/offer pair
//! - Merge: joins with the normalized catalog and profiles
//! - Pipeline: all stages in order

pub mod aggregator;
pub mod events;
pub mod linker;
pub mod merge;
pub mod pipeline;

pub use aggregator::aggregate_events;
pub use events::{preprocess_event, preprocess_events};
pub use linker::{link_transactions, LinkResult};
pub use merge::{merge_with_catalog, merge_with_profiles};
