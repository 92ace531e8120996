//! # Offer ETL - offer event linking and aggregation
//!
//! Turns an offer catalog, a customer profile table and an offer/transaction
//! event log into one denormalized table, one row per person/offer pair.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Event log  │────▶│  Preprocess │────▶│    Link     │────▶│  Aggregate  │
//! │ (raw JSON)  │     │ (keys, ids) │     │ (tx→offer)  │     │ (pers-offer)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//! ┌─────────────┐     ┌─────────────┐                                ▼
//! │   Catalog   │────▶│  Normalize  │─────────────────────────▶┌─────────────┐
//! │   Profiles  │     │(codes, fill)│                          │    Merge    │
//! └─────────────┘     └─────────────┘                          └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use offer_etl::{run_pipeline, PipelineInput, PipelineOptions};
//!
//! let input: PipelineInput = serde_json::from_str(&tables_json)?;
//! let output = run_pipeline(input, &PipelineOptions::default())?;
//! println!("{}", output.to_json()?);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`models`] - Row types (offers, profiles, events, aggregates)
//! - [`normalize`] - Catalog and profile normalization
//! - [`transform`] - Event preprocessing, linking, aggregation, merge, pipeline
//! - [`logs`] - Broadcast pipeline logs

// Core modules
pub mod error;
pub mod models;

// Reference tables
pub mod normalize;

// Event log
pub mod transform;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    EventError, EventResult, MergeError, MergeResult, NormalizeError, NormalizeResult,
    PipelineError, PipelineResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AggregateRecord, ChannelList, Event, EventKind, Gender, MergedRecord, Offer,
    OfferAttributes, OfferIdMap, OfferRef, OfferTypeCode, PersonIdMap, PersonRef, Profile,
    ProfileAttributes, RawEvent, RawOffer, RawProfile,
};

// =============================================================================
// Re-exports - Normalization
// =============================================================================

pub use normalize::{
    normalize_catalog, normalize_profiles, NormalizedCatalog, NormalizedProfiles,
    OfferTypePolicy, CHANNELS,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    aggregate_events, link_transactions, merge_with_catalog, merge_with_profiles,
    preprocess_event, preprocess_events, LinkResult,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    run_pipeline, PipelineInput, PipelineOptions, PipelineOutput, PipelineStats,
};

// =============================================================================
// Re-exports - Logs
// =============================================================================

pub use logs::{LogEntry, LogLevel, LOG_BROADCASTER};
