//! High-level pipeline API.
//!
//! Runs every stage in order:
//! catalog → profiles → events → link → aggregate → merge(catalog) → merge(profiles).
//!
//! # Example
//!
//! ```rust,ignore
//! use offer_etl::{run_pipeline, PipelineInput, PipelineOptions};
//!
//! let input: PipelineInput = serde_json::from_str(&tables_json)?;
//! let output = run_pipeline(input, &PipelineOptions::default())?;
//!
//! println!("{} rows", output.records.len());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_warning, quiet_scope};
use crate::models::{
    MergedRecord, OfferIdMap, OfferTypeCode, PersonIdMap, RawEvent, RawOffer, RawProfile,
};
use crate::normalize::{
    normalize_catalog, normalize_profiles, NormalizedCatalog, NormalizedProfiles, OfferTypePolicy,
};

use super::aggregator::aggregate_events;
use super::events::preprocess_events;
use super::linker::link_transactions;
use super::merge::{merge_with_catalog, merge_with_profiles};

/// Options for the pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Handling of offer types matching no known category
    pub offer_type_policy: OfferTypePolicy,

    /// Don't echo log entries to stdout
    pub quiet: bool,
}

impl PipelineOptions {
    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> PipelineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Input tables and lookup dictionaries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineInput {
    pub offers: Vec<RawOffer>,
    pub profiles: Vec<RawProfile>,
    pub events: Vec<RawEvent>,
    pub offer_ids: OfferIdMap,
    pub person_ids: PersonIdMap,
}

/// Counters collected while running
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    pub event_count: usize,
    pub linked_transactions: usize,
    pub unlinked_transactions: usize,
    pub aggregate_count: usize,
    pub unrecognized_offer_types: usize,
    pub imputed_incomes: usize,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub catalog: NormalizedCatalog,
    pub profiles: NormalizedProfiles,
    /// Denormalized table, one row per aggregate in creation order
    pub records: Vec<MergedRecord>,
    pub stats: PipelineStats,
}

impl PipelineOutput {
    /// Serialize the denormalized table as a JSON array.
    pub fn to_json(&self) -> PipelineResult<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }
}

/// Run the full pipeline.
///
/// `quiet` only silences the stdout echo for the duration of this call.
pub fn run_pipeline(
    input: PipelineInput,
    options: &PipelineOptions,
) -> PipelineResult<PipelineOutput> {
    let _quiet = options.quiet.then(quiet_scope);

    let result = run_stages(input, options);
    if let Err(ref e) = result {
        log_error(format!("Pipeline failed: {}", e));
    }
    result
}

fn run_stages(input: PipelineInput, options: &PipelineOptions) -> PipelineResult<PipelineOutput> {
    let PipelineInput {
        offers,
        profiles,
        events,
        offer_ids,
        person_ids,
    } = input;

    // Step 1: Catalog
    log_info(format!("Normalizing catalog ({} offers)...", offers.len()));
    let catalog = normalize_catalog(offers, options.offer_type_policy)?;
    let unrecognized = catalog.unrecognized().len();
    if unrecognized > 0 {
        log_warning(format!(
            "{} offers carry the '{}' offer type",
            unrecognized,
            OfferTypeCode::ERROR_MARKER
        ));
    }

    // Step 2: Profiles
    log_info(format!("Normalizing profiles ({} rows)...", profiles.len()));
    let profiles = normalize_profiles(profiles)?;
    if let Some(mean) = profiles.imputed_income {
        log_info_indent(
            format!("{} missing incomes set to {:.2}", profiles.imputed_count, mean),
            1,
        );
    }

    // Step 3: Events
    log_info(format!("Decoding {} events...", events.len()));
    let decoded = preprocess_events(&events, &offer_ids, &person_ids)?;

    // Step 4: Link
    log_info("Linking transactions to completed offers...");
    let linked = link_transactions(&decoded);
    log_info_indent(
        format!("{} linked, {} unlinked", linked.linked, linked.unlinked),
        1,
    );

    // Step 5: Aggregate
    log_info("Aggregating by person/offer...");
    let aggregates = aggregate_events(&linked.events);
    let aggregate_count = aggregates.len();

    // Step 6: Merge
    log_info("Merging with catalog and profiles...");
    let records = merge_with_catalog(aggregates, &catalog)?;
    let records = merge_with_profiles(records, &profiles)?;
    log_success(format!("{} rows", records.len()));

    let stats = PipelineStats {
        event_count: decoded.len(),
        linked_transactions: linked.linked,
        unlinked_transactions: linked.unlinked,
        aggregate_count,
        unrecognized_offer_types: unrecognized,
        imputed_incomes: profiles.imputed_count,
    };

    Ok(PipelineOutput {
        catalog,
        profiles,
        records,
        stats,
    })
}
