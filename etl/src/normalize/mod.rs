//! Normalization of the reference tables.
//!
//! - Catalog: channel flags, offer type codes, 1-based renumbering
//! - Profile: gender codes, mean income imputation

pub mod catalog;
pub mod profile;

pub use catalog::{normalize_catalog, NormalizedCatalog, OfferTypePolicy, CHANNELS};
pub use profile::{normalize_profiles, NormalizedProfiles};
