//! Lookup joins from aggregates to the reference tables.

use crate::error::{MergeError, MergeResult};
use crate::models::{AggregateRecord, MergedRecord, OfferAttributes, ProfileAttributes};
use crate::normalize::{NormalizedCatalog, NormalizedProfiles};

/// Attach catalog attributes by offer reference.
///
/// Unlinked transactions (offer 0) get all-zero attributes.
pub fn merge_with_catalog(
    records: Vec<AggregateRecord>,
    catalog: &NormalizedCatalog,
) -> MergeResult<Vec<MergedRecord>> {
    records
        .into_iter()
        .map(|aggregate| -> MergeResult<MergedRecord> {
            let offer = if aggregate.offer.is_none() {
                OfferAttributes::unlinked()
            } else {
                catalog
                    .get(aggregate.offer)
                    .map(OfferAttributes::from)
                    .ok_or(MergeError::UnknownOffer(aggregate.offer.0))?
            };

            Ok(MergedRecord {
                aggregate,
                offer,
                profile: None,
            })
        })
        .collect()
}

/// Attach profile attributes by person reference.
pub fn merge_with_profiles(
    mut records: Vec<MergedRecord>,
    profiles: &NormalizedProfiles,
) -> MergeResult<Vec<MergedRecord>> {
    for record in &mut records {
        let person = record.aggregate.person;
        let profile = profiles
            .get(person)
            .ok_or(MergeError::UnknownPerson(person.0))?;
        record.profile = Some(ProfileAttributes::from(profile));
    }

    Ok(records)
}
