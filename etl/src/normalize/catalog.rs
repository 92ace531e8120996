//! Offer catalog normalization.
//!
//! ```text
//! id | channels             | offer_type     →   index | web email mobile social | offer_type
//! ab | [web, email]         | bogo           →   1     | 1   1     0      0      | 3
//! cd | [email, mobile]      | informational  →   2     | 0   1     1      0      | 1
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{NormalizeError, NormalizeResult};
use crate::logs::log_warning;
use crate::models::{ChannelList, Offer, OfferRef, OfferTypeCode, RawOffer};

/// Channel names turned into flag columns, in column order.
pub const CHANNELS: [&str; 4] = ["web", "email", "mobile", "social"];

/// What to do with offer type text that matches no known category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferTypePolicy {
    /// Write the `"error"` sentinel and keep going.
    #[default]
    Sentinel,
    /// Fail with [`NormalizeError::UnrecognizedOfferType`].
    Reject,
}

/// Normalized catalog, indexed 1..N.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizedCatalog {
    pub offers: Vec<Offer>,
}

impl NormalizedCatalog {
    /// Look up an offer by its 1-based reference. `None` for [`OfferRef::NONE`].
    pub fn get(&self, offer: OfferRef) -> Option<&Offer> {
        let position = (offer.0 as usize).checked_sub(1)?;
        self.offers.get(position)
    }

    /// References of offers carrying the unrecognized-type sentinel.
    pub fn unrecognized(&self) -> Vec<OfferRef> {
        self.offers
            .iter()
            .filter(|o| o.offer_type.is_error())
            .map(|o| o.index)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

fn channel_flag(channels: &ChannelList, name: &str) -> u8 {
    u8::from(channels.contains(name))
}

/// Normalize the offer catalog.
///
/// Rows keep catalog order and are renumbered from 1.
pub fn normalize_catalog(
    raw: Vec<RawOffer>,
    policy: OfferTypePolicy,
) -> NormalizeResult<NormalizedCatalog> {
    let mut offers = Vec::with_capacity(raw.len());

    for (position, row) in raw.into_iter().enumerate() {
        let index = position + 1;
        let offer_type = OfferTypeCode::from_text(&row.offer_type);

        if offer_type.is_error() {
            match policy {
                OfferTypePolicy::Reject => {
                    return Err(NormalizeError::UnrecognizedOfferType {
                        index,
                        value: row.offer_type,
                    });
                }
                OfferTypePolicy::Sentinel => {
                    log_warning(format!(
                        "Offer {} ('{}'): unrecognized offer type '{}'",
                        index, row.id, row.offer_type
                    ));
                }
            }
        }

        let [web, email, mobile, social] = CHANNELS.map(|c| channel_flag(&row.channels, c));

        offers.push(Offer {
            index: OfferRef(index as u32),
            difficulty: row.difficulty,
            duration: row.duration,
            offer_type,
            reward: row.reward,
            web,
            email,
            mobile,
            social,
        });
    }

    Ok(NormalizedCatalog { offers })
}
