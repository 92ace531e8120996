//! Event log preprocessing.
//!
//! Decodes the semi-structured `value` payload of each raw event into typed
//! columns and builds the composite grouping keys.
//!
//! ```text
//! person | event           | time | value                          →  person | offer | amount | reward | pers-offer
//! 78afa  | offer received  | 0    | {"offer id": "9b98b..."}       →  0      | 4     | 0      | 0      | 0-4
//! 78afa  | transaction     | 132  | {"amount": 19.89}              →  0      | 0     | 19.89  | 0      | 0-0
//! 78afa  | offer completed | 132  | {"offer_id": "9b98b...", ...}  →  0      | 4     | 0      | 5      | 0-4
//! ```

use serde_json::{Map, Value};

use crate::error::{EventError, EventResult};
use crate::models::{
    person_offer_key, person_offer_time_key, Event, EventKind, OfferIdMap, OfferRef,
    PersonIdMap, RawEvent,
};

/// Payload keys that may hold the offer id, checked in order.
const OFFER_ID_KEYS: [&str; 2] = ["offer id", "offer_id"];

fn payload_number(row: usize, payload: &Map<String, Value>, field: &str) -> EventResult<f64> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(0.0),
        Some(value) => value.as_f64().ok_or_else(|| EventError::InvalidPayload {
            row,
            field: field.to_string(),
            message: format!("expected a number, got {}", value),
        }),
    }
}

fn payload_offer(
    row: usize,
    payload: &Map<String, Value>,
    offer_ids: &OfferIdMap,
) -> EventResult<OfferRef> {
    let found = OFFER_ID_KEYS
        .iter()
        .find_map(|key| payload.get(*key).filter(|v| !v.is_null()).map(|v| (*key, v)));

    match found {
        None => Ok(OfferRef::NONE),
        Some((_, Value::String(id))) => {
            offer_ids
                .get(id)
                .copied()
                .ok_or_else(|| EventError::UnknownOffer {
                    row,
                    offer: id.clone(),
                })
        }
        Some((key, other)) => Err(EventError::InvalidPayload {
            row,
            field: key.to_string(),
            message: format!("expected an offer id string, got {}", other),
        }),
    }
}

/// Decode a single raw event.
pub fn preprocess_event(
    row: usize,
    raw: &RawEvent,
    offer_ids: &OfferIdMap,
    person_ids: &PersonIdMap,
) -> EventResult<Event> {
    let kind = EventKind::parse(&raw.event).ok_or_else(|| EventError::UnknownEventKind {
        row,
        kind: raw.event.clone(),
    })?;

    let person = person_ids
        .get(&raw.person)
        .copied()
        .ok_or_else(|| EventError::UnknownPerson {
            row,
            person: raw.person.clone(),
        })?;

    let offer = payload_offer(row, &raw.value, offer_ids)?;
    let amount = payload_number(row, &raw.value, "amount")?;
    let reward = payload_number(row, &raw.value, "reward")?;

    Ok(Event {
        person_offer_time: person_offer_time_key(person, offer, raw.time),
        kind,
        time: raw.time,
        person,
        offer,
        amount,
        reward,
        person_offer: person_offer_key(person, offer),
    })
}

/// Decode the whole event log, keeping log order.
///
/// Fails on the first row whose person or offer id is not in the
/// dictionaries.
pub fn preprocess_events(
    raw: &[RawEvent],
    offer_ids: &OfferIdMap,
    person_ids: &PersonIdMap,
) -> EventResult<Vec<Event>> {
    raw.iter()
        .enumerate()
        .map(|(row, event)| preprocess_event(row, event, offer_ids, person_ids))
        .collect()
}
