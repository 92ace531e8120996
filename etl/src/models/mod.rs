//! Domain models for the offer ETL pipeline.
//!
//! This module contains the row types flowing between stages:
//!
//! - [`RawOffer`] / [`Offer`] - offer catalog before and after normalization
//! - [`RawProfile`] / [`Profile`] - customer profiles before and after normalization
//! - [`RawEvent`] / [`Event`] - event log rows before and after preprocessing
//! - [`AggregateRecord`] - one row per person/offer pair (or unlinked transaction)
//! - [`MergedRecord`] - aggregate joined with catalog and profile attributes
//!
//! Serialized column names follow the analysis table layout
//! (`pers-offer-time`, `completed before viewed`, ...).

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// References
// =============================================================================

/// Normalized offer reference: 1..N in catalog order, 0 for "no offer".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferRef(pub u32);

impl OfferRef {
    /// Sentinel carried by transactions that are not tied to an offer.
    pub const NONE: OfferRef = OfferRef(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for OfferRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized person reference: 0-based row position in the profile table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonRef(pub usize);

impl fmt::Display for PersonRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw offer id -> normalized offer reference.
pub type OfferIdMap = HashMap<String, OfferRef>;

/// Raw person id -> normalized person reference.
pub type PersonIdMap = HashMap<String, PersonRef>;

// =============================================================================
// Offer Catalog
// =============================================================================

/// Channel field of a raw offer.
///
/// Accepts either a list of channel names or a single delimited string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelList {
    List(Vec<String>),
    Text(String),
}

impl ChannelList {
    /// Whether `name` is one of the channels.
    ///
    /// Lists are checked by membership, strings by substring.
    pub fn contains(&self, name: &str) -> bool {
        match self {
            ChannelList::List(items) => items.iter().any(|c| c == name),
            ChannelList::Text(text) => text.contains(name),
        }
    }
}

/// An offer as it appears in the source catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOffer {
    pub id: String,
    pub difficulty: u32,
    pub duration: u32,
    pub offer_type: String,
    pub reward: u32,
    pub channels: ChannelList,
}

/// Encoded offer type.
///
/// Serializes as `1`, `2`, `3`, or the string `"error"` for
/// [`OfferTypeCode::Unrecognized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferTypeCode {
    Informational,
    Discount,
    Bogo,
    /// Offer type text matched no known category.
    Unrecognized,
}

impl OfferTypeCode {
    /// Marker written in place of a numeric code.
    pub const ERROR_MARKER: &'static str = "error";

    /// Classify offer type text by substring, checked in code order.
    pub fn from_text(text: &str) -> Self {
        if text.contains("informational") {
            Self::Informational
        } else if text.contains("discount") {
            Self::Discount
        } else if text.contains("bogo") {
            Self::Bogo
        } else {
            Self::Unrecognized
        }
    }

    /// Numeric code, or `None` for the error sentinel.
    pub fn code(self) -> Option<u8> {
        match self {
            Self::Informational => Some(1),
            Self::Discount => Some(2),
            Self::Bogo => Some(3),
            Self::Unrecognized => None,
        }
    }

    pub fn is_error(self) -> bool {
        self == Self::Unrecognized
    }
}

impl Serialize for OfferTypeCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.code() {
            Some(code) => serializer.serialize_u8(code),
            None => serializer.serialize_str(Self::ERROR_MARKER),
        }
    }
}

/// A normalized offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Offer {
    /// 1-based position in the catalog.
    pub index: OfferRef,
    pub difficulty: u32,
    pub duration: u32,
    pub offer_type: OfferTypeCode,
    pub reward: u32,
    pub web: u8,
    pub email: u8,
    pub mobile: u8,
    pub social: u8,
}

// =============================================================================
// Profiles
// =============================================================================

/// A customer profile as it appears in the source table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProfile {
    pub id: String,
    pub age: u32,
    #[serde(deserialize_with = "deserialize_member_date")]
    pub became_member_on: NaiveDate,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub income: Option<f64>,
}

/// Encoded gender. Serializes as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Unknown,
    Other,
    Female,
    Male,
}

impl Gender {
    /// Parse a single-letter gender code. `None` for unrecognized text.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "O" => Some(Self::Other),
            "F" => Some(Self::Female),
            "M" => Some(Self::Male),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Other => 1,
            Self::Female => 2,
            Self::Male => 3,
        }
    }
}

impl Serialize for Gender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// A normalized customer profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    /// 0-based position in the profile table.
    pub index: PersonRef,
    pub age: u32,
    pub became_member_on: NaiveDate,
    pub gender: Gender,
    pub income: f64,
}

/// Accepts `20170212`, `"20170212"` or `"2017-02-12"`.
fn deserialize_member_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw = Value::deserialize(deserializer)?;
    let text = match &raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => return Err(D::Error::custom(format!("invalid membership date: {}", other))),
    };

    NaiveDate::parse_from_str(&text, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(&text, "%Y-%m-%d"))
        .map_err(|e| D::Error::custom(format!("invalid membership date '{}': {}", text, e)))
}

// =============================================================================
// Events
// =============================================================================

/// Kind of an event log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "offer received")]
    OfferReceived,
    #[serde(rename = "offer viewed")]
    OfferViewed,
    #[serde(rename = "offer completed")]
    OfferCompleted,
    #[serde(rename = "transaction")]
    Transaction,
    /// A transaction matched to same-time offer completions.
    #[serde(rename = "transaction linked")]
    TransactionLinked,
}

impl EventKind {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "offer received" => Some(Self::OfferReceived),
            "offer viewed" => Some(Self::OfferViewed),
            "offer completed" => Some(Self::OfferCompleted),
            "transaction" => Some(Self::Transaction),
            "transaction linked" => Some(Self::TransactionLinked),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OfferReceived => "offer received",
            Self::OfferViewed => "offer viewed",
            Self::OfferCompleted => "offer completed",
            Self::Transaction => "transaction",
            Self::TransactionLinked => "transaction linked",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event log row as it appears in the source log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub person: String,
    pub event: String,
    pub time: u32,
    /// Semi-structured payload (`offer id`/`offer_id`, `amount`, `reward`).
    #[serde(default)]
    pub value: Map<String, Value>,
}

/// A preprocessed event log row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    #[serde(rename = "pers-offer-time")]
    pub person_offer_time: String,
    #[serde(rename = "event")]
    pub kind: EventKind,
    pub time: u32,
    pub person: PersonRef,
    #[serde(rename = "offer id")]
    pub offer: OfferRef,
    pub amount: f64,
    pub reward: f64,
    #[serde(rename = "pers-offer")]
    pub person_offer: String,
}

/// `"{person}-{offer}"` grouping key.
pub fn person_offer_key(person: PersonRef, offer: OfferRef) -> String {
    format!("{}-{}", person, offer)
}

/// `"{person}-{offer}-{time}"` row key.
pub fn person_offer_time_key(person: PersonRef, offer: OfferRef, time: u32) -> String {
    format!("{}-{}-{}", person, offer, time)
}

// =============================================================================
// Aggregates
// =============================================================================

/// One row per person/offer pair, or per unlinked transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRecord {
    #[serde(rename = "pers-offer-time")]
    pub person_offer_time: String,
    pub received: u32,
    pub viewed: u32,
    pub completed: u32,
    #[serde(rename = "completed before viewed")]
    pub completed_before_viewed: u32,
    pub amount: f64,
    pub reward: f64,
    pub person: PersonRef,
    pub offer: OfferRef,
    #[serde(rename = "pers-offer")]
    pub person_offer: String,
}

// =============================================================================
// Merged Output
// =============================================================================

/// Catalog attributes attached to an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferAttributes {
    pub difficulty: u32,
    pub duration: u32,
    /// `None` for unlinked transactions (serialized as `0`).
    #[serde(serialize_with = "serialize_offer_type_or_zero")]
    pub offer_type: Option<OfferTypeCode>,
    pub offer_reward: u32,
    pub web: u8,
    pub email: u8,
    pub mobile: u8,
    pub social: u8,
}

impl OfferAttributes {
    /// All-zero attributes used for the "no offer" reference.
    pub fn unlinked() -> Self {
        Self {
            difficulty: 0,
            duration: 0,
            offer_type: None,
            offer_reward: 0,
            web: 0,
            email: 0,
            mobile: 0,
            social: 0,
        }
    }
}

impl From<&Offer> for OfferAttributes {
    fn from(offer: &Offer) -> Self {
        Self {
            difficulty: offer.difficulty,
            duration: offer.duration,
            offer_type: Some(offer.offer_type),
            offer_reward: offer.reward,
            web: offer.web,
            email: offer.email,
            mobile: offer.mobile,
            social: offer.social,
        }
    }
}

fn serialize_offer_type_or_zero<S: Serializer>(
    value: &Option<OfferTypeCode>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(code) => code.serialize(serializer),
        None => serializer.serialize_u8(0),
    }
}

/// Profile attributes attached to an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileAttributes {
    pub age: u32,
    #[serde(rename = "became member on")]
    pub became_member_on: NaiveDate,
    pub gender: Gender,
    pub income: f64,
}

impl From<&Profile> for ProfileAttributes {
    fn from(profile: &Profile) -> Self {
        Self {
            age: profile.age,
            became_member_on: profile.became_member_on,
            gender: profile.gender,
            income: profile.income,
        }
    }
}

/// Final denormalized row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    #[serde(flatten)]
    pub aggregate: AggregateRecord,
    #[serde(flatten)]
    pub offer: OfferAttributes,
    /// Filled by the profile merge.
    #[serde(flatten)]
    pub profile: Option<ProfileAttributes>,
}
