//! Collapse the linked event log into one row per person/offer pair.
//!
//! # Architecture
//!
//! ```text
//! Linked events (log order)               →  Aggregates (creation order)
//! ┌──────────────────────────────────┐       ┌────────────────────────────────┐
//! │ 0-4 offer received               │       │ 0-4  recv 1 view 1 compl 1     │
//! │ 0-0 transaction          (12.0)  │  →    ├────────────────────────────────┤
//! │ 0-4 offer viewed                 │       │ 0-0-1 transaction (1/1/1, 12.0)│
//! │ 0-4 offer completed              │       └────────────────────────────────┘
//! └──────────────────────────────────┘
//! ```
//!
//! Unlinked transactions get one row each, with every counter set to 1 so they
//! can be read like completed offers downstream.

use std::collections::HashMap;

use crate::models::{AggregateRecord, Event, EventKind};

/// Builder for accumulating counters in log order.
struct Aggregator {
    records: Vec<AggregateRecord>,
    index: HashMap<String, usize>,
}

impl Aggregator {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn push(&mut self, key: String, record: AggregateRecord) {
        self.index.insert(key, self.records.len());
        self.records.push(record);
    }

    fn add_transaction(&mut self, row: usize, event: &Event) {
        // Row index keeps keys unique across transactions of the same person
        let key = format!("{}-{}", event.person_offer, row);
        let record = AggregateRecord {
            person_offer_time: event.person_offer_time.clone(),
            received: 1,
            viewed: 1,
            completed: 1,
            completed_before_viewed: 0,
            amount: event.amount,
            reward: event.reward,
            person: event.person,
            offer: event.offer,
            person_offer: key.clone(),
        };
        self.push(key, record);
    }

    fn add_offer_event(&mut self, event: &Event) {
        let Some(&position) = self.index.get(&event.person_offer) else {
            let record = AggregateRecord {
                person_offer_time: event.person_offer_time.clone(),
                received: 1,
                viewed: 0,
                completed: 0,
                completed_before_viewed: 0,
                amount: event.amount,
                reward: event.reward,
                person: event.person,
                offer: event.offer,
                person_offer: event.person_offer.clone(),
            };
            self.push(event.person_offer.clone(), record);
            return;
        };

        let record = &mut self.records[position];
        match event.kind {
            EventKind::OfferReceived => record.received += 1,
            EventKind::OfferViewed => record.viewed += 1,
            EventKind::OfferCompleted => {
                record.completed += 1;
                record.reward += event.reward;
                record.amount += event.amount;
                if record.completed > record.viewed {
                    record.completed_before_viewed += 1;
                }
            }
            EventKind::Transaction | EventKind::TransactionLinked => {}
        }
    }

    fn build(self) -> Vec<AggregateRecord> {
        self.records
    }
}

/// Aggregate a linked event log.
///
/// Output has one row per distinct person-offer key, in order of first
/// appearance, plus one row per unlinked transaction at its log position.
pub fn aggregate_events(events: &[Event]) -> Vec<AggregateRecord> {
    let mut aggregator = Aggregator::new();

    for (row, event) in events.iter().enumerate() {
        match event.kind {
            EventKind::Transaction => aggregator.add_transaction(row, event),
            _ => aggregator.add_offer_event(event),
        }
    }

    aggregator.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{person_offer_key, person_offer_time_key, OfferRef, PersonRef};

    fn event(kind: EventKind, time: u32, person: usize, offer: u32) -> Event {
        let (person, offer) = (PersonRef(person), OfferRef(offer));
        Event {
            person_offer_time: person_offer_time_key(person, offer, time),
            kind,
            time,
            person,
            offer,
            amount: 0.0,
            reward: 0.0,
            person_offer: person_offer_key(person, offer),
        }
    }

    fn completed(time: u32, person: usize, offer: u32, amount: f64, reward: f64) -> Event {
        Event {
            amount,
            reward,
            ..event(EventKind::OfferCompleted, time, person, offer)
        }
    }

    fn transaction(time: u32, person: usize, amount: f64) -> Event {
        Event {
            amount,
            ..event(EventKind::Transaction, time, person, 0)
        }
    }

    #[test]
    fn test_counters_and_sums() {
        let log = vec![
            event(EventKind::OfferReceived, 0, 3, 2),
            event(EventKind::OfferViewed, 6, 3, 2),
            completed(12, 3, 2, 4.0, 2.0),
            event(EventKind::OfferReceived, 168, 3, 2),
            event(EventKind::OfferViewed, 170, 3, 2),
            completed(180, 3, 2, 6.5, 2.0),
        ];

        let records = aggregate_events(&log);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!((r.received, r.viewed, r.completed), (2, 2, 2));
        assert_eq!(r.completed_before_viewed, 0);
        assert_eq!(r.amount, 10.5);
        assert_eq!(r.reward, 4.0);
        assert_eq!(r.person_offer, "3-2");
        assert_eq!(r.person_offer_time, "3-2-0");
    }

    #[test]
    fn test_completed_before_viewed_order() {
        // Completed with no view yet
        let early = aggregate_events(&[
            event(EventKind::OfferReceived, 0, 1, 5),
            completed(10, 1, 5, 0.0, 3.0),
            event(EventKind::OfferViewed, 20, 1, 5),
        ]);
        assert_eq!(early[0].completed_before_viewed, 1);

        // Completed after one view
        let late = aggregate_events(&[
            event(EventKind::OfferReceived, 0, 1, 5),
            event(EventKind::OfferViewed, 5, 1, 5),
            completed(10, 1, 5, 0.0, 3.0),
        ]);
        assert_eq!(late[0].completed_before_viewed, 0);

        // Two completions outpacing a single view
        let outpaced = aggregate_events(&[
            event(EventKind::OfferReceived, 0, 1, 5),
            event(EventKind::OfferViewed, 5, 1, 5),
            completed(10, 1, 5, 0.0, 3.0),
            completed(20, 1, 5, 0.0, 3.0),
        ]);
        assert_eq!(outpaced[0].completed_before_viewed, 1);
        assert_eq!(outpaced[0].reward, 6.0);
    }

    #[test]
    fn test_unlinked_transactions_get_own_rows() {
        let log = vec![
            transaction(10, 4, 12.0),
            transaction(10, 4, 3.0),
            event(EventKind::OfferReceived, 12, 4, 1),
        ];

        let records = aggregate_events(&log);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].person_offer, "4-0-0");
        assert_eq!(records[1].person_offer, "4-0-1");
        assert_eq!(records[0].amount, 12.0);
        assert_eq!(records[1].amount, 3.0);
        for r in &records[..2] {
            assert_eq!((r.received, r.viewed, r.completed), (1, 1, 1));
            assert_eq!(r.completed_before_viewed, 0);
            assert_eq!(r.offer, OfferRef::NONE);
            assert_eq!(r.person_offer_time, "4-0-10");
        }
        assert_eq!(records[2].person_offer, "4-1");
    }

    #[test]
    fn test_linked_transaction_does_not_count() {
        let mut linked = transaction(10, 2, 5.0);
        linked.kind = EventKind::TransactionLinked;
        linked.person_offer = "2-7".to_string();

        let log = vec![
            event(EventKind::OfferReceived, 0, 2, 7),
            linked,
            completed(10, 2, 7, 5.0, 3.0),
        ];

        let records = aggregate_events(&log);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].completed, 1);
        assert_eq!(records[0].amount, 5.0);
    }

    #[test]
    fn test_linked_transaction_opens_row() {
        // 6.0 split across two completions, no receipt seen for 2-7
        let mut linked = transaction(10, 2, 6.0);
        linked.kind = EventKind::TransactionLinked;
        linked.person_offer = "2-7".to_string();

        let log = vec![
            linked,
            completed(10, 2, 7, 3.0, 1.0),
            completed(10, 2, 8, 3.0, 1.0),
        ];

        let records = aggregate_events(&log);

        assert_eq!(records.len(), 2);
        let opened = &records[0];
        assert_eq!(opened.person_offer, "2-7");
        assert_eq!(opened.offer, OfferRef::NONE);
        assert_eq!(opened.person_offer_time, "2-0-10");
        assert_eq!((opened.received, opened.viewed, opened.completed), (1, 0, 1));
        assert_eq!(opened.completed_before_viewed, 1);
        // Transaction amount plus the completion's share
        assert_eq!(opened.amount, 9.0);
        assert_eq!(opened.reward, 1.0);

        let other = &records[1];
        assert_eq!(other.person_offer, "2-8");
        assert_eq!(other.completed, 0);
        assert_eq!(other.amount, 3.0);
    }

    #[test]
    fn test_first_event_creates_row_as_received() {
        // A completion seen before any receipt still opens the row with received = 1
        let records = aggregate_events(&[completed(3, 9, 6, 1.5, 2.0)]);

        let r = &records[0];
        assert_eq!((r.received, r.viewed, r.completed), (1, 0, 0));
        assert_eq!(r.amount, 1.5);
        assert_eq!(r.reward, 2.0);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let log = vec![
            event(EventKind::OfferReceived, 0, 5, 9),
            event(EventKind::OfferReceived, 0, 1, 2),
            event(EventKind::OfferReceived, 0, 3, 4),
            event(EventKind::OfferViewed, 1, 5, 9),
        ];

        let keys: Vec<_> = aggregate_events(&log)
            .into_iter()
            .map(|r| r.person_offer)
            .collect();
        assert_eq!(keys, vec!["5-9", "1-2", "3-4"]);
    }

    #[test]
    fn test_column_names() {
        let records = aggregate_events(&[transaction(1, 0, 2.0)]);
        let json = serde_json::to_value(&records[0]).unwrap();
        let obj = json.as_object().unwrap();

        for column in [
            "pers-offer-time",
            "received",
            "viewed",
            "completed",
            "completed before viewed",
            "amount",
            "reward",
            "person",
            "offer",
            "pers-offer",
        ] {
            assert!(obj.contains_key(column), "missing column {}", column);
        }
    }
}
