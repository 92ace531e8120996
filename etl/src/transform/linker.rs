//! Link transactions to the offers they completed.
//!
//! A transaction is not tied to an offer in the raw log. It is linked when it
//! is immediately followed by one or more `offer completed` rows at the same
//! time; the run stops at the first row that is not.
//!
//! ```text
//! row | event            | time | amount       row | event              | time | amount
//! 0   | transaction      | 10   | 5.0      →   0   | transaction linked | 10   | 5.0
//! 1   | offer completed  | 10   | 0        →   1   | offer completed    | 10   | 2.5
//! 2   | offer completed  | 10   | 0        →   2   | offer completed    | 10   | 2.5
//! 3   | offer received   | 10   | 0        →   3   | offer received     | 10   | 0
//! ```

use crate::models::{Event, EventKind};

/// Linked event log and counters.
#[derive(Debug, Clone, Default)]
pub struct LinkResult {
    pub events: Vec<Event>,
    /// Transactions relabeled as `transaction linked`.
    pub linked: usize,
    /// Transactions left without an offer.
    pub unlinked: usize,
}

/// Number of `offer completed` rows directly after `start` sharing its time.
fn completion_run(events: &[Event], start: usize) -> usize {
    let time = events[start].time;
    events[start + 1..]
        .iter()
        .take_while(|e| e.kind == EventKind::OfferCompleted && e.time == time)
        .count()
}

/// Link transactions to the completions that follow them.
///
/// The input is left untouched; matched completions receive an equal share
/// of the transaction amount and the transaction takes the first match's
/// person-offer key.
pub fn link_transactions(events: &[Event]) -> LinkResult {
    let mut linked_events = events.to_vec();
    let mut linked = 0;
    let mut unlinked = 0;

    for (i, event) in events.iter().enumerate() {
        if event.kind != EventKind::Transaction {
            continue;
        }

        let matches = completion_run(events, i);
        if matches == 0 {
            unlinked += 1;
            continue;
        }

        let share = event.amount / matches as f64;
        for completion in &mut linked_events[i + 1..=i + matches] {
            completion.amount = share;
        }

        let transaction = &mut linked_events[i];
        transaction.kind = EventKind::TransactionLinked;
        transaction.person_offer = events[i + 1].person_offer.clone();
        linked += 1;
    }

    LinkResult {
        events: linked_events,
        linked,
        unlinked,
    }
}
