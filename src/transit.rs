//! In-flight control message registry.
//!
//! Models the flight time of messages that have been sent but not yet
//! delivered, so the round scheduler can delay or drop them. Independent of
//! fabric topology: the registry only knows payloads and counters.
//!
//! # Outcome policy
//!
//! Per message and per round the registry takes **one** PRNG draw and
//! compares it against the delay threshold first, then the drop threshold.
//! The two thresholds are independent configuration values, not
//! complementary probabilities: with `drop_rate <= delay_rate` the drop
//! branch is unreachable. This sequenced evaluation is deliberate, kept
//! explicit here and pinned by tests rather than silently "corrected".

use crate::tracing_compat::debug;
use crate::types::MessageId;
use crate::util::DetRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A message intercepted en route, together with its delay history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitMessage {
    id: MessageId,
    payload: Vec<u8>,
    delayed_rounds: u64,
}

impl TransitMessage {
    /// The registry-assigned identity.
    #[must_use]
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// The opaque payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// How many rounds this message has been delayed so far.
    #[must_use]
    pub fn delayed_rounds(&self) -> u64 {
        self.delayed_rounds
    }
}

/// Per-round transit evaluation result.
///
/// Delivered messages are removed from the registry and handed back to the
/// caller, which owns the delivery path.
#[derive(Debug, Default)]
pub struct TransitSummary {
    /// Messages whose flight ended this round, in id order.
    pub delivered: Vec<TransitMessage>,
    /// Number of messages delayed another round.
    pub delayed: u64,
    /// Number of messages dropped this round.
    pub dropped: u64,
}

/// Registry of in-flight and dropped messages.
#[derive(Debug, Default)]
pub struct TransitRegistry {
    next_id: MessageId,
    in_transit: BTreeMap<MessageId, TransitMessage>,
    dropped: BTreeSet<MessageId>,
}

impl TransitRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intercepts a message en route, placing it in transit.
    ///
    /// Returns the identity under which its fate can be tracked.
    pub fn intercept(&mut self, payload: impl Into<Vec<u8>>) -> MessageId {
        let id = self.next_id;
        self.next_id = self.next_id.next();
        self.in_transit.insert(
            id,
            TransitMessage {
                id,
                payload: payload.into(),
                delayed_rounds: 0,
            },
        );
        id
    }

    /// Number of messages currently in transit.
    #[must_use]
    pub fn in_transit_count(&self) -> usize {
        self.in_transit.len()
    }

    /// Number of messages dropped so far this run.
    #[must_use]
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    /// Whether the message is still in transit.
    #[must_use]
    pub fn is_in_transit(&self, id: MessageId) -> bool {
        self.in_transit.contains_key(&id)
    }

    /// Whether the message was dropped.
    #[must_use]
    pub fn was_dropped(&self, id: MessageId) -> bool {
        self.dropped.contains(&id)
    }

    /// Decides the fate of every in-flight message for this round.
    ///
    /// Messages are visited in ascending id order, one PRNG draw each:
    /// below `delay_rate` the message stays in transit with its counter
    /// incremented; otherwise below `drop_rate` it moves to the dropped
    /// set; otherwise it is delivered (removed and returned).
    pub fn check_in_transit(
        &mut self,
        delay_rate: f64,
        drop_rate: f64,
        rng: &mut DetRng,
    ) -> TransitSummary {
        let mut summary = TransitSummary::default();
        let ids: Vec<MessageId> = self.in_transit.keys().copied().collect();
        for id in ids {
            let draw = rng.next_f64();
            if draw < delay_rate {
                let message = self
                    .in_transit
                    .get_mut(&id)
                    .expect("message id collected above");
                message.delayed_rounds += 1;
                summary.delayed += 1;
            } else if draw < drop_rate {
                debug!(%id, "dropping in-flight message");
                self.in_transit.remove(&id);
                self.dropped.insert(id);
                summary.dropped += 1;
            } else {
                let message = self
                    .in_transit
                    .remove(&id)
                    .expect("message id collected above");
                summary.delivered.push(message);
            }
        }
        summary
    }
}
