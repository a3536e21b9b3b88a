//! Bid model.

use serde::{Deserialize, Serialize};

use crate::models::agent::Agent;

/// One agent's priority score in one auction.
///
/// Exactly one bid per participant per auction: a later submission for the
/// same participant id overwrites the earlier one.
///
/// Bid timestamps carry first-come-first-served tie-breaking between equal
/// values. All bids collected within one engine cycle share a timestamp, so
/// the auction also stamps each accepted bid with a monotonically increasing
/// `sequence` as the deterministic tie-break of last resort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    participant_id: String,
    value: f64,
    timestamp: f64,
    sequence: u64,
    agent: Agent,
}

impl Bid {
    pub(crate) fn new(
        participant_id: String,
        value: f64,
        timestamp: f64,
        sequence: u64,
        agent: Agent,
    ) -> Self {
        debug_assert!(value >= 0.0, "bid values are non-negative");
        Self {
            participant_id,
            value,
            timestamp,
            sequence,
            agent,
        }
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Simulation time at which the bid was accepted.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Submission order within the auction (ties on timestamp).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The agent snapshot the bid was computed from.
    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}
