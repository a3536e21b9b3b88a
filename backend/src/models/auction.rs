//! Auction round model and its state machine.
//!
//! A single auction is a bounded-duration round: participants are fixed at
//! creation, bids are collected until the deadline, evaluation then ranks
//! the bids exactly once. Status transitions are driven by the engine once
//! per cycle; invalid transitions are rejected as errors, never panics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conflict::ConflictAction;
use crate::models::agent::Agent;
use crate::models::bid::Bid;

/// Lifecycle state of one auction round.
///
/// The engine-level "no auction active" state is represented structurally:
/// the orchestrator holds `Option<Auction>`, and `None` means waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionStatus {
    /// Bids are being collected, bounded by the deadline
    Bidding,
    /// Deadline passed; no more bids accepted
    Evaluating,
    /// Winners computed and published
    Completed,
}

impl std::fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuctionStatus::Bidding => "bidding",
            AuctionStatus::Evaluating => "evaluating",
            AuctionStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// Errors from invalid auction operations.
///
/// These signal rejected no-ops to the caller; none of them is fatal to the
/// engine cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuctionError {
    #[error("auction {auction_id} is {status}, bids are no longer accepted")]
    BidWindowClosed {
        auction_id: String,
        status: AuctionStatus,
    },

    #[error("agent {participant_id} is not a participant of auction {auction_id}")]
    UnknownParticipant {
        auction_id: String,
        participant_id: String,
    },

    #[error("auction {auction_id} cannot move from {status} to evaluating")]
    NotBidding {
        auction_id: String,
        status: AuctionStatus,
    },

    #[error("auction {auction_id} is {status}, expected evaluating")]
    NotEvaluating {
        auction_id: String,
        status: AuctionStatus,
    },
}

/// A ranked auction result entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    agent: Agent,
    bid: Bid,
    rank: usize,
    action: ConflictAction,
}

impl Winner {
    pub(crate) fn new(agent: Agent, bid: Bid, rank: usize) -> Self {
        Self {
            agent,
            bid,
            rank,
            action: ConflictAction::Go,
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn bid(&self) -> &Bid {
        &self.bid
    }

    /// Priority rank; 1 is highest, ranks are dense with no gaps.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Verdict applied by the external conflict resolver.
    pub fn action(&self) -> ConflictAction {
        self.action
    }

    pub(crate) fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }

    pub(crate) fn set_action(&mut self, action: ConflictAction) {
        self.action = action;
    }
}

/// A single bounded-duration auction round.
///
/// # Example
/// ```
/// use intersection_auction_core_rs::{
///     Agent, Auction, AuctionStatus, Location, TurnDirection, VehicleState, Velocity,
/// };
///
/// let vehicle = VehicleState {
///     id: "veh_1".to_string(),
///     location: Location::new(10.0, 0.0, 0.0),
///     velocity: Velocity::new(-4.0, 0.0, 0.0),
///     lane: "east_in".to_string(),
///     destination: Some(Location::new(-50.0, 0.0, 0.0)),
///     is_junction: false,
/// };
/// let agent = Agent::from_vehicle(vehicle, TurnDirection::Right);
///
/// let mut auction = Auction::new(vec![agent], 4.0, 1.0);
/// assert_eq!(auction.status(), AuctionStatus::Bidding);
/// assert!(!auction.is_expired(4.5));
/// assert!(auction.is_expired(5.0));
///
/// auction.submit_bid("veh_1", 42.0, 4.0).unwrap();
/// assert!(auction.has_bid("veh_1"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    id: String,
    participants: Vec<Agent>,
    start_time: f64,
    deadline: f64,
    status: AuctionStatus,
    bids: HashMap<String, Bid>,
    winners: Vec<Winner>,
    next_bid_sequence: u64,
}

impl Auction {
    /// Open a new round. The participant set is fixed from here on.
    ///
    /// The auction id is derived from the start time; with one auction live
    /// at a time and a fixed start cadence this is unique per engine run.
    pub fn new(participants: Vec<Agent>, start_time: f64, bidding_window: f64) -> Self {
        let id = format!("auction_{:010}", (start_time * 1000.0).round() as u64);
        Self {
            id,
            participants,
            start_time,
            deadline: start_time + bidding_window,
            status: AuctionStatus::Bidding,
            bids: HashMap::new(),
            winners: Vec::new(),
            next_bid_sequence: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> AuctionStatus {
        self.status
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn deadline(&self) -> f64 {
        self.deadline
    }

    pub fn participants(&self) -> &[Agent] {
        &self.participants
    }

    pub fn bids(&self) -> &HashMap<String, Bid> {
        &self.bids
    }

    /// Ranked results; empty until the auction completes.
    pub fn winners(&self) -> &[Winner] {
        &self.winners
    }

    pub(crate) fn winners_mut(&mut self) -> &mut Vec<Winner> {
        &mut self.winners
    }

    pub fn has_bid(&self, participant_id: &str) -> bool {
        self.bids.contains_key(participant_id)
    }

    /// Whether the bidding deadline has passed.
    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.deadline
    }

    /// Accept a bid while the round is in `Bidding`.
    ///
    /// A second bid for the same participant overwrites the first. Bids
    /// after the deadline transition are rejected with
    /// [`AuctionError::BidWindowClosed`]; the round itself is unaffected.
    pub fn submit_bid(
        &mut self,
        participant_id: &str,
        value: f64,
        timestamp: f64,
    ) -> Result<(), AuctionError> {
        if self.status != AuctionStatus::Bidding {
            return Err(AuctionError::BidWindowClosed {
                auction_id: self.id.clone(),
                status: self.status,
            });
        }

        let agent = self
            .participants
            .iter()
            .find(|a| a.id() == participant_id)
            .cloned()
            .ok_or_else(|| AuctionError::UnknownParticipant {
                auction_id: self.id.clone(),
                participant_id: participant_id.to_string(),
            })?;

        let sequence = self.next_bid_sequence;
        self.next_bid_sequence += 1;

        let bid = Bid::new(
            participant_id.to_string(),
            value.max(0.0),
            timestamp,
            sequence,
            agent,
        );
        self.bids.insert(participant_id.to_string(), bid);
        Ok(())
    }

    /// Close the bid window: `Bidding` → `Evaluating`.
    pub fn begin_evaluation(&mut self) -> Result<(), AuctionError> {
        if self.status != AuctionStatus::Bidding {
            return Err(AuctionError::NotBidding {
                auction_id: self.id.clone(),
                status: self.status,
            });
        }
        self.status = AuctionStatus::Evaluating;
        Ok(())
    }

    /// Publish results: `Evaluating` → `Completed`.
    ///
    /// The winner list is populated exactly once, here.
    pub fn complete(&mut self, winners: Vec<Winner>) -> Result<(), AuctionError> {
        if self.status != AuctionStatus::Evaluating {
            return Err(AuctionError::NotEvaluating {
                auction_id: self.id.clone(),
                status: self.status,
            });
        }
        self.winners = winners;
        self.status = AuctionStatus::Completed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::{Location, TurnDirection, VehicleState, Velocity};

    fn agent(id: &str) -> Agent {
        Agent::from_vehicle(
            VehicleState {
                id: id.to_string(),
                location: Location::new(10.0, 0.0, 0.0),
                velocity: Velocity::new(-4.0, 0.0, 0.0),
                lane: "east_in".to_string(),
                destination: Some(Location::new(-50.0, 0.0, 0.0)),
                is_junction: false,
            },
            TurnDirection::Straight,
        )
    }

    #[test]
    fn test_id_derived_from_start_time() {
        let auction = Auction::new(vec![agent("a")], 12.3, 1.0);
        assert_eq!(auction.id(), "auction_0000012300");
    }

    #[test]
    fn test_rebid_overwrites() {
        let mut auction = Auction::new(vec![agent("a")], 0.0, 1.0);
        auction.submit_bid("a", 10.0, 0.0).unwrap();
        auction.submit_bid("a", 25.0, 0.2).unwrap();
        assert_eq!(auction.bids().len(), 1);
        assert_eq!(auction.bids()["a"].value(), 25.0);
    }

    #[test]
    fn test_bid_after_deadline_rejected() {
        let mut auction = Auction::new(vec![agent("a")], 0.0, 1.0);
        auction.begin_evaluation().unwrap();
        let err = auction.submit_bid("a", 10.0, 1.0).unwrap_err();
        assert!(matches!(err, AuctionError::BidWindowClosed { .. }));
        assert!(auction.bids().is_empty());
    }

    #[test]
    fn test_unknown_participant_rejected() {
        let mut auction = Auction::new(vec![agent("a")], 0.0, 1.0);
        let err = auction.submit_bid("stranger", 10.0, 0.0).unwrap_err();
        assert!(matches!(err, AuctionError::UnknownParticipant { .. }));
    }

    #[test]
    fn test_complete_requires_evaluating() {
        let mut auction = Auction::new(vec![agent("a")], 0.0, 1.0);
        assert!(auction.complete(vec![]).is_err());
        auction.begin_evaluation().unwrap();
        auction.complete(vec![]).unwrap();
        assert_eq!(auction.status(), AuctionStatus::Completed);
        // Results are published exactly once.
        assert!(auction.complete(vec![]).is_err());
    }

    #[test]
    fn test_negative_bid_floored() {
        let mut auction = Auction::new(vec![agent("a")], 0.0, 1.0);
        auction.submit_bid("a", -3.0, 0.0).unwrap();
        assert_eq!(auction.bids()["a"].value(), 0.0);
    }
}
