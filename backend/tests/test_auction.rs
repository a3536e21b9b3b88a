//! Tests for the auction state machine.

mod common;

use common::approaching_vehicle;
use intersection_auction_core_rs::{
    Agent, Auction, AuctionError, AuctionStatus, TurnDirection,
};

fn agents(ids: &[&str]) -> Vec<Agent> {
    ids.iter()
        .map(|id| {
            Agent::from_vehicle(
                approaching_vehicle(id, "east_in", 10.0, 5.0),
                TurnDirection::Straight,
            )
        })
        .collect()
}

#[test]
fn test_new_auction_is_bidding_with_fixed_participants() {
    let auction = Auction::new(agents(&["a", "b"]), 2.0, 1.0);
    assert_eq!(auction.status(), AuctionStatus::Bidding);
    assert_eq!(auction.participants().len(), 2);
    assert_eq!(auction.start_time(), 2.0);
    assert_eq!(auction.deadline(), 3.0);
    assert!(auction.winners().is_empty());
}

#[test]
fn test_one_bid_per_participant() {
    let mut auction = Auction::new(agents(&["a"]), 0.0, 1.0);
    auction.submit_bid("a", 10.0, 0.0).unwrap();
    auction.submit_bid("a", 40.0, 0.3).unwrap();
    auction.submit_bid("a", 15.0, 0.6).unwrap();

    assert_eq!(auction.bids().len(), 1);
    // The latest submission wins; nothing is duplicated.
    assert_eq!(auction.bids()["a"].value(), 15.0);
    assert_eq!(auction.bids()["a"].timestamp(), 0.6);
}

#[test]
fn test_bid_rejected_once_evaluating() {
    let mut auction = Auction::new(agents(&["a", "b"]), 0.0, 1.0);
    auction.submit_bid("a", 10.0, 0.0).unwrap();
    auction.begin_evaluation().unwrap();

    let err = auction.submit_bid("b", 20.0, 1.1).unwrap_err();
    assert!(matches!(err, AuctionError::BidWindowClosed { .. }));
    // The rejected submission is a pure no-op.
    assert_eq!(auction.bids().len(), 1);
    assert_eq!(auction.status(), AuctionStatus::Evaluating);
}

#[test]
fn test_non_participant_cannot_bid() {
    let mut auction = Auction::new(agents(&["a"]), 0.0, 1.0);
    let err = auction.submit_bid("intruder", 99.0, 0.1).unwrap_err();
    assert!(matches!(err, AuctionError::UnknownParticipant { .. }));
}

#[test]
fn test_lifecycle_transitions_are_one_way() {
    let mut auction = Auction::new(agents(&["a"]), 0.0, 1.0);

    // Cannot complete from bidding.
    assert!(auction.complete(vec![]).is_err());

    auction.begin_evaluation().unwrap();
    // Cannot re-enter evaluation.
    assert!(auction.begin_evaluation().is_err());

    auction.complete(vec![]).unwrap();
    assert_eq!(auction.status(), AuctionStatus::Completed);
    // Winners are published exactly once.
    assert!(auction.complete(vec![]).is_err());
    assert!(auction.begin_evaluation().is_err());
}

#[test]
fn test_deadline_is_start_plus_window() {
    let auction = Auction::new(agents(&["a"]), 7.5, 2.0);
    assert!(!auction.is_expired(9.4));
    assert!(auction.is_expired(9.5));
    assert!(auction.is_expired(12.0));
}

#[test]
fn test_distinct_start_times_give_distinct_ids() {
    let a = Auction::new(agents(&["a"]), 0.0, 1.0);
    let b = Auction::new(agents(&["a"]), 2.0, 1.0);
    assert_ne!(a.id(), b.id());
}
