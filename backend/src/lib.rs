//! Intersection Auction Core - Rust Engine
//!
//! Allocates right-of-way at an unsignalized intersection through a
//! repeating, time-boxed auction among vehicles and vehicle platoons.
//!
//! # Architecture
//!
//! - **core**: simulation time
//! - **models**: domain types (vehicles, agents, bids, auctions, messages,
//!   event log)
//! - **participants**: per-cycle eligibility scan (platoons + lane leaders)
//! - **policy**: bid scoring (baseline and trainable)
//! - **evaluator**: winner ranking and protected-transit bookkeeping
//! - **conflict**: narrow interface to the external conflict resolver
//! - **orchestrator**: the engine cycle and state snapshots
//!
//! # Critical Invariants
//!
//! 1. At most one auction is live at a time (structural: `Option<Auction>`)
//! 2. Bid values are non-negative; winner ranks are dense 1..N
//! 3. No wall-clock reads and no randomness: identical inputs produce
//!    identical priority orders

// Module declarations
pub mod conflict;
pub mod core;
pub mod evaluator;
pub mod models;
pub mod orchestrator;
pub mod participants;
pub mod policy;

// Re-exports for convenience
pub use conflict::{AlwaysGoResolver, ConflictAction, ConflictResolver};
pub use crate::core::time::SimClock;
pub use evaluator::AuctionEvaluator;
pub use models::{
    agent::{Agent, AgentKind},
    auction::{Auction, AuctionError, AuctionStatus, Winner},
    bid::Bid,
    event::{EngineEvent, EventLog},
    message::{MessageQueue, V2vMessage, V2vPayload, WinnerSummary},
    vehicle::{
        IntersectionGeometry, Location, PlatoonState, TurnDirection, VehicleState, Velocity,
    },
};
pub use orchestrator::{
    AuctionEngine, AuctionStats, EngineConfig, EngineError, EngineSnapshot, PolicyKind,
};
pub use participants::{
    HeadingResolver, IdentifierConfig, ParticipantIdentifier, RouteDirectionResolver,
};
pub use policy::{BaselineBidPolicy, BidError, BidPolicy, BidWeights, TrainableBidPolicy};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn intersection_auction_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::engine::PyAuctionEngine>()?;
    Ok(())
}
