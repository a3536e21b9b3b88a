//! Bid policy interface.
//!
//! A bid policy maps one agent's snapshot plus the intersection geometry to
//! a non-negative scalar priority score. Policies must be deterministic and
//! pure given their current parameters: two calls with the same agent and
//! the same parameters return the same value. Parameters themselves may be
//! tuned externally between episodes (see [`TrainableBidPolicy`]).
//!
//! A policy failure never aborts an auction round: the orchestrator catches
//! the error per agent and substitutes the configured fallback bid.
//!
//! [`TrainableBidPolicy`]: crate::policy::TrainableBidPolicy

use thiserror::Error;

use crate::models::agent::Agent;
use crate::models::vehicle::IntersectionGeometry;

pub mod baseline;
pub mod trainable;

pub use baseline::{BaselineBidPolicy, BidWeights};
pub use trainable::{TrainableBidPolicy, TrainableParams};

/// Errors from bid computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BidError {
    /// A scoring factor produced a non-finite value
    #[error("non-finite bid component for agent {agent_id}")]
    NonFinite { agent_id: String },
}

/// Scoring policy for auction bids.
///
/// # Example implementation
///
/// ```
/// use intersection_auction_core_rs::policy::{BidError, BidPolicy};
/// use intersection_auction_core_rs::{Agent, IntersectionGeometry};
///
/// struct FlatPolicy;
///
/// impl BidPolicy for FlatPolicy {
///     fn compute_bid(
///         &self,
///         _agent: &Agent,
///         _geometry: &IntersectionGeometry,
///     ) -> Result<f64, BidError> {
///         Ok(1.0)
///     }
///
///     fn name(&self) -> &'static str {
///         "flat"
///     }
///
///     fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
///         self
///     }
/// }
/// ```
pub trait BidPolicy: Send + Sync {
    /// Score one agent. Must return a finite value ≥ 0 on success.
    fn compute_bid(&self, agent: &Agent, geometry: &IntersectionGeometry)
        -> Result<f64, BidError>;

    /// Short policy name for statistics and diagnostics.
    fn name(&self) -> &'static str;

    /// Downcasting hook so tuning layers can reach concrete policy types
    /// (e.g. to update [`TrainableBidPolicy`] parameters between episodes).
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
