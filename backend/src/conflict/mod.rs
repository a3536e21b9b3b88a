//! Narrow interface to the external conflict/deadlock resolver.
//!
//! The resolver inspects the top-ranked winners of the current priority
//! order and may demote any of them to `Wait` to avoid simultaneous unsafe
//! crossings. The engine consumes its verdict through this trait; an absent
//! mapping entry means `Go`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::agent::Agent;

/// Per-agent verdict from conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictAction {
    /// Proceed in ranked order
    #[default]
    Go,
    /// Yield; moved to the tail of the priority order
    Wait,
}

impl std::fmt::Display for ConflictAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictAction::Go => write!(f, "go"),
            ConflictAction::Wait => write!(f, "wait"),
        }
    }
}

/// External collaborator deciding go/wait for the top-ranked winners.
///
/// Implementations may keep state across cycles (the real resolver tracks
/// deadlocks over time), hence `&mut self`.
pub trait ConflictResolver: Send + Sync {
    /// Map agent id → verdict for the given top-ranked agents.
    ///
    /// Agents absent from the returned map are treated as `Go`.
    fn resolve(&mut self, top_winners: &[Agent]) -> HashMap<String, ConflictAction>;
}

/// Default resolver: never overrides the auction order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGoResolver;

impl ConflictResolver for AlwaysGoResolver {
    fn resolve(&mut self, _top_winners: &[Agent]) -> HashMap<String, ConflictAction> {
        HashMap::new()
    }
}
