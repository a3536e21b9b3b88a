//! Checkpoint - Save/Restore Engine State
//!
//! Serializes the complete auction lifecycle state for pause/resume and
//! replay verification. A snapshot restores into an engine with the same
//! configuration: a canonical SHA-256 hash of the config guards against
//! restoring under different thresholds or windows.
//!
//! The event log is diagnostic and not part of a snapshot. External
//! collaborators (conflict resolver, custom direction resolver) are not
//! serializable trait objects; the caller re-injects them after restore.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::time::SimClock;
use crate::models::auction::Auction;
use crate::models::message::V2vMessage;
use crate::orchestrator::engine::{AuctionEngine, EngineConfig, EngineError};

// ============================================================================
// Snapshot Structures
// ============================================================================

/// One protected-transit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectedEntry {
    pub agent_id: String,
    pub entered_at: f64,
}

/// Complete engine state snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Engine run id the snapshot was taken from
    pub engine_id: String,

    /// Cycles executed at snapshot time
    pub tick: u64,

    /// Simulation time at snapshot time
    pub time: f64,

    /// Time the last auction started, if any
    pub last_auction_start: Option<f64>,

    /// The live auction, if one existed
    pub current_auction: Option<Auction>,

    /// Archived completed auctions, oldest first
    pub archived: Vec<Auction>,

    /// Protected-transit entries
    pub protected: Vec<ProtectedEntry>,

    /// Live broadcast messages
    pub messages: Vec<V2vMessage>,

    /// Auctions completed since engine start
    pub completed_count: usize,

    /// Rejected-bid counter
    pub rejected_bids: u64,

    /// Defaulted-bid counter
    pub defaulted_bids: u64,

    /// SHA-256 hash of the engine config (for validation on restore)
    pub config_hash: String,
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute a deterministic SHA-256 hash of a serializable config.
///
/// Serializes to canonical JSON with recursively sorted object keys so the
/// hash does not depend on map iteration order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, EngineError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config)
        .map_err(|e| EngineError::Serialization(format!("config serialization failed: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| EngineError::Serialization(format!("config serialization failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation
// ============================================================================

/// Validate snapshot integrity before restoring.
///
/// Checks that every winner list carries dense 1..N ranks, that protection
/// entries and message timestamps do not lie in the snapshot's future, and
/// that at most one auction is live.
pub fn validate_snapshot(snapshot: &EngineSnapshot) -> Result<(), EngineError> {
    let mut winner_lists: Vec<&Auction> = snapshot.archived.iter().collect();
    if let Some(current) = &snapshot.current_auction {
        winner_lists.push(current);
    }

    for auction in winner_lists {
        for (i, winner) in auction.winners().iter().enumerate() {
            if winner.rank() != i + 1 {
                return Err(EngineError::SnapshotMismatch(format!(
                    "auction {} has non-dense ranks: position {} holds rank {}",
                    auction.id(),
                    i,
                    winner.rank()
                )));
            }
        }
    }

    for entry in &snapshot.protected {
        if entry.entered_at > snapshot.time {
            return Err(EngineError::SnapshotMismatch(format!(
                "protected entry {} enters at {} after snapshot time {}",
                entry.agent_id, entry.entered_at, snapshot.time
            )));
        }
    }

    for message in &snapshot.messages {
        if message.timestamp > snapshot.time {
            return Err(EngineError::SnapshotMismatch(format!(
                "message for {} stamped at {} after snapshot time {}",
                message.auction_id, message.timestamp, snapshot.time
            )));
        }
    }

    Ok(())
}

// ============================================================================
// Engine integration
// ============================================================================

impl AuctionEngine {
    /// Capture the engine's full lifecycle state.
    pub fn snapshot(&self) -> Result<EngineSnapshot, EngineError> {
        let (clock, current, archived, last_start, messages, completed, rejected, defaulted) =
            self.snapshot_parts();

        Ok(EngineSnapshot {
            engine_id: self.engine_id().to_string(),
            tick: clock.current_tick(),
            time: clock.now(),
            last_auction_start: last_start,
            current_auction: current.cloned(),
            archived: archived.iter().cloned().collect(),
            protected: self
                .evaluator()
                .protected_entries()
                .map(|(id, entered_at)| ProtectedEntry {
                    agent_id: id.to_string(),
                    entered_at,
                })
                .collect(),
            messages: messages.iter().cloned().collect(),
            completed_count: completed,
            rejected_bids: rejected,
            defaulted_bids: defaulted,
            config_hash: compute_config_hash(self.config())?,
        })
    }

    /// Rebuild an engine from a snapshot taken under the same config.
    ///
    /// The conflict resolver and any custom direction resolver are reset to
    /// their defaults; re-inject them after restoring.
    pub fn restore(config: EngineConfig, snapshot: EngineSnapshot) -> Result<Self, EngineError> {
        let expected = compute_config_hash(&config)?;
        if expected != snapshot.config_hash {
            return Err(EngineError::SnapshotMismatch(format!(
                "config hash {} does not match snapshot hash {}",
                expected, snapshot.config_hash
            )));
        }
        validate_snapshot(&snapshot)?;

        let mut engine = AuctionEngine::new(config)?;

        let clock = SimClock::at_tick(snapshot.tick, engine.config().tick_duration);

        let mut messages =
            crate::models::message::MessageQueue::new(engine.config().message_validity_window);
        for message in snapshot.messages {
            messages.broadcast(message);
        }

        engine.restore_parts(
            snapshot.engine_id,
            clock,
            snapshot.current_auction,
            snapshot.archived.into_iter().collect::<VecDeque<_>>(),
            snapshot.last_auction_start,
            messages,
            snapshot
                .protected
                .into_iter()
                .map(|e| (e.agent_id, e.entered_at))
                .collect(),
            snapshot.completed_count,
            snapshot.rejected_bids,
            snapshot.defaulted_bids,
        );

        Ok(engine)
    }
}
