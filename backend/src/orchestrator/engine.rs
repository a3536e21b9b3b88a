//! Auction Engine
//!
//! Orchestrates the repeating, time-boxed auction over right-of-way:
//!
//! ```text
//! For each cycle:
//! 1. Identify eligible participants (platoons, then lane leaders)
//! 2. Release protected-transit entries no longer warranted
//! 3. Archive the auction completed last cycle
//! 4. Start a new auction when the cadence allows and agents exist
//! 5. Collect one bid per participant while bidding is open
//! 6. Evaluate at the deadline and broadcast results
//! 7. Apply the external conflict resolver to the top-ranked winners
//! 8. Expire stale broadcast messages
//! 9. Advance time
//! ```
//!
//! The engine is single-threaded and cooperative: the caller drives it with
//! one `update` per control cycle, and nothing blocks between calls. At
//! most one auction is live at a time — the engine holds `Option<Auction>`,
//! so the invariant is structural. No step reads wall-clock time or draws
//! randomness; identical input sequences produce identical priority orders.
//!
//! # Example
//!
//! ```
//! use intersection_auction_core_rs::{AuctionEngine, EngineConfig};
//!
//! let mut engine = AuctionEngine::new(EngineConfig::default()).unwrap();
//!
//! // No agents reported: no auction starts, the order stays empty.
//! let order = engine.update(&[], &[]);
//! assert!(order.is_empty());
//! assert_eq!(engine.auction_stats().active_auctions, 0);
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conflict::{AlwaysGoResolver, ConflictAction, ConflictResolver};
use crate::core::time::SimClock;
use crate::evaluator::AuctionEvaluator;
use crate::models::agent::Agent;
use crate::models::auction::{Auction, AuctionStatus, Winner};
use crate::models::event::{EngineEvent, EventLog};
use crate::models::message::{MessageQueue, V2vMessage, V2vPayload, WinnerSummary};
use crate::models::vehicle::{IntersectionGeometry, PlatoonState, VehicleState};
use crate::participants::{IdentifierConfig, ParticipantIdentifier};
use crate::policy::{BaselineBidPolicy, BidPolicy, TrainableBidPolicy};

/// Completed auctions kept in the archive for priority-order fallback and
/// snapshots. Older rounds are discarded.
const MAX_ARCHIVED: usize = 32;

/// Winners included in a results broadcast.
const RESULTS_BROADCAST_TOP: usize = 5;

// ============================================================================
// Configuration Types
// ============================================================================

/// Bid policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyKind {
    /// Fixed-weight scoring (baseline)
    #[default]
    Baseline,
    /// Externally tunable scoring
    Trainable,
}

impl PolicyKind {
    fn build(self) -> Box<dyn BidPolicy> {
        match self {
            PolicyKind::Baseline => Box::new(BaselineBidPolicy::new()),
            PolicyKind::Trainable => Box::new(TrainableBidPolicy::new()),
        }
    }
}

/// Complete engine configuration.
///
/// All durations and windows are in simulation time units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Junction footprint (center and radius)
    pub geometry: IntersectionGeometry,

    /// Participant eligibility thresholds
    pub identifier: IdentifierConfig,

    /// Which bid policy scores participants
    pub policy: PolicyKind,

    /// Minimum time between auction starts
    pub auction_interval: f64,

    /// Bid collection window of one auction
    pub bidding_window: f64,

    /// Lifetime of a broadcast message
    pub message_validity_window: f64,

    /// Number of top-ranked winners submitted to conflict resolution
    pub conflict_top_k: usize,

    /// Duration of one engine cycle
    pub tick_duration: f64,

    /// Hard timeout for protected-transit entries
    pub transit_timeout: f64,

    /// Bid substituted when per-agent bid computation fails
    pub fallback_bid: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            geometry: IntersectionGeometry::default(),
            identifier: IdentifierConfig::default(),
            policy: PolicyKind::Baseline,
            auction_interval: 2.0,
            bidding_window: 1.0,
            message_validity_window: 0.5,
            conflict_top_k: 3,
            tick_duration: 0.1,
            transit_timeout: 30.0,
            fallback_bid: 20.0,
        }
    }
}

impl EngineConfig {
    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        let positive = [
            ("auction_interval", self.auction_interval),
            ("bidding_window", self.bidding_window),
            ("message_validity_window", self.message_validity_window),
            ("tick_duration", self.tick_duration),
            ("transit_timeout", self.transit_timeout),
            ("geometry.radius", self.geometry.radius),
            ("identifier.eligibility_radius", self.identifier.eligibility_radius),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        if self.conflict_top_k == 0 {
            return Err(EngineError::InvalidConfig(
                "conflict_top_k must be >= 1".to_string(),
            ));
        }
        if !(self.fallback_bid >= 0.0 && self.fallback_bid.is_finite()) {
            return Err(EngineError::InvalidConfig(format!(
                "fallback_bid must be non-negative and finite, got {}",
                self.fallback_bid
            )));
        }
        if !(self.identifier.min_crossing_speed >= 0.0) {
            return Err(EngineError::InvalidConfig(
                "identifier.min_crossing_speed must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Engine error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("snapshot rejected: {0}")]
    SnapshotMismatch(String),
}

// ============================================================================
// Statistics
// ============================================================================

/// Point-in-time statistics snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuctionStats {
    /// Live auctions (0 or 1 by construction)
    pub active_auctions: usize,
    /// Status of the live auction, if any
    pub auction_status: Option<AuctionStatus>,
    /// Agents identified in the current cycle (or fixed in the live auction)
    pub current_agents: usize,
    /// Platoon agents among them
    pub platoon_agents: usize,
    /// Standalone vehicle agents among them
    pub vehicle_agents: usize,
    /// Agents inside the junction footprint
    pub in_junction_agents: usize,
    /// Agents approaching but not yet inside
    pub approaching_agents: usize,
    /// `Go` entries in the current priority order
    pub go_count: usize,
    /// `Wait` entries in the current priority order
    pub wait_count: usize,
    /// Auctions completed since engine start
    pub completed_auctions: usize,
    /// Agents currently under protected-transit tracking
    pub protected_agents: usize,
    /// Broadcast messages currently alive
    pub message_queue_depth: usize,
    /// Bids rejected by the auction state machine
    pub rejected_bids: u64,
    /// Bids substituted with the fallback value after a policy failure
    pub defaulted_bids: u64,
}

// ============================================================================
// Engine
// ============================================================================

/// Decentralized auction engine.
///
/// Owns the full auction lifecycle state: the live auction handle, the
/// bounded archive, the protected-transit set (via the evaluator), the
/// broadcast queue and the event log. All mutation happens inside
/// [`AuctionEngine::update`].
pub struct AuctionEngine {
    config: EngineConfig,
    engine_id: String,
    clock: SimClock,
    identifier: ParticipantIdentifier,
    policy: Box<dyn BidPolicy>,
    evaluator: AuctionEvaluator,
    resolver: Box<dyn ConflictResolver>,
    current_auction: Option<Auction>,
    archived: VecDeque<Auction>,
    last_auction_start: Option<f64>,
    current_participants: Vec<Agent>,
    messages: MessageQueue,
    event_log: EventLog,
    completed_count: usize,
    rejected_bids: u64,
    defaulted_bids: u64,
}

impl std::fmt::Debug for AuctionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuctionEngine")
            .field("engine_id", &self.engine_id)
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("current_auction", &self.current_auction)
            .field("archived", &self.archived)
            .field("last_auction_start", &self.last_auction_start)
            .field("current_participants", &self.current_participants)
            .field("messages", &self.messages)
            .field("event_log", &self.event_log)
            .field("completed_count", &self.completed_count)
            .field("rejected_bids", &self.rejected_bids)
            .field("defaulted_bids", &self.defaulted_bids)
            .finish_non_exhaustive()
    }
}

impl AuctionEngine {
    /// Create an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            engine_id: uuid::Uuid::new_v4().to_string(),
            clock: SimClock::new(config.tick_duration),
            identifier: ParticipantIdentifier::new(config.identifier),
            policy: config.policy.build(),
            evaluator: AuctionEvaluator::new(config.transit_timeout),
            resolver: Box::new(AlwaysGoResolver),
            current_auction: None,
            archived: VecDeque::new(),
            last_auction_start: None,
            current_participants: Vec::new(),
            messages: MessageQueue::new(config.message_validity_window),
            event_log: EventLog::new(),
            completed_count: 0,
            rejected_bids: 0,
            defaulted_bids: 0,
            config,
        })
    }

    /// Install the external conflict resolver.
    ///
    /// Until one is installed, every winner proceeds in ranked order.
    pub fn set_conflict_resolver(&mut self, resolver: Box<dyn ConflictResolver>) {
        self.resolver = resolver;
    }

    /// Replace the participant identifier (e.g. to install a route-planner
    /// backed direction resolver).
    pub fn set_identifier(&mut self, identifier: ParticipantIdentifier) {
        self.identifier = identifier;
    }

    /// Replace the bid policy.
    pub fn set_bid_policy(&mut self, policy: Box<dyn BidPolicy>) {
        self.policy = policy;
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Unique id of this engine run.
    pub fn engine_id(&self) -> &str {
        &self.engine_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current simulation time.
    pub fn current_time(&self) -> f64 {
        self.clock.now()
    }

    /// Cycles executed so far.
    pub fn current_tick(&self) -> u64 {
        self.clock.current_tick()
    }

    /// The live auction, if one exists this cycle.
    pub fn current_auction(&self) -> Option<&Auction> {
        self.current_auction.as_ref()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn messages(&self) -> &MessageQueue {
        &self.messages
    }

    pub fn evaluator(&self) -> &AuctionEvaluator {
        &self.evaluator
    }

    /// Mutable access to the bid policy, for external tuning layers
    /// (downcast via [`BidPolicy::as_any_mut`]).
    pub fn policy_mut(&mut self) -> &mut dyn BidPolicy {
        &mut *self.policy
    }

    // ========================================================================
    // Cycle
    // ========================================================================

    /// Run one full engine cycle and return the current priority order.
    ///
    /// `vehicles` and `platoons` are this cycle's snapshots from the state
    /// and platoon layers. Per-agent failures (unscorable records, policy
    /// errors, late bids) are absorbed: they are counted, logged, and never
    /// abort the round.
    pub fn update(&mut self, vehicles: &[VehicleState], platoons: &[PlatoonState]) -> Vec<Winner> {
        let now = self.clock.now();

        // 1. Participant identification.
        let agents = self
            .identifier
            .identify(&self.config.geometry.center, vehicles, platoons);

        // 2. Protected-transit cleanup against live state.
        self.evaluator
            .cleanup(vehicles, platoons, now, &mut self.event_log);

        // 3. Archive the round completed last cycle; back to waiting.
        if self
            .current_auction
            .as_ref()
            .map(|a| a.status() == AuctionStatus::Completed)
            .unwrap_or(false)
        {
            if let Some(done) = self.current_auction.take() {
                self.archived.push_back(done);
                if self.archived.len() > MAX_ARCHIVED {
                    self.archived.pop_front();
                }
            }
        }

        // 4. Start a new round when the cadence allows.
        let interval_elapsed = self
            .last_auction_start
            .map(|t| now - t >= self.config.auction_interval)
            .unwrap_or(true);
        if self.current_auction.is_none() && !agents.is_empty() && interval_elapsed {
            self.start_auction(agents.clone(), now);
        }

        // 5. Bid collection.
        self.collect_bids(now);

        // 6. Evaluation at the deadline.
        self.maybe_evaluate(now);

        // 7. Conflict resolution over the top-ranked winners.
        self.apply_conflict_resolution(now);

        // 8. Broadcast aging.
        let dropped = self.messages.expire(now);
        if dropped > 0 {
            self.event_log.log(EngineEvent::MessagesExpired {
                time: now,
                count: dropped,
            });
        }

        // 9. Advance time.
        self.clock.advance_tick();

        self.current_participants = agents;
        self.current_priority_order()
    }

    /// The authoritative hand-off artifact for the control layer.
    ///
    /// Returns the live auction's winners once evaluated; otherwise the
    /// most recently archived round's winners; otherwise empty.
    pub fn current_priority_order(&self) -> Vec<Winner> {
        if let Some(auction) = &self.current_auction {
            if !auction.winners().is_empty() {
                return auction.winners().to_vec();
            }
        }
        self.archived
            .iter()
            .rev()
            .find(|a| !a.winners().is_empty())
            .map(|a| a.winners().to_vec())
            .unwrap_or_default()
    }

    /// Statistics snapshot for observability and tuning layers.
    pub fn auction_stats(&self) -> AuctionStats {
        let participants: &[Agent] = self
            .current_auction
            .as_ref()
            .map(|a| a.participants())
            .unwrap_or(&self.current_participants);

        let platoon_agents = participants.iter().filter(|a| a.is_platoon()).count();
        let in_junction_agents = participants.iter().filter(|a| a.at_junction()).count();

        let order = self.current_priority_order();
        let go_count = order
            .iter()
            .filter(|w| w.action() == ConflictAction::Go)
            .count();

        AuctionStats {
            active_auctions: usize::from(self.current_auction.is_some()),
            auction_status: self.current_auction.as_ref().map(|a| a.status()),
            current_agents: participants.len(),
            platoon_agents,
            vehicle_agents: participants.len() - platoon_agents,
            in_junction_agents,
            approaching_agents: participants.len() - in_junction_agents,
            go_count,
            wait_count: order.len() - go_count,
            completed_auctions: self.completed_count,
            protected_agents: self.evaluator.protected_count(),
            message_queue_depth: self.messages.len(),
            rejected_bids: self.rejected_bids,
            defaulted_bids: self.defaulted_bids,
        }
    }

    // ========================================================================
    // Internal steps
    // ========================================================================

    fn start_auction(&mut self, agents: Vec<Agent>, now: f64) {
        let platoons = agents.iter().filter(|a| a.is_platoon()).count();
        let vehicles = agents.len() - platoons;
        let participant_ids: Vec<String> = agents.iter().map(|a| a.id().to_string()).collect();

        let auction = Auction::new(agents, now, self.config.bidding_window);

        self.event_log.log(EngineEvent::AuctionStarted {
            time: now,
            auction_id: auction.id().to_string(),
            participants: participant_ids.len(),
            platoons,
            vehicles,
        });
        self.messages.broadcast(V2vMessage {
            auction_id: auction.id().to_string(),
            timestamp: now,
            payload: V2vPayload::AuctionStart {
                participants: participant_ids,
            },
        });

        self.last_auction_start = Some(now);
        self.current_auction = Some(auction);
    }

    fn collect_bids(&mut self, now: f64) {
        let auction = match self.current_auction.as_mut() {
            Some(a) if a.status() == AuctionStatus::Bidding => a,
            _ => return,
        };

        let pending: Vec<Agent> = auction
            .participants()
            .iter()
            .filter(|a| !auction.has_bid(a.id()))
            .cloned()
            .collect();
        let auction_id = auction.id().to_string();

        for agent in pending {
            let computed = self.policy.compute_bid(&agent, &self.config.geometry);
            let (value, failure) = match computed {
                Ok(v) => (v, None),
                Err(e) => (self.config.fallback_bid, Some(e.to_string())),
            };

            match auction.submit_bid(agent.id(), value, now) {
                Ok(()) => {
                    if let Some(reason) = failure {
                        self.defaulted_bids += 1;
                        self.event_log.log(EngineEvent::BidDefaulted {
                            time: now,
                            auction_id: auction_id.clone(),
                            participant_id: agent.id().to_string(),
                            reason,
                        });
                    } else {
                        self.event_log.log(EngineEvent::BidSubmitted {
                            time: now,
                            auction_id: auction_id.clone(),
                            participant_id: agent.id().to_string(),
                            value,
                        });
                    }
                }
                Err(e) => {
                    self.rejected_bids += 1;
                    self.event_log.log(EngineEvent::BidRejected {
                        time: now,
                        auction_id: auction_id.clone(),
                        participant_id: agent.id().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    fn maybe_evaluate(&mut self, now: f64) {
        let auction = match self.current_auction.as_mut() {
            Some(a) => a,
            None => return,
        };
        if auction.status() != AuctionStatus::Bidding || !auction.is_expired(now) {
            return;
        }
        if auction.begin_evaluation().is_err() {
            return;
        }

        let auction_id = auction.id().to_string();
        if let Ok(winners) = self.evaluator.evaluate(auction, now, &mut self.event_log) {
            self.completed_count += 1;
            self.event_log.log(EngineEvent::AuctionCompleted {
                time: now,
                auction_id: auction_id.clone(),
                winners: winners.len(),
            });

            let summaries: Vec<WinnerSummary> = winners
                .iter()
                .take(RESULTS_BROADCAST_TOP)
                .map(|w| WinnerSummary {
                    participant_id: w.agent().id().to_string(),
                    bid_value: w.bid().value(),
                    rank: w.rank(),
                })
                .collect();
            self.messages.broadcast(V2vMessage {
                auction_id,
                timestamp: now,
                payload: V2vPayload::AuctionResults { winners: summaries },
            });
        }
    }

    fn apply_conflict_resolution(&mut self, now: f64) {
        let top: Vec<Agent> = {
            let order = self.current_priority_order();
            if order.is_empty() {
                return;
            }
            order
                .iter()
                .take(self.config.conflict_top_k)
                .map(|w| w.agent().clone())
                .collect()
        };

        let verdict = self.resolver.resolve(&top);

        let winners = match self.priority_order_mut() {
            Some(w) => w,
            None => return,
        };

        let mut go: Vec<Winner> = Vec::with_capacity(winners.len());
        let mut wait: Vec<Winner> = Vec::new();
        for mut winner in winners.drain(..) {
            let action = verdict
                .get(winner.agent().id())
                .copied()
                .unwrap_or(ConflictAction::Go);
            winner.set_action(action);
            match action {
                ConflictAction::Go => go.push(winner),
                ConflictAction::Wait => wait.push(winner),
            }
        }

        let waiting = wait.len();
        go.extend(wait);
        for (i, winner) in go.iter_mut().enumerate() {
            winner.set_rank(i + 1);
        }
        *winners = go;

        if waiting > 0 {
            self.event_log.log(EngineEvent::ConflictReordered {
                time: now,
                waiting,
            });
        }
    }

    /// Mutable handle on whichever winner list is currently authoritative.
    fn priority_order_mut(&mut self) -> Option<&mut Vec<Winner>> {
        let current_has_winners = self
            .current_auction
            .as_ref()
            .map(|a| !a.winners().is_empty())
            .unwrap_or(false);
        if current_has_winners {
            return self.current_auction.as_mut().map(|a| a.winners_mut());
        }
        self.archived
            .iter_mut()
            .rev()
            .find(|a| !a.winners().is_empty())
            .map(|a| a.winners_mut())
    }

    // ========================================================================
    // Snapshot plumbing (see orchestrator::checkpoint)
    // ========================================================================

    pub(crate) fn snapshot_parts(
        &self,
    ) -> (
        &SimClock,
        Option<&Auction>,
        &VecDeque<Auction>,
        Option<f64>,
        &MessageQueue,
        usize,
        u64,
        u64,
    ) {
        (
            &self.clock,
            self.current_auction.as_ref(),
            &self.archived,
            self.last_auction_start,
            &self.messages,
            self.completed_count,
            self.rejected_bids,
            self.defaulted_bids,
        )
    }

    pub(crate) fn restore_parts(
        &mut self,
        engine_id: String,
        clock: SimClock,
        current_auction: Option<Auction>,
        archived: VecDeque<Auction>,
        last_auction_start: Option<f64>,
        messages: MessageQueue,
        protected: Vec<(String, f64)>,
        completed_count: usize,
        rejected_bids: u64,
        defaulted_bids: u64,
    ) {
        self.engine_id = engine_id;
        self.clock = clock;
        self.current_auction = current_auction;
        self.archived = archived;
        self.last_auction_start = last_auction_start;
        self.messages = messages;
        self.evaluator = AuctionEvaluator::new(self.config.transit_timeout);
        self.evaluator.restore_entries(protected);
        self.completed_count = completed_count;
        self.rejected_bids = rejected_bids;
        self.defaulted_bids = defaulted_bids;
    }
}
