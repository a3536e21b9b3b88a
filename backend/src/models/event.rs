//! Engine event log.
//!
//! Every significant state change in the auction lifecycle is appended to
//! an in-process event log: auction opens, bid outcomes (accepted, defaulted,
//! rejected), evaluations, conflict reorderings, protection changes and
//! message expiry. The log is the diagnostic surface for rejected and
//! defaulted cases, and what integration tests assert against.

/// One engine event, stamped with simulation time.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A new auction opened for bidding
    AuctionStarted {
        time: f64,
        auction_id: String,
        participants: usize,
        platoons: usize,
        vehicles: usize,
    },

    /// A bid was accepted into the current auction
    BidSubmitted {
        time: f64,
        auction_id: String,
        participant_id: String,
        value: f64,
    },

    /// Bid computation failed; the fallback bid was substituted
    BidDefaulted {
        time: f64,
        auction_id: String,
        participant_id: String,
        reason: String,
    },

    /// A bid was rejected by the auction state machine
    BidRejected {
        time: f64,
        auction_id: String,
        participant_id: String,
        reason: String,
    },

    /// An auction was evaluated and completed
    AuctionCompleted {
        time: f64,
        auction_id: String,
        winners: usize,
    },

    /// The conflict resolver moved agents to the tail of the order
    ConflictReordered { time: f64, waiting: usize },

    /// An agent entered protected-transit tracking
    ProtectionGranted { time: f64, agent_id: String },

    /// An agent left protected-transit tracking
    ProtectionReleased {
        time: f64,
        agent_id: String,
        reason: String,
    },

    /// Stale broadcast messages were evicted from the queue
    MessagesExpired { time: f64, count: usize },
}

impl EngineEvent {
    /// Simulation time the event occurred at.
    pub fn time(&self) -> f64 {
        match self {
            EngineEvent::AuctionStarted { time, .. }
            | EngineEvent::BidSubmitted { time, .. }
            | EngineEvent::BidDefaulted { time, .. }
            | EngineEvent::BidRejected { time, .. }
            | EngineEvent::AuctionCompleted { time, .. }
            | EngineEvent::ConflictReordered { time, .. }
            | EngineEvent::ProtectionGranted { time, .. }
            | EngineEvent::ProtectionReleased { time, .. }
            | EngineEvent::MessagesExpired { time, .. } => *time,
        }
    }
}

/// Append-only log of engine events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<EngineEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &EngineEvent> {
        self.events.iter()
    }

    /// Count events matching a predicate.
    pub fn count_where<F: Fn(&EngineEvent) -> bool>(&self, predicate: F) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}
