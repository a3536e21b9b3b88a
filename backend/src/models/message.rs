//! Simulated vehicle-to-vehicle broadcast channel.
//!
//! Auction starts and results are announced as broadcast messages held in a
//! bounded-lifetime queue. Messages are observational only — never
//! authoritative state — and model lossy short-range communication: each
//! message expires once older than the validity window, without any actual
//! network stack behind it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Compact winner entry carried in a results broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerSummary {
    pub participant_id: String,
    pub bid_value: f64,
    pub rank: usize,
}

/// Broadcast payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum V2vPayload {
    /// A new auction opened for bidding
    AuctionStart { participants: Vec<String> },
    /// An auction completed; top-ranked winners announced
    AuctionResults { winners: Vec<WinnerSummary> },
}

/// One transient broadcast record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V2vMessage {
    pub auction_id: String,
    pub timestamp: f64,
    pub payload: V2vPayload,
}

/// Bounded-lifetime broadcast buffer.
///
/// # Example
/// ```
/// use intersection_auction_core_rs::{MessageQueue, V2vMessage, V2vPayload};
///
/// let mut queue = MessageQueue::new(0.5);
/// queue.broadcast(V2vMessage {
///     auction_id: "auction_0000000000".to_string(),
///     timestamp: 0.0,
///     payload: V2vPayload::AuctionStart { participants: vec!["veh_1".to_string()] },
/// });
/// assert_eq!(queue.len(), 1);
///
/// // Still valid just inside the window, gone at the boundary.
/// queue.expire(0.4);
/// assert_eq!(queue.len(), 1);
/// queue.expire(0.5);
/// assert_eq!(queue.len(), 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageQueue {
    messages: VecDeque<V2vMessage>,
    validity_window: f64,
}

impl MessageQueue {
    pub fn new(validity_window: f64) -> Self {
        Self {
            messages: VecDeque::new(),
            validity_window,
        }
    }

    /// Append a message to the channel.
    pub fn broadcast(&mut self, message: V2vMessage) {
        self.messages.push_back(message);
    }

    /// Evict messages older than the validity window.
    ///
    /// Returns the number of messages dropped.
    pub fn expire(&mut self, now: f64) -> usize {
        let before = self.messages.len();
        let window = self.validity_window;
        self.messages.retain(|m| now - m.timestamp < window);
        before - self.messages.len()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &V2vMessage> {
        self.messages.iter()
    }

    pub fn validity_window(&self) -> f64 {
        self.validity_window
    }
}
