//! Auction evaluation and protected-transit bookkeeping.
//!
//! Evaluation ranks an auction's bids exactly once: by value descending,
//! ties to the earlier timestamp, then to the earlier submission sequence.
//! Ranks are dense, 1..N.
//!
//! The evaluator also owns the protected-transit set: agents that were
//! physically inside the junction footprint when first observed as winners.
//! Protection is bookkeeping with its own lifecycle — it does not exempt an
//! agent from being outranked — and is released when the agent is observed
//! outside the footprint, when a platoon disappears from the live set, or
//! after a hard timeout, whichever comes first.

use std::collections::HashMap;

use crate::models::auction::{Auction, AuctionError, AuctionStatus, Winner};
use crate::models::event::{EngineEvent, EventLog};
use crate::models::vehicle::{PlatoonState, VehicleState};

/// Default hard timeout for protected-transit entries, in time units.
pub const DEFAULT_TRANSIT_TIMEOUT: f64 = 30.0;

/// Ranks auctions and tracks agents committed to crossing.
pub struct AuctionEvaluator {
    /// Agent id → sim time the agent entered protection
    in_transit: HashMap<String, f64>,
    transit_timeout: f64,
}

impl AuctionEvaluator {
    pub fn new(transit_timeout: f64) -> Self {
        Self {
            in_transit: HashMap::new(),
            transit_timeout,
        }
    }

    /// Rank the auction's bids into the winner list.
    ///
    /// Valid exactly once per auction, while its status is `Evaluating`;
    /// completes the auction as a side effect. Winners observed inside the
    /// junction footprint enter the protected-transit set.
    pub fn evaluate(
        &mut self,
        auction: &mut Auction,
        now: f64,
        log: &mut EventLog,
    ) -> Result<Vec<Winner>, AuctionError> {
        if auction.status() != AuctionStatus::Evaluating {
            return Err(AuctionError::NotEvaluating {
                auction_id: auction.id().to_string(),
                status: auction.status(),
            });
        }

        let mut bids: Vec<_> = auction.bids().values().cloned().collect();
        bids.sort_by(|a, b| {
            b.value()
                .partial_cmp(&a.value())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    a.timestamp()
                        .partial_cmp(&b.timestamp())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.sequence().cmp(&b.sequence()))
        });

        let winners: Vec<Winner> = bids
            .into_iter()
            .enumerate()
            .map(|(i, bid)| Winner::new(bid.agent().clone(), bid.clone(), i + 1))
            .collect();

        for winner in &winners {
            let agent = winner.agent();
            if agent.at_junction() && !self.in_transit.contains_key(agent.id()) {
                self.in_transit.insert(agent.id().to_string(), now);
                log.log(EngineEvent::ProtectionGranted {
                    time: now,
                    agent_id: agent.id().to_string(),
                });
            }
        }

        auction.complete(winners.clone())?;
        Ok(winners)
    }

    /// Re-check every protected agent against live state.
    ///
    /// Releases protection for agents observed outside the junction
    /// footprint, platoons absent from the live set (treated as having
    /// completed transit), vehicles no longer reported at all, and any
    /// entry older than the transit timeout.
    pub fn cleanup(
        &mut self,
        vehicles: &[VehicleState],
        platoons: &[PlatoonState],
        now: f64,
        log: &mut EventLog,
    ) {
        let timeout = self.transit_timeout;
        let mut released: Vec<(String, &'static str)> = Vec::new();

        for (id, entered_at) in &self.in_transit {
            if now - *entered_at >= timeout {
                released.push((id.clone(), "timed_out"));
                continue;
            }

            if let Some(platoon) = platoons.iter().find(|p| &p.id == id) {
                if !platoon.any_in_junction() {
                    released.push((id.clone(), "left_junction"));
                }
            } else if let Some(vehicle) = vehicles.iter().find(|v| &v.id == id) {
                if !vehicle.is_junction {
                    released.push((id.clone(), "left_junction"));
                }
            } else {
                // Not reported by any layer anymore: transit completed.
                released.push((id.clone(), "departed"));
            }
        }

        for (id, reason) in released {
            self.in_transit.remove(&id);
            log.log(EngineEvent::ProtectionReleased {
                time: now,
                agent_id: id,
                reason: reason.to_string(),
            });
        }
    }

    pub fn protected_count(&self) -> usize {
        self.in_transit.len()
    }

    pub fn is_protected(&self, agent_id: &str) -> bool {
        self.in_transit.contains_key(agent_id)
    }

    /// Protected ids with their entry times, for snapshots and stats.
    pub fn protected_entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.in_transit.iter().map(|(id, t)| (id.as_str(), *t))
    }

    pub(crate) fn restore_entries(&mut self, entries: impl IntoIterator<Item = (String, f64)>) {
        self.in_transit = entries.into_iter().collect();
    }

    pub fn transit_timeout(&self) -> f64 {
        self.transit_timeout
    }
}

impl Default for AuctionEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSIT_TIMEOUT)
    }
}
