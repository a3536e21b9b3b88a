//! Trainable bid policy.
//!
//! Variant of the scoring policy whose parameters are tuned by an external
//! training layer between episodes. Each scoring call is still a pure
//! function of the current parameters and the given agent; the policy keeps
//! no per-vehicle history and draws no randomness. All parameter updates
//! clamp to documented ranges so a runaway tuner cannot push bids outside
//! the conventional [1, 200] band.

use crate::models::agent::Agent;
use crate::models::vehicle::IntersectionGeometry;
use crate::policy::{BidError, BidPolicy};

/// Tunable parameters with their clamping ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainableParams {
    /// Overall bid scaling, clamped to [0.1, 5.0]
    pub bid_scale: f64,
    /// Weight of the ETA urgency factor, clamped to [0.5, 3.0]
    pub urgency_weight: f64,
    /// Weight of the speed factor, clamped to [0.0, 1.0]
    pub speed_weight: f64,
    /// Platoon coordination bonus per log-member, clamped to [0.0, 2.0]
    pub platoon_bonus: f64,
    /// Penalty for already occupying the junction, clamped to [0.0, 1.0]
    pub junction_penalty: f64,
    /// ETA below which an approach counts as urgent, clamped to [1.0, 20.0]
    pub urgency_threshold: f64,
}

impl Default for TrainableParams {
    fn default() -> Self {
        Self {
            bid_scale: 1.0,
            urgency_weight: 1.0,
            speed_weight: 0.3,
            platoon_bonus: 0.5,
            junction_penalty: 0.2,
            urgency_threshold: 5.0,
        }
    }
}

impl TrainableParams {
    fn clamped(self) -> Self {
        Self {
            bid_scale: self.bid_scale.clamp(0.1, 5.0),
            urgency_weight: self.urgency_weight.clamp(0.5, 3.0),
            speed_weight: self.speed_weight.clamp(0.0, 1.0),
            platoon_bonus: self.platoon_bonus.clamp(0.0, 2.0),
            junction_penalty: self.junction_penalty.clamp(0.0, 1.0),
            urgency_threshold: self.urgency_threshold.clamp(1.0, 20.0),
        }
    }
}

const BASE_BID: f64 = 10.0;
const MIN_BID: f64 = 1.0;
const MAX_BID: f64 = 200.0;
const PROXIMITY_RANGE: f64 = 50.0;

/// Externally tunable scoring policy.
#[derive(Debug, Clone, Copy)]
pub struct TrainableBidPolicy {
    params: TrainableParams,
}

impl TrainableBidPolicy {
    pub fn new() -> Self {
        Self {
            params: TrainableParams::default(),
        }
    }

    pub fn with_params(params: TrainableParams) -> Self {
        Self {
            params: params.clamped(),
        }
    }

    pub fn params(&self) -> &TrainableParams {
        &self.params
    }

    /// Replace all parameters, clamping each to its range.
    ///
    /// Intended to be called between episodes by the tuning layer, reached
    /// through [`BidPolicy::as_any_mut`].
    pub fn update_params(&mut self, params: TrainableParams) {
        self.params = params.clamped();
    }

    /// Update only the overall bid scale, clamped to [0.1, 5.0].
    pub fn set_bid_scale(&mut self, bid_scale: f64) {
        self.params.bid_scale = bid_scale.clamp(0.1, 5.0);
    }

    /// ETA urgency: immediate arrivals score the full 5.0; inside the
    /// urgency window the factor falls linearly; beyond it, hyperbolically.
    fn urgency_factor(&self, eta: f64) -> f64 {
        let threshold = self.params.urgency_threshold;
        if eta <= 0.0 {
            5.0
        } else if eta <= threshold {
            3.0 * (threshold - eta) / threshold
        } else {
            (1.0 / (1.0 + 0.1 * (eta - threshold))).max(0.1)
        }
    }

    fn speed_factor(speed: f64) -> f64 {
        if speed < 2.0 {
            -2.0
        } else if speed > 12.0 {
            1.0
        } else {
            (speed - 2.0) / 10.0
        }
    }

    fn proximity_bonus(distance: f64) -> f64 {
        if distance < PROXIMITY_RANGE {
            (PROXIMITY_RANGE - distance) / PROXIMITY_RANGE * 3.0
        } else {
            0.0
        }
    }
}

impl Default for TrainableBidPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl BidPolicy for TrainableBidPolicy {
    fn compute_bid(
        &self,
        agent: &Agent,
        geometry: &IntersectionGeometry,
    ) -> Result<f64, BidError> {
        let p = &self.params;
        let speed = agent.speed();
        let distance = agent.distance_to(&geometry.center);

        // ETA from current kinematics; a stalled agent is treated as far out.
        let eta = if speed > 1e-6 {
            distance / speed
        } else {
            f64::INFINITY
        };

        let urgency = self.urgency_factor(eta) * p.urgency_weight;
        let speed_term = Self::speed_factor(speed) * p.speed_weight;

        let platoon_term = if agent.is_platoon() && agent.size() > 1 {
            p.platoon_bonus * (agent.size() as f64).ln()
        } else {
            0.0
        };

        let junction_term = if agent.at_junction() {
            -p.junction_penalty
        } else {
            0.0
        };

        let raw = BASE_BID
            + urgency
            + speed_term
            + platoon_term
            + junction_term
            + Self::proximity_bonus(distance);

        let bid = (raw * p.bid_scale).clamp(MIN_BID, MAX_BID);

        if !bid.is_finite() {
            return Err(BidError::NonFinite {
                agent_id: agent.id().to_string(),
            });
        }
        Ok(bid)
    }

    fn name(&self) -> &'static str {
        "trainable"
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::{Location, TurnDirection, VehicleState, Velocity};

    fn agent(distance: f64, speed: f64) -> Agent {
        Agent::from_vehicle(
            VehicleState {
                id: "veh".to_string(),
                location: Location::new(distance, 0.0, 0.0),
                velocity: Velocity::new(-speed, 0.0, 0.0),
                lane: "east_in".to_string(),
                destination: Some(Location::new(-50.0, 0.0, 0.0)),
                is_junction: false,
            },
            TurnDirection::Straight,
        )
    }

    #[test]
    fn test_bid_stays_in_conventional_band() {
        let policy = TrainableBidPolicy::with_params(TrainableParams {
            bid_scale: 100.0, // clamped to 5.0
            ..TrainableParams::default()
        });
        let geometry = IntersectionGeometry::default();
        let bid = policy.compute_bid(&agent(1.0, 5.0), &geometry).unwrap();
        assert!(bid <= 200.0);
        assert!(bid >= 1.0);
    }

    #[test]
    fn test_update_params_clamps() {
        let mut policy = TrainableBidPolicy::new();
        policy.update_params(TrainableParams {
            bid_scale: 0.0,
            urgency_weight: 99.0,
            speed_weight: -1.0,
            platoon_bonus: 5.0,
            junction_penalty: 2.0,
            urgency_threshold: 0.0,
        });
        let p = policy.params();
        assert_eq!(p.bid_scale, 0.1);
        assert_eq!(p.urgency_weight, 3.0);
        assert_eq!(p.speed_weight, 0.0);
        assert_eq!(p.platoon_bonus, 2.0);
        assert_eq!(p.junction_penalty, 1.0);
        assert_eq!(p.urgency_threshold, 1.0);
    }

    #[test]
    fn test_same_input_same_bid() {
        let policy = TrainableBidPolicy::new();
        let geometry = IntersectionGeometry::default();
        let a = agent(12.0, 4.0);
        let first = policy.compute_bid(&a, &geometry).unwrap();
        let second = policy.compute_bid(&a, &geometry).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_stalled_agent_not_urgent() {
        let policy = TrainableBidPolicy::new();
        let geometry = IntersectionGeometry::default();
        let moving = policy.compute_bid(&agent(10.0, 5.0), &geometry).unwrap();
        let stalled = policy.compute_bid(&agent(10.0, 0.0), &geometry).unwrap();
        assert!(moving > stalled);
    }
}
