//! Baseline bid policy.
//!
//! Weighted sum of independent factors computed from the agent snapshot:
//! turn urgency, position advantage, speed band, safety, platoon bonus and
//! junction occupancy, minus a turn-direction conflict penalty, floored at
//! zero. Right turns conflict with the fewest other movements and left
//! turns with the most, so urgency orders right > straight > left and the
//! penalty orders left > straight > right. Unknown directions score with
//! the neutral middle values.

use crate::models::agent::Agent;
use crate::models::vehicle::{IntersectionGeometry, TurnDirection};
use crate::policy::{BidError, BidPolicy};

/// Weights applied to the positive scoring factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BidWeights {
    pub urgency: f64,
    pub position: f64,
    pub speed: f64,
    pub safety: f64,
    pub junction: f64,
}

impl Default for BidWeights {
    fn default() -> Self {
        Self {
            urgency: 20.0,
            position: 15.0,
            speed: 10.0,
            safety: 12.0,
            junction: 8.0,
        }
    }
}

/// Distance below which position advantage reaches its approach plateau.
const NEAR_DISTANCE: f64 = 15.0;
/// Distance beyond which position advantage is zero.
const FAR_DISTANCE: f64 = 25.0;

/// Deterministic weighted-factor scoring policy.
///
/// # Example
/// ```
/// use intersection_auction_core_rs::policy::{BaselineBidPolicy, BidPolicy};
/// use intersection_auction_core_rs::{
///     Agent, IntersectionGeometry, Location, TurnDirection, VehicleState, Velocity,
/// };
///
/// let policy = BaselineBidPolicy::new();
/// let geometry = IntersectionGeometry::default();
/// let agent = Agent::from_vehicle(
///     VehicleState {
///         id: "veh_1".to_string(),
///         location: Location::new(5.0, 0.0, 0.0),
///         velocity: Velocity::new(-4.0, 0.0, 0.0),
///         lane: "east_in".to_string(),
///         destination: Some(Location::new(-50.0, 0.0, 0.0)),
///         is_junction: false,
///     },
///     TurnDirection::Right,
/// );
///
/// let bid = policy.compute_bid(&agent, &geometry).unwrap();
/// assert!(bid > 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BaselineBidPolicy {
    weights: BidWeights,
}

impl BaselineBidPolicy {
    pub fn new() -> Self {
        Self {
            weights: BidWeights::default(),
        }
    }

    pub fn with_weights(weights: BidWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &BidWeights {
        &self.weights
    }

    /// Turn urgency: right > straight > left, unknown neutral.
    fn urgency(direction: TurnDirection) -> f64 {
        match direction {
            TurnDirection::Right => 5.0,
            TurnDirection::Straight => 3.0,
            TurnDirection::Left => 1.5,
            TurnDirection::Unknown => 2.0,
        }
    }

    /// Position advantage: maximal inside the junction, otherwise strictly
    /// increasing as distance to the center falls, zero beyond the far
    /// threshold. Continuous across both thresholds.
    fn position_advantage(agent: &Agent, geometry: &IntersectionGeometry) -> f64 {
        if agent.at_junction() {
            return 20.0;
        }
        let distance = agent.distance_to(&geometry.center);
        if distance <= NEAR_DISTANCE {
            15.0 - distance / 3.0
        } else if distance <= FAR_DISTANCE {
            10.0 - (distance - NEAR_DISTANCE)
        } else {
            0.0
        }
    }

    /// Speed factor: a 2–8 unit band scores highest; stalled approaches
    /// score lowest, reckless ones in between.
    fn speed_factor(speed: f64) -> f64 {
        if (2.0..=8.0).contains(&speed) {
            8.0
        } else if speed < 2.0 {
            3.0
        } else {
            5.0
        }
    }

    /// Safety factor: small platoons and vehicles in a safe speed band
    /// score higher than large platoons or out-of-band speeds.
    fn safety_factor(agent: &Agent) -> f64 {
        if agent.is_platoon() {
            if agent.size() <= 3 {
                10.0
            } else {
                6.0
            }
        } else if (2.0..=10.0).contains(&agent.speed()) {
            8.0
        } else {
            4.0
        }
    }

    /// Coordination payoff, monotonically increasing in platoon size.
    fn platoon_bonus(agent: &Agent) -> f64 {
        if !agent.is_platoon() {
            return 0.0;
        }
        match agent.size() {
            0 | 1 => 0.0,
            2 => 12.0,
            3 => 20.0,
            _ => 30.0,
        }
    }

    /// Flat bonus for agents already inside the footprint: they must clear
    /// it before anything else can move.
    fn junction_factor(agent: &Agent) -> f64 {
        if agent.at_junction() {
            15.0
        } else {
            0.0
        }
    }

    /// Conflict penalty: left > straight > right, unknown neutral.
    fn conflict_penalty(direction: TurnDirection) -> f64 {
        match direction {
            TurnDirection::Left => 5.0,
            TurnDirection::Straight => 2.0,
            TurnDirection::Right => 0.0,
            TurnDirection::Unknown => 2.0,
        }
    }
}

impl Default for BaselineBidPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl BidPolicy for BaselineBidPolicy {
    fn compute_bid(
        &self,
        agent: &Agent,
        geometry: &IntersectionGeometry,
    ) -> Result<f64, BidError> {
        let w = &self.weights;
        let direction = agent.direction();

        let base = Self::urgency(direction) * w.urgency
            + Self::position_advantage(agent, geometry) * w.position
            + Self::speed_factor(agent.speed()) * w.speed
            + Self::safety_factor(agent) * w.safety
            + Self::platoon_bonus(agent)
            + Self::junction_factor(agent) * w.junction;

        let bid = base - Self::conflict_penalty(direction);

        if !bid.is_finite() {
            return Err(BidError::NonFinite {
                agent_id: agent.id().to_string(),
            });
        }
        Ok(bid.max(0.0))
    }

    fn name(&self) -> &'static str {
        "baseline"
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
