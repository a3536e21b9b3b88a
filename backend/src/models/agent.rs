//! Auction participant model.
//!
//! An agent is either a standalone vehicle or a platoon. Both compete in
//! the same auctions, so shared attributes (position, speed, junction
//! occupancy, travel direction) are exposed through accessors on `Agent`
//! rather than through field probing on the underlying records.
//!
//! Agents are value-like snapshots: the identifier rebuilds them every
//! cycle from fresh input records, and nothing mutates them afterwards.
//! The id is the only handle that persists across cycles.

use serde::{Deserialize, Serialize};

use crate::models::vehicle::{Location, PlatoonState, TurnDirection, VehicleState};

/// Participant payload: one vehicle or an ordered platoon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentKind {
    Vehicle(VehicleState),
    Platoon(PlatoonState),
}

/// A competitor in one auction round.
///
/// # Example
/// ```
/// use intersection_auction_core_rs::{Agent, Location, TurnDirection, VehicleState, Velocity};
///
/// let vehicle = VehicleState {
///     id: "veh_1".to_string(),
///     location: Location::new(12.0, 0.0, 0.0),
///     velocity: Velocity::new(-4.0, 0.0, 0.0),
///     lane: "east_in".to_string(),
///     destination: Some(Location::new(-50.0, 0.0, 0.0)),
///     is_junction: false,
/// };
/// let agent = Agent::from_vehicle(vehicle, TurnDirection::Straight);
/// assert_eq!(agent.id(), "veh_1");
/// assert_eq!(agent.size(), 1);
/// assert!(!agent.is_platoon());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    id: String,
    kind: AgentKind,
    direction: TurnDirection,
    at_junction: bool,
}

impl Agent {
    /// Build an agent from a standalone vehicle and its resolved direction.
    pub fn from_vehicle(vehicle: VehicleState, direction: TurnDirection) -> Self {
        Self {
            id: vehicle.id.clone(),
            at_junction: vehicle.is_junction,
            direction,
            kind: AgentKind::Vehicle(vehicle),
        }
    }

    /// Build an agent from a platoon record.
    ///
    /// Returns `None` for a platoon with no members; such a record cannot
    /// be positioned and is excluded from the round.
    pub fn from_platoon(platoon: PlatoonState) -> Option<Self> {
        platoon.leader()?;
        Some(Self {
            id: platoon.id.clone(),
            at_junction: platoon.any_in_junction(),
            direction: platoon.goal_direction,
            kind: AgentKind::Platoon(platoon),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &AgentKind {
        &self.kind
    }

    pub fn direction(&self) -> TurnDirection {
        self.direction
    }

    /// Whether the agent occupies the junction footprint.
    ///
    /// For a platoon this is true when any member is inside.
    pub fn at_junction(&self) -> bool {
        self.at_junction
    }

    pub fn is_platoon(&self) -> bool {
        matches!(self.kind, AgentKind::Platoon(_))
    }

    /// Number of vehicles represented by this agent.
    pub fn size(&self) -> usize {
        match &self.kind {
            AgentKind::Vehicle(_) => 1,
            AgentKind::Platoon(p) => p.size(),
        }
    }

    /// Reference position: the vehicle's own, or the platoon leader's.
    pub fn location(&self) -> Location {
        match &self.kind {
            AgentKind::Vehicle(v) => v.location,
            // from_platoon guarantees a leader exists
            AgentKind::Platoon(p) => p.vehicles[0].location,
        }
    }

    /// Reference XY speed: the vehicle's own, or the platoon leader's.
    pub fn speed(&self) -> f64 {
        match &self.kind {
            AgentKind::Vehicle(v) => v.speed(),
            AgentKind::Platoon(p) => p.vehicles[0].speed(),
        }
    }

    /// XY distance from the reference position to a point.
    pub fn distance_to(&self, point: &Location) -> f64 {
        self.location().distance_xy(point)
    }
}
