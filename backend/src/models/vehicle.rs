//! Input records supplied by the external state and platoon layers.
//!
//! These are value-like snapshots, recomputed by the caller every cycle.
//! The engine never mutates them and never holds them across cycles except
//! inside `Agent` snapshots. All distance and speed computations use the XY
//! plane only; the Z coordinate is carried for completeness.

use serde::{Deserialize, Serialize};

/// A point in simulation space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in the XY plane.
    pub fn distance_xy(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A velocity vector in simulation space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Velocity {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Speed in the XY plane.
    pub fn speed_xy(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// Travel direction through the intersection.
///
/// `Unknown` is an explicit category: an agent whose route cannot be
/// resolved scores with neutral urgency and penalty instead of being
/// assigned a random direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    Left,
    Straight,
    Right,
    Unknown,
}

impl std::fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TurnDirection::Left => "left",
            TurnDirection::Straight => "straight",
            TurnDirection::Right => "right",
            TurnDirection::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Intersection footprint used for scoring and eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntersectionGeometry {
    /// Center of the junction footprint
    pub center: Location,
    /// Radius of the junction footprint in distance units
    pub radius: f64,
}

impl Default for IntersectionGeometry {
    fn default() -> Self {
        Self {
            center: Location::new(0.0, 0.0, 0.0),
            radius: 15.0,
        }
    }
}

/// Per-cycle vehicle record from the state-acquisition layer.
///
/// # Example
/// ```
/// use intersection_auction_core_rs::{Location, VehicleState, Velocity};
///
/// let vehicle = VehicleState {
///     id: "veh_1".to_string(),
///     location: Location::new(10.0, 0.0, 0.0),
///     velocity: Velocity::new(-5.0, 0.0, 0.0),
///     lane: "east_in".to_string(),
///     destination: Some(Location::new(-50.0, 0.0, 0.0)),
///     is_junction: false,
/// };
/// assert!(vehicle.has_destination());
/// assert!((vehicle.speed() - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Unique vehicle identifier
    pub id: String,
    /// Current position
    pub location: Location,
    /// Current velocity
    pub velocity: Velocity,
    /// Lane identity (approach lane)
    pub lane: String,
    /// Route goal, if the vehicle has one
    pub destination: Option<Location>,
    /// Whether the vehicle is inside the junction footprint
    pub is_junction: bool,
}

impl VehicleState {
    /// Current XY speed.
    pub fn speed(&self) -> f64 {
        self.velocity.speed_xy()
    }

    /// XY distance to a reference point.
    pub fn distance_to(&self, point: &Location) -> f64 {
        self.location.distance_xy(point)
    }

    /// Whether the vehicle has a resolvable route goal.
    pub fn has_destination(&self) -> bool {
        self.destination.is_some()
    }
}

/// Per-cycle platoon record from the platoon-formation layer.
///
/// Members are ordered leader-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatoonState {
    /// Unique platoon identifier
    pub id: String,
    /// Member vehicle states, leader first
    pub vehicles: Vec<VehicleState>,
    /// Goal direction reported by the platoon layer
    pub goal_direction: TurnDirection,
}

impl PlatoonState {
    /// The platoon leader, if the platoon has any members.
    pub fn leader(&self) -> Option<&VehicleState> {
        self.vehicles.first()
    }

    /// Number of member vehicles.
    pub fn size(&self) -> usize {
        self.vehicles.len()
    }

    /// A platoon is structurally valid with at least two members.
    pub fn is_valid(&self) -> bool {
        self.vehicles.len() >= 2
    }

    /// Whether any member is inside the junction footprint.
    pub fn any_in_junction(&self) -> bool {
        self.vehicles.iter().any(|v| v.is_junction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_ignores_z() {
        let a = Location::new(0.0, 0.0, 0.0);
        let b = Location::new(3.0, 4.0, 100.0);
        assert!((a.distance_xy(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_platoon_validity() {
        let make = |id: &str| VehicleState {
            id: id.to_string(),
            location: Location::new(0.0, 0.0, 0.0),
            velocity: Velocity::new(0.0, 0.0, 0.0),
            lane: "north_in".to_string(),
            destination: None,
            is_junction: false,
        };
        let mut platoon = PlatoonState {
            id: "platoon_1".to_string(),
            vehicles: vec![make("a")],
            goal_direction: TurnDirection::Straight,
        };
        assert!(!platoon.is_valid());
        platoon.vehicles.push(make("b"));
        assert!(platoon.is_valid());
        assert_eq!(platoon.leader().map(|v| v.id.as_str()), Some("a"));
    }
}
