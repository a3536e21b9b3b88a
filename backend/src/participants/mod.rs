//! Per-cycle participant identification.
//!
//! Scans the current vehicle and platoon records and produces the eligible
//! agent set for the next auction: platoons first (claiming their members),
//! then one standalone "lane leader" per approach lane. The cap of one
//! bidder per lane bounds auction size to the number of lanes.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::agent::Agent;
use crate::models::vehicle::{Location, PlatoonState, TurnDirection, VehicleState};

/// Resolves a vehicle's travel direction through the intersection.
///
/// Stand-in for the external route planner. Implementations must be
/// deterministic; a direction that cannot be resolved is reported as
/// [`TurnDirection::Unknown`], never guessed.
pub trait RouteDirectionResolver: Send + Sync {
    fn resolve(&self, vehicle: &VehicleState) -> TurnDirection;
}

/// Geometric default resolver.
///
/// Compares the vehicle's heading with the bearing to its destination:
/// within ±22.5° is straight ahead, otherwise left or right by the sign of
/// the cross product (counterclockwise positive). Degenerate geometry
/// (stationary vehicle, destination at the current position, no
/// destination) resolves to `Unknown`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingResolver;

const STRAIGHT_HALF_ANGLE_RAD: f64 = 22.5 * std::f64::consts::PI / 180.0;
const DEGENERATE_EPSILON: f64 = 1e-6;

impl RouteDirectionResolver for HeadingResolver {
    fn resolve(&self, vehicle: &VehicleState) -> TurnDirection {
        let destination = match vehicle.destination {
            Some(d) => d,
            None => return TurnDirection::Unknown,
        };

        let hx = vehicle.velocity.x;
        let hy = vehicle.velocity.y;
        let dx = destination.x - vehicle.location.x;
        let dy = destination.y - vehicle.location.y;

        if (hx * hx + hy * hy).sqrt() < DEGENERATE_EPSILON
            || (dx * dx + dy * dy).sqrt() < DEGENERATE_EPSILON
        {
            return TurnDirection::Unknown;
        }

        let cross = hx * dy - hy * dx;
        let dot = hx * dx + hy * dy;
        let angle = cross.atan2(dot);

        if angle.abs() <= STRAIGHT_HALF_ANGLE_RAD {
            TurnDirection::Straight
        } else if angle > 0.0 {
            TurnDirection::Left
        } else {
            TurnDirection::Right
        }
    }
}

/// Eligibility thresholds for participant identification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdentifierConfig {
    /// Maximum leader distance to the intersection center for eligibility
    pub eligibility_radius: f64,
    /// Speed above which an in-junction vehicle counts as actively crossing
    pub min_crossing_speed: f64,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            eligibility_radius: 100.0,
            min_crossing_speed: 1.0,
        }
    }
}

/// Produces the eligible agent set for the next auction.
pub struct ParticipantIdentifier {
    config: IdentifierConfig,
    resolver: Box<dyn RouteDirectionResolver>,
}

impl ParticipantIdentifier {
    pub fn new(config: IdentifierConfig) -> Self {
        Self {
            config,
            resolver: Box::new(HeadingResolver),
        }
    }

    /// Replace the direction resolver (e.g. with a route-planner-backed one).
    pub fn with_resolver(mut self, resolver: Box<dyn RouteDirectionResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &IdentifierConfig {
        &self.config
    }

    /// One identification pass over the current records.
    ///
    /// 1. Structurally valid platoons (≥ 2 members) whose leader is within
    ///    the eligibility radius become agents; their members are claimed.
    /// 2. Unclaimed vehicles within the radius are grouped by lane; only the
    ///    vehicle closest to the center per lane remains a candidate.
    /// 3. A lane leader already crossing (in the junction and faster than
    ///    the crossing-speed threshold) is committed and does not re-bid.
    /// 4. A candidate without a destination cannot be scored and is dropped.
    ///
    /// The returned order is sorted by agent id; ranking downstream depends
    /// only on bid values, but a stable order keeps runs reproducible.
    pub fn identify(
        &self,
        center: &Location,
        vehicles: &[VehicleState],
        platoons: &[PlatoonState],
    ) -> Vec<Agent> {
        let mut agents = Vec::new();
        let mut claimed: HashSet<&str> = HashSet::new();

        for platoon in platoons {
            if !platoon.is_valid() {
                continue;
            }
            let leader = match platoon.leader() {
                Some(l) => l,
                None => continue,
            };
            if leader.distance_to(center) > self.config.eligibility_radius {
                continue;
            }
            for member in &platoon.vehicles {
                claimed.insert(member.id.as_str());
            }
            if let Some(agent) = Agent::from_platoon(platoon.clone()) {
                agents.push(agent);
            }
        }

        let mut lane_leaders: HashMap<&str, &VehicleState> = HashMap::new();
        for vehicle in vehicles {
            if claimed.contains(vehicle.id.as_str()) {
                continue;
            }
            if vehicle.distance_to(center) > self.config.eligibility_radius {
                continue;
            }
            lane_leaders
                .entry(vehicle.lane.as_str())
                .and_modify(|current| {
                    if vehicle.distance_to(center) < current.distance_to(center) {
                        *current = vehicle;
                    }
                })
                .or_insert(vehicle);
        }

        let mut candidates: Vec<&VehicleState> = lane_leaders.into_values().collect();
        candidates.sort_by(|a, b| a.id.cmp(&b.id));

        for vehicle in candidates {
            let actively_crossing =
                vehicle.is_junction && vehicle.speed() > self.config.min_crossing_speed;
            if actively_crossing {
                continue;
            }
            if !vehicle.has_destination() {
                continue;
            }
            let direction = self.resolver.resolve(vehicle);
            agents.push(Agent::from_vehicle(vehicle.clone(), direction));
        }

        agents.sort_by(|a, b| a.id().cmp(b.id()));
        agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::Velocity;

    fn vehicle(id: &str, lane: &str, x: f64) -> VehicleState {
        VehicleState {
            id: id.to_string(),
            location: Location::new(x, 0.0, 0.0),
            velocity: Velocity::new(-4.0, 0.0, 0.0),
            lane: lane.to_string(),
            destination: Some(Location::new(-60.0, 0.0, 0.0)),
            is_junction: false,
        }
    }

    fn center() -> Location {
        Location::new(0.0, 0.0, 0.0)
    }

    #[test]
    fn test_lane_leader_is_closest() {
        let identifier = ParticipantIdentifier::new(IdentifierConfig::default());
        let vehicles = vec![
            vehicle("far", "east_in", 40.0),
            vehicle("near", "east_in", 12.0),
        ];
        let agents = identifier.identify(&center(), &vehicles, &[]);
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].id(), "near");
    }

    #[test]
    fn test_heading_resolver_straight_ahead() {
        let resolver = HeadingResolver;
        let v = vehicle("v", "east_in", 30.0); // heading -x, destination at -60
        assert_eq!(resolver.resolve(&v), TurnDirection::Straight);
    }

    #[test]
    fn test_heading_resolver_left_and_right() {
        let resolver = HeadingResolver;
        let mut v = vehicle("v", "east_in", 30.0);
        // Heading -x. Facing west, +y is on the driver's right: the cross
        // product of heading (-4, 0) and offset (0, 40) is negative.
        v.destination = Some(Location::new(30.0, 40.0, 0.0));
        let up = resolver.resolve(&v);
        v.destination = Some(Location::new(30.0, -40.0, 0.0));
        let down = resolver.resolve(&v);
        assert_eq!(up, TurnDirection::Right);
        assert_eq!(down, TurnDirection::Left);
    }

    #[test]
    fn test_stationary_vehicle_unknown_direction() {
        let resolver = HeadingResolver;
        let mut v = vehicle("v", "east_in", 30.0);
        v.velocity = Velocity::new(0.0, 0.0, 0.0);
        assert_eq!(resolver.resolve(&v), TurnDirection::Unknown);
    }
}
