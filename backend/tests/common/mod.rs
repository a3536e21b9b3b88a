//! Shared builders for integration tests.
#![allow(dead_code)]

use intersection_auction_core_rs::{
    EngineConfig, Location, PlatoonState, TurnDirection, VehicleState, Velocity,
};

/// Intersection center used throughout the tests.
pub fn center() -> Location {
    Location::new(0.0, 0.0, 0.0)
}

/// A vehicle on the +x axis heading toward the center, destination straight
/// through the intersection.
pub fn approaching_vehicle(id: &str, lane: &str, distance: f64, speed: f64) -> VehicleState {
    VehicleState {
        id: id.to_string(),
        location: Location::new(distance, 0.0, 0.0),
        velocity: Velocity::new(-speed, 0.0, 0.0),
        lane: lane.to_string(),
        destination: Some(Location::new(-60.0, 0.0, 0.0)),
        is_junction: false,
    }
}

/// Like [`approaching_vehicle`], but with the destination placed so the
/// geometric resolver yields the requested turn direction.
///
/// The vehicle faces -x, so a destination toward -y is its left and +y its
/// right.
pub fn turning_vehicle(
    id: &str,
    lane: &str,
    distance: f64,
    speed: f64,
    direction: TurnDirection,
) -> VehicleState {
    let destination = match direction {
        TurnDirection::Straight => Location::new(-60.0, 0.0, 0.0),
        TurnDirection::Left => Location::new(distance, -50.0, 0.0),
        TurnDirection::Right => Location::new(distance, 50.0, 0.0),
        TurnDirection::Unknown => Location::new(distance, 0.0, 0.0),
    };
    let mut vehicle = approaching_vehicle(id, lane, distance, speed);
    vehicle.destination = Some(destination);
    vehicle
}

/// A vehicle stopped (or creeping) inside the junction footprint.
///
/// Speed stays below the crossing threshold so the identifier still treats
/// it as a bidder rather than as already committed.
pub fn junction_vehicle(id: &str, lane: &str, speed: f64) -> VehicleState {
    VehicleState {
        id: id.to_string(),
        location: Location::new(2.0, 0.0, 0.0),
        velocity: Velocity::new(-speed, 0.0, 0.0),
        lane: lane.to_string(),
        destination: Some(Location::new(-60.0, 0.0, 0.0)),
        is_junction: true,
    }
}

/// A platoon on the +y axis heading toward the center, leader first.
pub fn approaching_platoon(id: &str, size: usize, leader_distance: f64, speed: f64) -> PlatoonState {
    let vehicles = (0..size)
        .map(|i| VehicleState {
            id: format!("{}_m{}", id, i + 1),
            location: Location::new(0.0, leader_distance + 6.0 * i as f64, 0.0),
            velocity: Velocity::new(0.0, -speed, 0.0),
            lane: "north_in".to_string(),
            destination: Some(Location::new(0.0, -60.0, 0.0)),
            is_junction: false,
        })
        .collect();
    PlatoonState {
        id: id.to_string(),
        vehicles,
        goal_direction: TurnDirection::Straight,
    }
}

/// Engine config with coarse ticks so an auction completes in three cycles
/// (start at 0.0, idle at 0.5, evaluate at 1.0).
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        tick_duration: 0.5,
        ..EngineConfig::default()
    }
}
