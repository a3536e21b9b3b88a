//! Tests for participant identification: platoon claiming, lane leaders,
//! crossing exclusion and destination requirements.

mod common;

use common::{approaching_platoon, approaching_vehicle, center, junction_vehicle};
use intersection_auction_core_rs::{
    IdentifierConfig, ParticipantIdentifier, TurnDirection, VehicleState,
};

fn identifier() -> ParticipantIdentifier {
    ParticipantIdentifier::new(IdentifierConfig::default())
}

#[test]
fn test_platoon_members_not_double_counted() {
    let platoon = approaching_platoon("platoon_1", 3, 20.0, 5.0);
    // Report members standalone as well, as the state layer does.
    let vehicles: Vec<VehicleState> = platoon.vehicles.clone();

    let agents = identifier().identify(&center(), &vehicles, &[platoon.clone()]);

    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].id(), "platoon_1");
    assert!(agents[0].is_platoon());
    assert_eq!(agents[0].size(), 3);
}

#[test]
fn test_single_member_platoon_not_eligible() {
    let mut platoon = approaching_platoon("platoon_1", 1, 20.0, 5.0);
    platoon.goal_direction = TurnDirection::Left;
    let vehicles = platoon.vehicles.clone();

    let agents = identifier().identify(&center(), &vehicles, &[platoon]);

    // The lone member competes as a standalone vehicle instead.
    assert_eq!(agents.len(), 1);
    assert!(!agents[0].is_platoon());
    assert_eq!(agents[0].id(), "platoon_1_m1");
}

#[test]
fn test_distant_platoon_excluded() {
    let platoon = approaching_platoon("platoon_far", 3, 150.0, 5.0);
    let agents = identifier().identify(&center(), &[], &[platoon]);
    assert!(agents.is_empty());
}

#[test]
fn test_one_lane_leader_per_lane() {
    let vehicles = vec![
        approaching_vehicle("east_far", "east_in", 30.0, 5.0),
        approaching_vehicle("east_near", "east_in", 10.0, 5.0),
        approaching_vehicle("north_only", "north_in", 25.0, 5.0),
    ];

    let agents = identifier().identify(&center(), &vehicles, &[]);

    let ids: Vec<&str> = agents.iter().map(|a| a.id()).collect();
    assert_eq!(ids, vec!["east_near", "north_only"]);
}

#[test]
fn test_actively_crossing_leader_blocks_lane() {
    // Closest vehicle is inside the junction and moving: committed, not a
    // bidder. The lane yields no candidate at all this cycle.
    let vehicles = vec![
        junction_vehicle("crossing", "east_in", 4.0),
        approaching_vehicle("behind", "east_in", 20.0, 5.0),
    ];

    let agents = identifier().identify(&center(), &vehicles, &[]);
    assert!(agents.is_empty());
}

#[test]
fn test_slow_junction_vehicle_still_bids() {
    // Inside the footprint but creeping below the crossing threshold: it
    // has not committed and must compete for the right to proceed.
    let vehicles = vec![junction_vehicle("creeper", "east_in", 0.5)];
    let agents = identifier().identify(&center(), &vehicles, &[]);
    assert_eq!(agents.len(), 1);
    assert!(agents[0].at_junction());
}

#[test]
fn test_vehicle_without_destination_dropped() {
    let mut vehicle = approaching_vehicle("aimless", "east_in", 10.0, 5.0);
    vehicle.destination = None;
    let agents = identifier().identify(&center(), &[vehicle], &[]);
    assert!(agents.is_empty());
}

#[test]
fn test_stationary_vehicle_gets_unknown_direction() {
    let mut vehicle = approaching_vehicle("parked", "east_in", 10.0, 5.0);
    vehicle.velocity = intersection_auction_core_rs::Velocity::new(0.0, 0.0, 0.0);
    let agents = identifier().identify(&center(), &[vehicle], &[]);
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].direction(), TurnDirection::Unknown);
}

#[test]
fn test_custom_eligibility_radius() {
    let identifier = ParticipantIdentifier::new(IdentifierConfig {
        eligibility_radius: 15.0,
        ..IdentifierConfig::default()
    });
    let vehicles = vec![approaching_vehicle("outside", "east_in", 20.0, 5.0)];
    assert!(identifier.identify(&center(), &vehicles, &[]).is_empty());
}
