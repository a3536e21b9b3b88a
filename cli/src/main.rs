//! Synthetic intersection scenario runner.
//!
//! Drives the auction engine without a simulator attached: four approach
//! lanes, a handful of vehicles with fixed kinematics, and one platoon.
//! Vehicles move toward the intersection every cycle; the priority order
//! and statistics are printed once per simulated time unit.
//!
//! Usage: intersection-auction-sim [CYCLES]

use intersection_auction_core_rs::{
    AuctionEngine, EngineConfig, Location, PlatoonState, TurnDirection, VehicleState, Velocity,
};

/// A scripted vehicle: spawn point, constant velocity, lane and goal.
struct ScriptedVehicle {
    id: &'static str,
    lane: &'static str,
    start: Location,
    velocity: Velocity,
    destination: Location,
}

fn scripted_fleet() -> Vec<ScriptedVehicle> {
    vec![
        // Eastbound pair approaching from the west
        ScriptedVehicle {
            id: "veh_e1",
            lane: "west_in",
            start: Location::new(-40.0, 0.0, 0.0),
            velocity: Velocity::new(5.0, 0.0, 0.0),
            destination: Location::new(60.0, 0.0, 0.0),
        },
        ScriptedVehicle {
            id: "veh_e2",
            lane: "west_in",
            start: Location::new(-55.0, 0.0, 0.0),
            velocity: Velocity::new(5.0, 0.0, 0.0),
            destination: Location::new(60.0, 0.0, 0.0),
        },
        // Westbound vehicle turning to its right (toward +y)
        ScriptedVehicle {
            id: "veh_w1",
            lane: "east_in",
            start: Location::new(45.0, 0.0, 0.0),
            velocity: Velocity::new(-6.0, 0.0, 0.0),
            destination: Location::new(0.0, 55.0, 0.0),
        },
        // Northbound vehicle going straight
        ScriptedVehicle {
            id: "veh_n1",
            lane: "south_in",
            start: Location::new(0.0, -50.0, 0.0),
            velocity: Velocity::new(0.0, 4.0, 0.0),
            destination: Location::new(0.0, 60.0, 0.0),
        },
    ]
}

fn platoon_members(t: f64) -> Vec<VehicleState> {
    // Southbound three-vehicle platoon, leader first.
    (0..3)
        .map(|i| {
            let gap = 6.0 * i as f64;
            let y = 48.0 + gap - 5.0 * t;
            VehicleState {
                id: format!("veh_p{}", i + 1),
                location: Location::new(0.0, y, 0.0),
                velocity: Velocity::new(0.0, -5.0, 0.0),
                lane: "north_in".to_string(),
                destination: Some(Location::new(0.0, -60.0, 0.0)),
                is_junction: y.abs() < 15.0,
            }
        })
        .collect()
}

fn main() {
    let cycles: u64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(100);

    let config = EngineConfig::default();
    let radius = config.geometry.radius;
    let mut engine = match AuctionEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("engine setup failed: {}", e);
            std::process::exit(1);
        }
    };

    let fleet = scripted_fleet();
    println!(
        "engine {} | {} scripted vehicles + 1 platoon | {} cycles",
        engine.engine_id(),
        fleet.len(),
        cycles
    );

    for _ in 0..cycles {
        let t = engine.current_time();

        let vehicles: Vec<VehicleState> = fleet
            .iter()
            .map(|s| {
                let location = Location::new(
                    s.start.x + s.velocity.x * t,
                    s.start.y + s.velocity.y * t,
                    0.0,
                );
                let in_junction =
                    location.distance_xy(&Location::new(0.0, 0.0, 0.0)) < radius;
                VehicleState {
                    id: s.id.to_string(),
                    location,
                    velocity: s.velocity,
                    lane: s.lane.to_string(),
                    destination: Some(s.destination),
                    is_junction: in_junction,
                }
            })
            .collect();

        let platoons = vec![PlatoonState {
            id: "platoon_1".to_string(),
            vehicles: platoon_members(t),
            goal_direction: TurnDirection::Straight,
        }];

        let order = engine.update(&vehicles, &platoons);

        // Report once per simulated time unit.
        let cycles_per_unit = (1.0 / engine.config().tick_duration).round() as u64;
        if engine.current_tick() % cycles_per_unit == 1 && !order.is_empty() {
            println!("t={:5.1} priority order:", t);
            for winner in order.iter().take(5) {
                println!(
                    "  #{} {:10} bid={:7.1} dir={:8} action={}",
                    winner.rank(),
                    winner.agent().id(),
                    winner.bid().value(),
                    winner.agent().direction().to_string(),
                    winner.action()
                );
            }
        }
    }

    let stats = engine.auction_stats();
    println!(
        "done: {} auctions completed, {} protected agents, {} live messages, \
         {} rejected bids, {} defaulted bids",
        stats.completed_auctions,
        stats.protected_agents,
        stats.message_queue_depth,
        stats.rejected_bids,
        stats.defaulted_bids
    );
}
