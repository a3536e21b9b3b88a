//! Conversions between Python dicts/lists and engine types.
//!
//! Parsing is strict about shapes (a malformed vehicle record raises
//! `ValueError` naming the field) but lenient about optional configuration:
//! any config key left out falls back to the engine default.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::conflict::ConflictAction;
use crate::models::auction::Winner;
use crate::models::vehicle::{Location, PlatoonState, TurnDirection, VehicleState, Velocity};
use crate::orchestrator::{AuctionStats, EngineConfig, PolicyKind};

// ============================================================================
// Dict access helpers
// ============================================================================

fn required<'py, T: FromPyObject<'py>>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<T> {
    match dict.get_item(key)? {
        Some(value) => value
            .extract::<T>()
            .map_err(|e| PyValueError::new_err(format!("field '{}': {}", key, e))),
        None => Err(PyValueError::new_err(format!(
            "missing required field '{}'",
            key
        ))),
    }
}

fn optional<'py, T: FromPyObject<'py>>(
    dict: &Bound<'py, PyDict>,
    key: &str,
) -> PyResult<Option<T>> {
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => value
            .extract::<T>()
            .map(Some)
            .map_err(|e| PyValueError::new_err(format!("field '{}': {}", key, e))),
        _ => Ok(None),
    }
}

fn with_default<'py, T: FromPyObject<'py>>(
    dict: &Bound<'py, PyDict>,
    key: &str,
    default: T,
) -> PyResult<T> {
    Ok(optional(dict, key)?.unwrap_or(default))
}

// ============================================================================
// Input parsing
// ============================================================================

fn location_from_tuple(t: (f64, f64, f64)) -> Location {
    Location::new(t.0, t.1, t.2)
}

fn direction_from_str(s: &str) -> PyResult<TurnDirection> {
    match s {
        "left" => Ok(TurnDirection::Left),
        "straight" => Ok(TurnDirection::Straight),
        "right" => Ok(TurnDirection::Right),
        "unknown" => Ok(TurnDirection::Unknown),
        other => Err(PyValueError::new_err(format!(
            "unknown direction '{}' (expected left/straight/right/unknown)",
            other
        ))),
    }
}

/// Parse the engine configuration dict. Every key is optional.
pub fn parse_engine_config(config: &Bound<'_, PyDict>) -> PyResult<EngineConfig> {
    let defaults = EngineConfig::default();

    let mut parsed = EngineConfig {
        auction_interval: with_default(config, "auction_interval", defaults.auction_interval)?,
        bidding_window: with_default(config, "bidding_window", defaults.bidding_window)?,
        message_validity_window: with_default(
            config,
            "message_validity_window",
            defaults.message_validity_window,
        )?,
        conflict_top_k: with_default(config, "conflict_top_k", defaults.conflict_top_k)?,
        tick_duration: with_default(config, "tick_duration", defaults.tick_duration)?,
        transit_timeout: with_default(config, "transit_timeout", defaults.transit_timeout)?,
        fallback_bid: with_default(config, "fallback_bid", defaults.fallback_bid)?,
        ..defaults
    };

    if let Some(center) = optional::<(f64, f64, f64)>(config, "intersection_center")? {
        parsed.geometry.center = location_from_tuple(center);
    }
    parsed.geometry.radius =
        with_default(config, "intersection_radius", parsed.geometry.radius)?;
    parsed.identifier.eligibility_radius = with_default(
        config,
        "eligibility_radius",
        parsed.identifier.eligibility_radius,
    )?;
    parsed.identifier.min_crossing_speed = with_default(
        config,
        "min_crossing_speed",
        parsed.identifier.min_crossing_speed,
    )?;

    if let Some(policy) = optional::<String>(config, "policy")? {
        parsed.policy = match policy.as_str() {
            "baseline" => PolicyKind::Baseline,
            "trainable" => PolicyKind::Trainable,
            other => {
                return Err(PyValueError::new_err(format!(
                    "unknown policy '{}' (expected baseline/trainable)",
                    other
                )))
            }
        };
    }

    Ok(parsed)
}

/// Parse one vehicle record dict.
pub fn parse_vehicle(dict: &Bound<'_, PyDict>) -> PyResult<VehicleState> {
    let location: (f64, f64, f64) = required(dict, "location")?;
    let velocity: (f64, f64, f64) = required(dict, "velocity")?;
    let destination: Option<(f64, f64, f64)> = optional(dict, "destination")?;

    Ok(VehicleState {
        id: required(dict, "id")?,
        location: location_from_tuple(location),
        velocity: Velocity::new(velocity.0, velocity.1, velocity.2),
        lane: required(dict, "lane")?,
        destination: destination.map(location_from_tuple),
        is_junction: with_default(dict, "is_junction", false)?,
    })
}

/// Parse the per-cycle vehicle list.
pub fn parse_vehicles(list: &Bound<'_, PyList>) -> PyResult<Vec<VehicleState>> {
    list.iter()
        .map(|item| {
            let dict = item.downcast::<PyDict>().map_err(|_| {
                PyValueError::new_err("vehicle records must be dicts")
            })?;
            parse_vehicle(dict)
        })
        .collect()
}

/// Parse one platoon record dict.
pub fn parse_platoon(dict: &Bound<'_, PyDict>) -> PyResult<PlatoonState> {
    let vehicles_list: Bound<'_, PyList> = required(dict, "vehicles")?;
    let goal: String = with_default(dict, "goal_direction", "unknown".to_string())?;

    Ok(PlatoonState {
        id: required(dict, "id")?,
        vehicles: parse_vehicles(&vehicles_list)?,
        goal_direction: direction_from_str(&goal)?,
    })
}

/// Parse the per-cycle platoon list.
pub fn parse_platoons(list: &Bound<'_, PyList>) -> PyResult<Vec<PlatoonState>> {
    list.iter()
        .map(|item| {
            let dict = item.downcast::<PyDict>().map_err(|_| {
                PyValueError::new_err("platoon records must be dicts")
            })?;
            parse_platoon(dict)
        })
        .collect()
}

// ============================================================================
// Output conversion
// ============================================================================

/// Convert one winner entry to a Python dict.
pub fn winner_to_py(py: Python<'_>, winner: &Winner) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    let agent = winner.agent();
    dict.set_item("id", agent.id())?;
    dict.set_item("type", if agent.is_platoon() { "platoon" } else { "vehicle" })?;
    dict.set_item("size", agent.size())?;
    dict.set_item("direction", agent.direction().to_string())?;
    dict.set_item("at_junction", agent.at_junction())?;
    dict.set_item("bid_value", winner.bid().value())?;
    dict.set_item("rank", winner.rank())?;
    dict.set_item(
        "action",
        match winner.action() {
            ConflictAction::Go => "go",
            ConflictAction::Wait => "wait",
        },
    )?;
    Ok(dict.into())
}

/// Convert a full priority order to a Python list of dicts.
pub fn winners_to_py(py: Python<'_>, winners: &[Winner]) -> PyResult<Py<PyList>> {
    let list = PyList::empty_bound(py);
    for winner in winners {
        list.append(winner_to_py(py, winner)?)?;
    }
    Ok(list.into())
}

/// Convert a statistics snapshot to a Python dict.
pub fn stats_to_py(py: Python<'_>, stats: &AuctionStats) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("active_auctions", stats.active_auctions)?;
    dict.set_item(
        "auction_status",
        stats.auction_status.map(|s| s.to_string()),
    )?;
    dict.set_item("current_agents", stats.current_agents)?;
    dict.set_item("platoon_agents", stats.platoon_agents)?;
    dict.set_item("vehicle_agents", stats.vehicle_agents)?;
    dict.set_item("in_junction_agents", stats.in_junction_agents)?;
    dict.set_item("approaching_agents", stats.approaching_agents)?;
    dict.set_item("go_count", stats.go_count)?;
    dict.set_item("wait_count", stats.wait_count)?;
    dict.set_item("completed_auctions", stats.completed_auctions)?;
    dict.set_item("protected_agents", stats.protected_agents)?;
    dict.set_item("message_queue_depth", stats.message_queue_depth)?;
    dict.set_item("rejected_bids", stats.rejected_bids)?;
    dict.set_item("defaulted_bids", stats.defaulted_bids)?;
    Ok(dict.into())
}
