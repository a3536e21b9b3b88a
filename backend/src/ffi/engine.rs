//! PyO3 wrapper for the auction engine.
//!
//! This is the entry point for the Python simulation loop that drives the
//! engine at a fixed cadence.

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::types::{
    parse_engine_config, parse_platoons, parse_vehicles, stats_to_py, winners_to_py,
};
use crate::orchestrator::AuctionEngine as RustEngine;
use crate::policy::TrainableBidPolicy;

/// Python wrapper for the Rust auction engine.
///
/// # Example (from Python)
///
/// ```python
/// from intersection_auction_core_rs import AuctionEngine
///
/// engine = AuctionEngine.new({
///     "intersection_center": (-188.9, -89.7, 0.0),
///     "auction_interval": 2.0,
///     "policy": "baseline",
/// })
///
/// for _ in range(steps):
///     vehicles = state_extractor.get_vehicle_states()
///     platoons = platoon_manager.get_all_platoons()
///     order = engine.update(vehicles, platoons)
///     for winner in order[:3]:
///         print(winner["rank"], winner["id"], winner["action"])
/// ```
#[pyclass(name = "AuctionEngine")]
pub struct PyAuctionEngine {
    inner: RustEngine,
}

#[pymethods]
impl PyAuctionEngine {
    /// Create a new engine from a configuration dict.
    ///
    /// Every key is optional; omitted keys use engine defaults. Raises
    /// `RuntimeError` for configurations the engine cannot run with and
    /// `ValueError` for malformed fields.
    #[staticmethod]
    fn new(config: &Bound<'_, PyDict>) -> PyResult<Self> {
        let rust_config = parse_engine_config(config)?;

        let inner = RustEngine::new(rust_config).map_err(|e| {
            PyRuntimeError::new_err(format!("failed to create auction engine: {}", e))
        })?;

        Ok(PyAuctionEngine { inner })
    }

    /// Run one engine cycle.
    ///
    /// # Arguments
    ///
    /// * `vehicles` - list of vehicle record dicts:
    ///   `{id, location, velocity, lane, destination, is_junction}`
    /// * `platoons` - list of platoon record dicts:
    ///   `{id, vehicles, goal_direction}`
    ///
    /// # Returns
    ///
    /// The current priority order as a list of winner dicts:
    /// `{id, type, size, direction, at_junction, bid_value, rank, action}`
    fn update(
        &mut self,
        py: Python<'_>,
        vehicles: &Bound<'_, PyList>,
        platoons: &Bound<'_, PyList>,
    ) -> PyResult<Py<PyList>> {
        let vehicle_states = parse_vehicles(vehicles)?;
        let platoon_states = parse_platoons(platoons)?;

        let order = self.inner.update(&vehicle_states, &platoon_states);
        winners_to_py(py, &order)
    }

    /// The current priority order without advancing the engine.
    fn current_priority_order(&self, py: Python<'_>) -> PyResult<Py<PyList>> {
        winners_to_py(py, &self.inner.current_priority_order())
    }

    /// Statistics snapshot as a dict.
    fn auction_stats(&self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        stats_to_py(py, &self.inner.auction_stats())
    }

    /// Current simulation time in time units.
    fn current_time(&self) -> f64 {
        self.inner.current_time()
    }

    /// Cycles executed so far.
    fn current_tick(&self) -> u64 {
        self.inner.current_tick()
    }

    /// Unique id of this engine run.
    fn engine_id(&self) -> String {
        self.inner.engine_id().to_string()
    }

    /// Update trainable policy parameters between episodes.
    ///
    /// Accepts any subset of: `bid_scale`, `urgency_weight`, `speed_weight`,
    /// `platoon_bonus`, `junction_penalty`, `urgency_threshold`. Values are
    /// clamped to their documented ranges.
    ///
    /// Returns `False` when the engine runs a non-trainable policy.
    fn update_trainable_params(&mut self, params: &Bound<'_, PyDict>) -> PyResult<bool> {
        let policy = match self
            .inner
            .policy_mut()
            .as_any_mut()
            .downcast_mut::<TrainableBidPolicy>()
        {
            Some(p) => p,
            None => return Ok(false),
        };

        let mut updated = *policy.params();
        let fields: [(&str, &mut f64); 6] = [
            ("bid_scale", &mut updated.bid_scale),
            ("urgency_weight", &mut updated.urgency_weight),
            ("speed_weight", &mut updated.speed_weight),
            ("platoon_bonus", &mut updated.platoon_bonus),
            ("junction_penalty", &mut updated.junction_penalty),
            ("urgency_threshold", &mut updated.urgency_threshold),
        ];
        for (key, slot) in fields {
            if let Some(value) = params.get_item(key)? {
                *slot = value.extract::<f64>()?;
            }
        }

        policy.update_params(updated);
        Ok(true)
    }
}
