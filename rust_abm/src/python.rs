//! Python bindings via [PyO3](https://pyo3.rs), enabled with the `python`
//! feature.

use std::collections::HashMap;

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

use crate::config::Config;
use crate::run_simulation as run;
use crate::state::TickRecord;

/// Aggregate statistics for a single simulation tick.
///
/// All fields are read-only from Python.
#[pyclass(get_all)]
#[derive(Clone, Debug)]
pub struct PyTickRecord {
    pub tick: u64,
    pub population: usize,
    pub homes: usize,
    pub for_sale: usize,
    pub sales: usize,
    pub average_price: f64,
    pub total_score: f64,
    pub total_profit: f64,
    pub occupancy_pct: f64,
}

impl From<TickRecord> for PyTickRecord {
    fn from(r: TickRecord) -> Self {
        PyTickRecord {
            tick: r.tick,
            population: r.population,
            homes: r.homes,
            for_sale: r.for_sale,
            sales: r.sales,
            average_price: r.average_price,
            total_score: r.total_score,
            total_profit: r.total_profit,
            occupancy_pct: r.occupancy_pct,
        }
    }
}

#[pymethods]
impl PyTickRecord {
    fn __repr__(&self) -> String {
        format!(
            "PyTickRecord(tick={}, sales={}, average_price={:.0}, for_sale={})",
            self.tick, self.sales, self.average_price, self.for_sale
        )
    }

    /// Convert to a plain Python dict for easy interop with pandas / polars.
    fn to_dict(&self) -> HashMap<String, f64> {
        let mut m = HashMap::new();
        m.insert("tick".to_string(), self.tick as f64);
        m.insert("population".to_string(), self.population as f64);
        m.insert("homes".to_string(), self.homes as f64);
        m.insert("for_sale".to_string(), self.for_sale as f64);
        m.insert("sales".to_string(), self.sales as f64);
        m.insert("average_price".to_string(), self.average_price);
        m.insert("total_score".to_string(), self.total_score);
        m.insert("total_profit".to_string(), self.total_profit);
        m.insert("occupancy_pct".to_string(), self.occupancy_pct);
        m
    }
}

/// Run a housing market simulation and return per-tick statistics.
///
/// Args:
///     ticks: Number of ticks to run.
///     seed: Random seed for reproducibility.
#[pyfunction]
#[pyo3(signature = (ticks=85, seed=1))]
fn run_simulation(ticks: usize, seed: u64) -> PyResult<Vec<PyTickRecord>> {
    let config = Config {
        ticks,
        seed,
        ..Config::default()
    };
    let output = run(config).map_err(|e| PyRuntimeError::new_err(e.to_string()))?;

    Ok(output.ticks.into_iter().map(PyTickRecord::from).collect())
}

/// Rust-backed housing market simulation.
#[pymodule]
fn housing_abm(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTickRecord>()?;
    m.add_function(wrap_pyfunction!(run_simulation, m)?)?;
    Ok(())
}
