//! Anomaly selection: run-wide choices made before any per-row draw.

use crate::{roster::Employee, rng::PayrollRng, types::EmployeeKey};
use std::collections::BTreeSet;

/// Employees forced to zero attendance in every month of the run.
pub type GhostSet = BTreeSet<EmployeeKey>;

/// `round(n * pct)`, clamped to `n`.
pub fn anomaly_count(population: usize, pct: f64) -> usize {
    let raw = (population as f64 * pct).round();
    if raw.is_nan() || raw <= 0.0 {
        0
    } else {
        (raw as usize).min(population)
    }
}

/// Pick the ghost employees for the run, without replacement.
///
/// Consumes no randomness when the ghost count rounds to zero.
pub fn select_ghosts(employees: &[Employee], ghost_pct: f64, rng: &mut PayrollRng) -> GhostSet {
    let count = anomaly_count(employees.len(), ghost_pct);
    if count == 0 {
        return GhostSet::new();
    }
    let ghosts: GhostSet = rng
        .sample_indices(employees.len(), count)
        .into_iter()
        .map(|i| employees[i].key)
        .collect();
    log::info!("anomaly: selected {} ghost employees of {}", ghosts.len(), employees.len());
    ghosts
}
