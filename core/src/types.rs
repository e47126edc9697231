//! Shared primitive types used across the entire generator.

/// Dense surrogate key assigned to each roster employee, starting at 1.
pub type EmployeeKey = u32;

/// The canonical run identifier.
pub type RunId = String;

/// Round a money or hours value to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
