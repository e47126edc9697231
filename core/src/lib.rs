//! Synthetic monthly payroll fact tables with controlled anomalies
//! (ghost employees, duplicate payments, missing attendance, overtime abuse).

pub mod anomaly;
pub mod calendar;
pub mod config;
pub mod duplicates;
pub mod engine;
pub mod error;
pub mod event;
pub mod output;
pub mod rng;
pub mod roster;
pub mod store;
pub mod summary;
pub mod synthesizer;
pub mod types;
