//! Run events: an ordered record of what each pipeline stage did.
//!
//! RULE: Every stage reports through events; the event log of two runs
//! with the same seed, roster and config must be identical.

use crate::{calendar::YearMonth, types::{EmployeeKey, RunId}};
use serde::{Deserialize, Serialize};

/// Every event emitted during a run.
/// Variants may be added, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    RunInitialized {
        seed: u64,
        employees: usize,
        months: usize,
    },
    GhostsSelected {
        keys: Vec<EmployeeKey>,
    },
    MonthSynthesized {
        month: YearMonth,
        rows: usize,
    },
    DuplicatesInjected {
        base_rows: usize,
        duplicates: usize,
    },
    DuplicatesReconciled {
        groups: usize,
        flagged_rows: usize,
    },
    RunCompleted {
        rows: usize,
    },
}

impl RunEvent {
    /// Stable string name, used for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            RunEvent::RunInitialized { .. }       => "run_initialized",
            RunEvent::GhostsSelected { .. }       => "ghosts_selected",
            RunEvent::MonthSynthesized { .. }     => "month_synthesized",
            RunEvent::DuplicatesInjected { .. }   => "duplicates_injected",
            RunEvent::DuplicatesReconciled { .. } => "duplicates_reconciled",
            RunEvent::RunCompleted { .. }         => "run_completed",
        }
    }

    /// The pipeline stage that emits this event.
    pub fn stage(&self) -> &'static str {
        match self {
            RunEvent::RunInitialized { .. } | RunEvent::RunCompleted { .. } => "engine",
            RunEvent::GhostsSelected { .. } => "anomaly",
            RunEvent::MonthSynthesized { .. } => "synthesizer",
            RunEvent::DuplicatesInjected { .. } | RunEvent::DuplicatesReconciled { .. } => "duplicates",
        }
    }
}

/// A persisted event log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub seq:        u32,
    pub stage:      String,
    pub event_type: String,
    pub payload:    String, // JSON
}
