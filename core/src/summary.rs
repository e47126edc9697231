//! Anomaly summary: ground-truth counts for a finished run.
//!
//! Downstream detectors are scored against these numbers, so every count
//! is derived from the final record set rather than tracked during synthesis.

use crate::{
    anomaly::GhostSet,
    synthesizer::{EmployeeStatus, PayrollRecord, MAX_REGULAR_OVERTIME_HOURS},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub total_rows: usize,
    pub base_rows: usize,
    pub injected_duplicates: usize,
    pub duplicate_flagged_rows: usize,
    pub ghost_employees: usize,
    pub zero_attendance_rows: usize,
    pub overtime_abuse_rows: usize,
    pub inactive_rows: usize,
    pub negative_net_rows: usize,
}

impl AnomalySummary {
    pub fn from_records(records: &[PayrollRecord], ghosts: &GhostSet, injected: usize) -> Self {
        let mut summary = Self {
            total_rows: records.len(),
            base_rows: records.len().saturating_sub(injected),
            injected_duplicates: injected,
            ghost_employees: ghosts.len(),
            ..Self::default()
        };
        for r in records {
            summary.duplicate_flagged_rows += usize::from(r.is_duplicate_payment);
            summary.zero_attendance_rows += usize::from(r.attendance_days == 0);
            summary.overtime_abuse_rows += usize::from(r.overtime_hours > MAX_REGULAR_OVERTIME_HOURS);
            summary.inactive_rows += usize::from(r.employee_status == EmployeeStatus::Inactive);
            summary.negative_net_rows += usize::from(r.net_salary < 0.0);
        }
        summary
    }
}
