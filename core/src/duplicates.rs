//! Duplicate payments: injection of extra payments, then an independent
//! reconciliation pass that derives the duplicate flag from the data.
//!
//! Design:
//!   - Injection clones `round(rows * duplicate_pct)` records chosen without
//!     replacement. Each clone gets a fresh reference and a net salary nudged
//!     by N(0, 5), rounded to cents. Gross, deductions and overtime are left
//!     as they were, so a clone's net no longer equals gross - deductions.
//!   - Reconciliation groups by (employee, payroll month). Any group with
//!     more than one record has every member flagged. Flags only go
//!     false -> true, so the pass is idempotent.

use crate::{
    anomaly::anomaly_count,
    calendar::YearMonth,
    rng::PayrollRng,
    synthesizer::PayrollRecord,
    types::{round2, EmployeeKey},
};
use std::collections::BTreeMap;

const CORRECTION_STD_DEV: f64 = 5.0;

/// Grouping key for duplicate detection.
pub type PaymentGroup = (EmployeeKey, YearMonth);

/// Append duplicate payments to `records`. Returns the number of clones added.
///
/// All selection draws happen before any perturbation draw.
pub fn inject_duplicates(
    records: &mut Vec<PayrollRecord>,
    duplicate_pct: f64,
    rng: &mut PayrollRng,
    refs: &mut PayrollRng,
) -> usize {
    let count = anomaly_count(records.len(), duplicate_pct);
    if count == 0 {
        return 0;
    }
    let picked = rng.sample_indices(records.len(), count);

    let mut clones: Vec<PayrollRecord> = picked.iter().map(|&i| records[i].clone()).collect();
    for clone in &mut clones {
        clone.payment_reference = refs.uuid_v4();
    }
    for clone in &mut clones {
        clone.net_salary = round2(clone.net_salary + round2(rng.normal(0.0, CORRECTION_STD_DEV)));
        clone.is_duplicate_payment = true;
    }

    log::info!("duplicates: injected {} extra payments over {} rows", clones.len(), records.len());
    records.extend(clones);
    count
}

/// Record count per (employee, payroll month).
pub fn payment_groups(records: &[PayrollRecord]) -> BTreeMap<PaymentGroup, usize> {
    let mut groups = BTreeMap::new();
    for rec in records {
        *groups.entry((rec.employee_key, rec.payroll_month())).or_insert(0) += 1;
    }
    groups
}

/// Return a copy of `records` with every member of a multi-record group
/// flagged as a duplicate payment. Existing flags are never cleared.
pub fn reconcile_duplicates(records: &[PayrollRecord]) -> Vec<PayrollRecord> {
    let groups = payment_groups(records);
    let mut newly_flagged = 0usize;
    let reconciled = records
        .iter()
        .map(|rec| {
            let shared = groups
                .get(&(rec.employee_key, rec.payroll_month()))
                .is_some_and(|&n| n > 1);
            let mut out = rec.clone();
            if shared && !out.is_duplicate_payment {
                out.is_duplicate_payment = true;
                newly_flagged += 1;
            }
            out
        })
        .collect();
    log::info!("duplicates: reconciliation flagged {newly_flagged} additional rows");
    reconciled
}
