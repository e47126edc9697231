//! Output assembly: fact table ordering and CSV emission.

use crate::{error::SynthResult, synthesizer::PayrollRecord};
use std::io;
use std::path::Path;

/// Fact table column order. Matches `PayrollRecord`'s serialised field order.
pub const FACT_COLUMNS: [&str; 18] = [
    "EmployeeKey",
    "EmployeeID",
    "FullName",
    "Employee_Status",
    "Department",
    "JobTitle",
    "PayrollDate",
    "PayPeriodStart",
    "PayPeriodEnd",
    "BaseSalary",
    "Attendance_Days",
    "Overtime_Hours",
    "Overtime_Pay",
    "Gross_Salary",
    "Deductions",
    "Net_Salary",
    "PaymentReference",
    "IsDuplicatePayment",
];

/// Stable sort by (payroll date, department, employee key). A record and its
/// duplicates keep their relative order.
pub fn sort_for_output(records: &mut [PayrollRecord]) {
    records.sort_by(|a, b| {
        a.payroll_date
            .cmp(&b.payroll_date)
            .then_with(|| a.department.cmp(&b.department))
            .then_with(|| a.employee_key.cmp(&b.employee_key))
    });
}

/// Write a header row plus one row per record.
pub fn write_csv<W: io::Write>(writer: W, records: &[PayrollRecord]) -> SynthResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        wtr.write_record(FACT_COLUMNS)?;
    }
    for rec in records {
        wtr.serialize(rec)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_file(path: impl AsRef<Path>, records: &[PayrollRecord]) -> SynthResult<()> {
    let file = std::fs::File::create(path)?;
    write_csv(io::BufWriter::new(file), records)
}
