//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine and the runner call store methods; they never execute SQL directly.

use rusqlite::{params, Connection};
use crate::{
    engine::PayrollRun,
    error::SynthResult,
    event::EventLogEntry,
    synthesizer::{EmployeeStatus, PayrollRecord},
};

pub struct PayrollStore {
    conn: Connection,
}

impl PayrollStore {
    /// Open (or create) the payroll database at `path`.
    pub fn open(path: &str) -> SynthResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SynthResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SynthResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_fact_payroll.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str, started_at: i64) -> SynthResult<()> {
        insert_run_row(&self.conn, run_id, seed, version, started_at)
    }

    /// Persist a finished run: run row, event log, then fact rows.
    /// All or nothing: a failure at any step leaves no trace of the run.
    pub fn save_run(
        &self,
        run_id: &str,
        seed: u64,
        version: &str,
        started_at: i64,
        run: &PayrollRun,
    ) -> SynthResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        insert_run_row(&tx, run_id, seed, version, started_at)?;
        for entry in run.event_log(run_id)? {
            insert_event_row(&tx, &entry)?;
        }
        insert_record_rows(&tx, run_id, &run.records)?;
        tx.commit()?;
        log::debug!("store: saved {run_id} with {} fact rows", run.records.len());
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SynthResult<()> {
        insert_event_row(&self.conn, entry)
    }

    pub fn events_for_run(&self, run_id: &str) -> SynthResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, seq, stage, event_type, payload
             FROM event_log WHERE run_id = ?1
             ORDER BY seq ASC, id ASC"
        )?;
        let entries = stmt.query_map(params![run_id], |row| {
            Ok(EventLogEntry {
                id:         Some(row.get(0)?),
                run_id:     row.get(1)?,
                seq:        row.get(2)?,
                stage:      row.get(3)?,
                event_type: row.get(4)?,
                payload:    row.get(5)?,
            })
        })?.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ── Fact payroll ───────────────────────────────────────────

    /// Insert every record in a single transaction.
    pub fn insert_records(&self, run_id: &str, records: &[PayrollRecord]) -> SynthResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        insert_record_rows(&tx, run_id, records)?;
        tx.commit()?;
        log::debug!("store: persisted {} fact rows for {run_id}", records.len());
        Ok(())
    }

    pub fn record_count(&self, run_id: &str) -> SynthResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM fact_payroll WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    pub fn flagged_duplicate_count(&self, run_id: &str) -> SynthResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM fact_payroll WHERE run_id = ?1 AND is_duplicate_payment = 1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// Number of (employee, payroll month) groups holding more than one payment.
    pub fn duplicate_group_count(&self, run_id: &str) -> SynthResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM (
                SELECT employee_key, substr(payroll_date, 1, 7) AS payroll_month
                FROM fact_payroll WHERE run_id = ?1
                GROUP BY employee_key, payroll_month
                HAVING COUNT(*) > 1
             )",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// Employees with zero attendance in every one of their rows.
    pub fn ghost_signature_employees(&self, run_id: &str) -> SynthResult<Vec<u32>> {
        let mut stmt = self.conn.prepare(
            "SELECT employee_key FROM fact_payroll WHERE run_id = ?1
             GROUP BY employee_key
             HAVING MAX(attendance_days) = 0
             ORDER BY employee_key ASC"
        )?;
        let keys = stmt
            .query_map(params![run_id], |row| row.get(0))?
            .collect::<Result<Vec<u32>, _>>()?;
        Ok(keys)
    }
}

fn insert_run_row(
    conn: &Connection,
    run_id: &str,
    seed: u64,
    version: &str,
    started_at: i64,
) -> SynthResult<()> {
    conn.execute(
        "INSERT INTO run (run_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
        params![run_id, seed as i64, version, started_at],
    )?;
    Ok(())
}

fn insert_event_row(conn: &Connection, entry: &EventLogEntry) -> SynthResult<()> {
    conn.execute(
        "INSERT INTO event_log (run_id, seq, stage, event_type, payload)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![entry.run_id, entry.seq, entry.stage, entry.event_type, entry.payload],
    )?;
    Ok(())
}

fn insert_record_rows(conn: &Connection, run_id: &str, records: &[PayrollRecord]) -> SynthResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO fact_payroll (
            run_id, employee_key, employee_id, full_name, employee_status,
            department, job_title, payroll_date, period_start, period_end,
            base_salary, attendance_days, overtime_hours, overtime_pay,
            gross_salary, deductions, net_salary, payment_reference,
            is_duplicate_payment
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                   ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
    )?;
    for r in records {
        stmt.execute(params![
            run_id,
            r.employee_key,
            r.employee_id,
            r.full_name,
            status_str(r.employee_status),
            r.department,
            r.job_title,
            r.payroll_date.to_string(),
            r.period_start.to_string(),
            r.period_end.to_string(),
            r.base_salary,
            r.attendance_days,
            r.overtime_hours,
            r.overtime_pay,
            r.gross_salary,
            r.deductions,
            r.net_salary,
            r.payment_reference.to_string(),
            r.is_duplicate_payment,
        ])?;
    }
    Ok(())
}

fn status_str(status: EmployeeStatus) -> &'static str {
    match status {
        EmployeeStatus::Active => "Active",
        EmployeeStatus::Inactive => "Inactive",
    }
}
