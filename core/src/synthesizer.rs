//! Payroll record synthesis: one record per (employee, month).
//!
//! Draw order per record, from the anomaly stream (never reordered):
//!   1. attendance factor (normal)
//!   2. missing-attendance event (Bernoulli)
//!   3. overtime band roll, then the band's own draw
//!   4. overtime-abuse event (Bernoulli), then its draw when it fires
//!   5. status (Bernoulli)
//!
//! Ghost membership overrides attendance without consuming a draw.
//! Payment references come from the separate reference stream.

use crate::{
    anomaly::GhostSet,
    calendar::{MonthWindow, YearMonth},
    config::PayrollConfig,
    rng::PayrollRng,
    roster::Employee,
    types::{round2, EmployeeKey},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Model constants ──────────────────────────────────────────────────────────

const ATTENDANCE_MEAN: f64 = 0.95;
const ATTENDANCE_TENURE_SLOPE: f64 = 0.002; // per year of experience
const ATTENDANCE_TENURE_CAP: f64 = 0.02;
const ATTENDANCE_STD_DEV: f64 = 0.06;
const ATTENDANCE_FLOOR: f64 = 0.5;
const ATTENDANCE_CEIL: f64 = 1.0;

const OVERTIME_LOW_BAND: f64 = 0.70;
const OVERTIME_MID_BAND: f64 = 0.95; // cumulative
const OVERTIME_LOW_MEAN: f64 = 1.0;
const OVERTIME_MID_RANGE: (u32, u32) = (6, 20);
const OVERTIME_HIGH_RANGE: (u32, u32) = (21, 40);
const OVERTIME_ABUSE_RANGE: (u32, u32) = (41, 100);

const HOURS_PER_WORKDAY: i32 = 8;
const INACTIVE_PROBABILITY: f64 = 0.02;

/// Highest overtime the banded draw can produce; anything above
/// came from the abuse event.
pub const MAX_REGULAR_OVERTIME_HOURS: f64 = OVERTIME_HIGH_RANGE.1 as f64;

// ── Record ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

/// One physical payment. Serialised field names and order are the fact
/// table's column layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRecord {
    #[serde(rename = "EmployeeKey")]
    pub employee_key: EmployeeKey,
    #[serde(rename = "EmployeeID")]
    pub employee_id: String,
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "Employee_Status")]
    pub employee_status: EmployeeStatus,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "JobTitle")]
    pub job_title: String,
    #[serde(rename = "PayrollDate")]
    pub payroll_date: NaiveDate,
    #[serde(rename = "PayPeriodStart")]
    pub period_start: NaiveDate,
    #[serde(rename = "PayPeriodEnd")]
    pub period_end: NaiveDate,
    #[serde(rename = "BaseSalary")]
    pub base_salary: f64,
    #[serde(rename = "Attendance_Days")]
    pub attendance_days: u32,
    #[serde(rename = "Overtime_Hours")]
    pub overtime_hours: f64,
    #[serde(rename = "Overtime_Pay")]
    pub overtime_pay: f64,
    #[serde(rename = "Gross_Salary")]
    pub gross_salary: f64,
    #[serde(rename = "Deductions")]
    pub deductions: f64,
    #[serde(rename = "Net_Salary")]
    pub net_salary: f64,
    #[serde(rename = "PaymentReference")]
    pub payment_reference: Uuid,
    #[serde(rename = "IsDuplicatePayment")]
    pub is_duplicate_payment: bool,
}

impl PayrollRecord {
    /// The calendar month this payment belongs to.
    pub fn payroll_month(&self) -> YearMonth {
        YearMonth::containing(self.payroll_date)
    }
}

// ── Pay formulas ─────────────────────────────────────────────────────────────

/// Deduction rate by base salary band. Each boundary belongs to the higher band.
pub fn deduction_rate(base_salary: f64) -> f64 {
    if base_salary < 7_000.0 {
        0.12
    } else if base_salary < 10_000.0 {
        0.15
    } else if base_salary < 14_000.0 {
        0.18
    } else {
        0.22
    }
}

/// Base salary spread over `workdays * 8` hours; 0 when there are no workdays.
pub fn hourly_rate(base_salary: f64, workdays: i32) -> f64 {
    let monthly_hours = workdays.saturating_mul(HOURS_PER_WORKDAY);
    if monthly_hours <= 0 {
        0.0
    } else {
        base_salary / f64::from(monthly_hours)
    }
}

/// Pay components derived from base salary and overtime. Overtime pay and
/// gross stay unrounded; callers round them for output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayBreakdown {
    pub overtime_pay: f64,
    pub gross_salary: f64,
    pub deductions: f64,
    pub net_salary: f64,
}

impl PayBreakdown {
    /// Deductions and net are rounded to cents from the unrounded gross.
    /// Net may go negative; nothing here clamps it.
    pub fn compute(base_salary: f64, overtime_hours: f64, workdays: i32, multiplier: f64) -> Self {
        let overtime_pay = overtime_hours * hourly_rate(base_salary, workdays) * multiplier;
        let gross_salary = base_salary + overtime_pay;
        let deductions = round2(gross_salary * deduction_rate(base_salary));
        let net_salary = round2(gross_salary - deductions);
        Self {
            overtime_pay,
            gross_salary,
            deductions,
            net_salary,
        }
    }
}

// ── Draws ────────────────────────────────────────────────────────────────────

/// Attendance days before ghost/missing overrides.
pub fn draw_attendance(workdays: i32, years_of_experience: f64, rng: &mut PayrollRng) -> u32 {
    let mean = ATTENDANCE_MEAN + ATTENDANCE_TENURE_CAP.min(years_of_experience * ATTENDANCE_TENURE_SLOPE);
    let factor = rng
        .normal(mean, ATTENDANCE_STD_DEV)
        .clamp(ATTENDANCE_FLOOR, ATTENDANCE_CEIL);
    (f64::from(workdays.max(0)) * factor).round() as u32
}

/// Long-tailed monthly overtime: 70% Poisson(1), 25% 6..=20, 5% 21..=40.
pub fn draw_overtime_hours(rng: &mut PayrollRng) -> u32 {
    let roll = rng.next_f64();
    if roll < OVERTIME_LOW_BAND {
        rng.poisson(OVERTIME_LOW_MEAN)
    } else if roll < OVERTIME_MID_BAND {
        rng.uniform_inclusive(OVERTIME_MID_RANGE.0, OVERTIME_MID_RANGE.1)
    } else {
        rng.uniform_inclusive(OVERTIME_HIGH_RANGE.0, OVERTIME_HIGH_RANGE.1)
    }
}

pub fn draw_status(rng: &mut PayrollRng) -> EmployeeStatus {
    if rng.chance(INACTIVE_PROBABILITY) {
        EmployeeStatus::Inactive
    } else {
        EmployeeStatus::Active
    }
}

// ── Synthesizer ──────────────────────────────────────────────────────────────

pub struct PayrollSynthesizer<'a> {
    config: &'a PayrollConfig,
    ghosts: &'a GhostSet,
}

impl<'a> PayrollSynthesizer<'a> {
    pub fn new(config: &'a PayrollConfig, ghosts: &'a GhostSet) -> Self {
        Self { config, ghosts }
    }

    /// Synthesize one employee's payment for one month.
    pub fn record_for(
        &self,
        employee: &Employee,
        window: &MonthWindow,
        rng: &mut PayrollRng,
        refs: &mut PayrollRng,
    ) -> PayrollRecord {
        let cfg = self.config;

        let mut attendance_days = draw_attendance(cfg.workdays, employee.years_of_experience, rng);
        if self.ghosts.contains(&employee.key) {
            attendance_days = 0;
        }
        if rng.chance(cfg.missing_attendance_pct) {
            attendance_days = 0;
        }

        let mut overtime_hours = draw_overtime_hours(rng);
        if rng.chance(cfg.overtime_abuse_pct) {
            overtime_hours = rng.uniform_inclusive(OVERTIME_ABUSE_RANGE.0, OVERTIME_ABUSE_RANGE.1);
        }
        let overtime_hours = f64::from(overtime_hours);

        let pay = PayBreakdown::compute(
            employee.base_salary,
            overtime_hours,
            cfg.workdays,
            cfg.overtime_multiplier,
        );
        let employee_status = draw_status(rng);

        PayrollRecord {
            employee_key: employee.key,
            employee_id: employee.employee_id.clone(),
            full_name: employee.full_name.clone(),
            employee_status,
            department: employee.department.clone(),
            job_title: employee.job_title.clone(),
            payroll_date: window.payroll_date,
            period_start: window.period_start,
            period_end: window.period_end,
            base_salary: round2(employee.base_salary),
            attendance_days,
            overtime_hours: round2(overtime_hours),
            overtime_pay: round2(pay.overtime_pay),
            gross_salary: round2(pay.gross_salary),
            deductions: pay.deductions,
            net_salary: pay.net_salary,
            payment_reference: refs.uuid_v4(),
            is_duplicate_payment: false,
        }
    }

    /// One record per employee for `window`, in roster order.
    pub fn synthesize_month(
        &self,
        employees: &[Employee],
        window: &MonthWindow,
        rng: &mut PayrollRng,
        refs: &mut PayrollRng,
    ) -> Vec<PayrollRecord> {
        employees
            .iter()
            .map(|emp| self.record_for(emp, window, rng, refs))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::YearMonth;

    #[test]
    fn deduction_boundaries_take_higher_band() {
        assert_eq!(deduction_rate(0.0), 0.12);
        assert_eq!(deduction_rate(6_999.99), 0.12);
        assert_eq!(deduction_rate(7_000.0), 0.15);
        assert_eq!(deduction_rate(9_999.99), 0.15);
        assert_eq!(deduction_rate(10_000.0), 0.18);
        assert_eq!(deduction_rate(13_999.99), 0.18);
        assert_eq!(deduction_rate(14_000.0), 0.22);
        assert_eq!(deduction_rate(250_000.0), 0.22);
    }

    #[test]
    fn hourly_rate_guards_zero_workdays() {
        assert_eq!(hourly_rate(8800.0, 22), 50.0);
        assert_eq!(hourly_rate(8800.0, 0), 0.0);
        assert_eq!(hourly_rate(8800.0, -3), 0.0);
    }

    #[test]
    fn pay_breakdown_formula() {
        // 8800 / 176 = 50/h, 10h * 50 * 1.5 = 750
        let pay = PayBreakdown::compute(8800.0, 10.0, 22, 1.5);
        assert_eq!(pay.overtime_pay, 750.0);
        assert_eq!(pay.gross_salary, 9550.0);
        assert_eq!(pay.deductions, round2(9550.0 * 0.15));
        assert_eq!(pay.net_salary, round2(9550.0 - pay.deductions));
    }

    #[test]
    fn deduction_uses_base_not_gross() {
        // Gross crosses 7000 but base does not: stays at 12%.
        let pay = PayBreakdown::compute(6900.0, 40.0, 22, 1.5);
        assert!(pay.gross_salary > 7000.0);
        assert_eq!(pay.deductions, round2(pay.gross_salary * 0.12));
    }

    #[test]
    fn attendance_stays_within_workdays() {
        let mut rng = PayrollRng::new(1, 0);
        for _ in 0..5000 {
            let days = draw_attendance(22, 30.0, &mut rng);
            assert!((11..=22).contains(&days), "days={days}");
        }
        assert_eq!(draw_attendance(0, 0.0, &mut rng), 0);
        assert_eq!(draw_attendance(-5, 0.0, &mut rng), 0);
    }

    #[test]
    fn overtime_bands_have_expected_shares() {
        let mut rng = PayrollRng::new(2, 0);
        let n = 20_000;
        let hours: Vec<u32> = (0..n).map(|_| draw_overtime_hours(&mut rng)).collect();
        assert!(hours.iter().all(|&h| h <= 40));
        let high = hours.iter().filter(|&&h| h >= 21).count() as f64 / n as f64;
        assert!((high - 0.05).abs() < 0.01, "high share={high}");
    }

    #[test]
    fn ghost_forces_zero_attendance() {
        let config = PayrollConfig::default_test();
        let ghosts: GhostSet = [1].into_iter().collect();
        let synth = PayrollSynthesizer::new(&config, &ghosts);
        let window = MonthWindow::for_month(YearMonth::new(2025, 12));
        let mut rng = PayrollRng::new(42, 0);
        let mut refs = PayrollRng::new(42, 1);
        for _ in 0..50 {
            let rec = synth.record_for(&Employee::new(1, 6000.0), &window, &mut rng, &mut refs);
            assert_eq!(rec.attendance_days, 0);
        }
    }

    #[test]
    fn record_copies_window_and_identity() {
        let config = PayrollConfig::default_test();
        let ghosts = GhostSet::new();
        let synth = PayrollSynthesizer::new(&config, &ghosts);
        let window = MonthWindow::for_month(YearMonth::new(2024, 2));
        let mut rng = PayrollRng::new(42, 0);
        let mut refs = PayrollRng::new(42, 1);
        let mut emp = Employee::new(7, 12_345.678);
        emp.department = "Finance".into();
        let rec = synth.record_for(&emp, &window, &mut rng, &mut refs);
        assert_eq!(rec.employee_key, 7);
        assert_eq!(rec.department, "Finance");
        assert_eq!(rec.payroll_date, window.payroll_date);
        assert_eq!(rec.period_end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(rec.base_salary, 12_345.68);
        assert!(!rec.is_duplicate_payment);
        assert_eq!(rec.payroll_month(), YearMonth::new(2024, 2));
    }
}
