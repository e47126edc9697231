//! Anomaly ground truth: row counts, ghosts, duplicate flags, banding.

use chrono::NaiveDate;
use factpayroll_core::{
    calendar::YearMonth,
    config::PayrollConfig,
    duplicates::payment_groups,
    engine::{PayrollEngine, PayrollRun},
    roster::Employee,
    synthesizer::{deduction_rate, EmployeeStatus},
    types::round2,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn roster(n: u32, salary: f64) -> Vec<Employee> {
    (1..=n).map(|k| Employee::new(k, salary)).collect()
}

fn run(config: PayrollConfig, employees: &[Employee]) -> PayrollRun {
    PayrollEngine::new(config).run(employees, today()).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// seed=42, one employee on 6000, nothing injected: exactly one clean row.
#[test]
fn single_employee_scenario() {
    let config = PayrollConfig {
        start_month: Some(YearMonth::new(2025, 12)),
        months: 1,
        workdays: 22,
        missing_attendance_pct: 0.0,
        duplicate_pct: 0.0,
        ghost_pct: 0.0,
        overtime_abuse_pct: 0.0,
        seed: 42,
        ..PayrollConfig::default()
    };
    let out = run(config, &roster(1, 6000.0));

    assert_eq!(out.records.len(), 1);
    let rec = &out.records[0];
    assert!(!rec.is_duplicate_payment);
    assert!((11..=22).contains(&rec.attendance_days), "attendance={}", rec.attendance_days);
    assert!(rec.overtime_hours <= 40.0);
    assert_eq!(rec.base_salary, 6000.0);

    let hourly = 6000.0 / (22.0 * 8.0);
    let overtime_pay = rec.overtime_hours * hourly * 1.5;
    let gross = 6000.0 + overtime_pay;
    assert_eq!(rec.overtime_pay, round2(overtime_pay));
    assert_eq!(rec.gross_salary, round2(gross));
    assert_eq!(rec.deductions, round2(gross * 0.12));
    assert_eq!(rec.net_salary, round2(gross - rec.deductions));
    assert_eq!(rec.payroll_date, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    assert_eq!(rec.period_end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
}

/// ghostPct=1.0 on five employees: zero attendance everywhere, whatever else is set.
#[test]
fn full_ghost_roster_never_attends() {
    let config = PayrollConfig {
        start_month: Some(YearMonth::new(2025, 1)),
        months: 6,
        ghost_pct: 1.0,
        duplicate_pct: 0.2,
        overtime_abuse_pct: 0.5,
        ..PayrollConfig::default()
    };
    let out = run(config, &roster(5, 9000.0));

    assert_eq!(out.ghosts.len(), 5);
    assert_eq!(out.records.len(), 30 + 6);
    assert!(out.records.iter().all(|r| r.attendance_days == 0));
}

#[test]
fn ghosts_have_zero_attendance_every_month() {
    let config = PayrollConfig {
        start_month: Some(YearMonth::new(2024, 11)),
        months: 5,
        ghost_pct: 0.1,
        missing_attendance_pct: 0.0,
        ..PayrollConfig::default()
    };
    let out = run(config, &roster(80, 7500.0));

    assert_eq!(out.ghosts.len(), 8);
    for key in &out.ghosts {
        let rows: Vec<_> = out.records.iter().filter(|r| r.employee_key == *key).collect();
        assert!(rows.len() >= 5, "ghost {key} should appear every month");
        assert!(rows.iter().all(|r| r.attendance_days == 0), "ghost {key} attended");
    }
    // Without missing-attendance events, only ghosts can hit zero.
    assert!(out
        .records
        .iter()
        .filter(|r| !out.ghosts.contains(&r.employee_key))
        .all(|r| r.attendance_days > 0));
}

#[test]
fn row_count_is_base_plus_rounded_duplicates() {
    let config = PayrollConfig {
        start_month: Some(YearMonth::new(2025, 3)),
        months: 3,
        duplicate_pct: 0.03,
        ..PayrollConfig::default()
    };
    let out = run(config, &roster(40, 8000.0));

    // 40 x 3 = 120 base rows, round(3.6) = 4 duplicates.
    assert_eq!(out.summary.base_rows, 120);
    assert_eq!(out.summary.injected_duplicates, 4);
    assert_eq!(out.records.len(), 124);
}

#[test]
fn duplicate_requests_clamp_to_population() {
    let config = PayrollConfig {
        start_month: Some(YearMonth::new(2025, 3)),
        duplicate_pct: 1.0,
        ..PayrollConfig::default()
    };
    let out = run(config, &roster(7, 8000.0));
    assert_eq!(out.records.len(), 14);
    assert!(out.records.iter().all(|r| r.is_duplicate_payment));
}

#[test]
fn duplicate_flag_matches_group_size_exactly() {
    let config = PayrollConfig {
        start_month: Some(YearMonth::new(2025, 6)),
        months: 4,
        duplicate_pct: 0.1,
        ..PayrollConfig::default()
    };
    let out = run(config, &roster(50, 12_000.0));
    let groups = payment_groups(&out.records);

    for rec in &out.records {
        let size = groups[&(rec.employee_key, rec.payroll_month())];
        assert_eq!(
            rec.is_duplicate_payment,
            size > 1,
            "employee {} in {} has group size {size}",
            rec.employee_key,
            rec.payroll_month()
        );
    }
    let flagged = out.records.iter().filter(|r| r.is_duplicate_payment).count();
    assert_eq!(out.summary.duplicate_flagged_rows, flagged);
    // 200 base rows, 20 clones of 20 distinct originals: 20 groups of two.
    assert_eq!(flagged, 40);
}

#[test]
fn payment_references_are_unique() {
    let config = PayrollConfig {
        start_month: Some(YearMonth::new(2025, 6)),
        months: 3,
        duplicate_pct: 0.2,
        ..PayrollConfig::default()
    };
    let out = run(config, &roster(30, 5000.0));
    let mut refs: Vec<_> = out.records.iter().map(|r| r.payment_reference).collect();
    refs.sort();
    refs.dedup();
    assert_eq!(refs.len(), out.records.len());
}

#[test]
fn deductions_follow_base_salary_bands() {
    let salaries = [6_999.99, 7_000.0, 9_999.99, 10_000.0, 13_999.99, 14_000.0];
    let employees: Vec<Employee> = salaries
        .iter()
        .enumerate()
        .map(|(i, &s)| Employee::new(i as u32 + 1, s))
        .collect();
    let out = run(PayrollConfig::default_test(), &employees);

    for rec in &out.records {
        let rate = deduction_rate(rec.base_salary);
        // Gross is rounded in the record; recompute from the unrounded formula.
        let gross = rec.base_salary + rec.overtime_hours * (rec.base_salary / 176.0) * 1.5;
        assert_eq!(rec.deductions, round2(gross * rate), "salary {}", rec.base_salary);
    }
    let rates: Vec<f64> = out.records.iter().map(|r| deduction_rate(r.base_salary)).collect();
    assert_eq!(rates, vec![0.12, 0.15, 0.15, 0.18, 0.18, 0.22]);
}

#[test]
fn overtime_abuse_lands_in_abuse_range() {
    let config = PayrollConfig {
        start_month: Some(YearMonth::new(2025, 1)),
        overtime_abuse_pct: 1.0,
        duplicate_pct: 0.0,
        ..PayrollConfig::default()
    };
    let out = run(config, &roster(100, 6000.0));
    assert!(out.records.iter().all(|r| (41.0..=100.0).contains(&r.overtime_hours)));
    assert_eq!(out.summary.overtime_abuse_rows, 100);
}

#[test]
fn missing_attendance_at_certainty_zeroes_everyone() {
    let config = PayrollConfig {
        start_month: Some(YearMonth::new(2025, 1)),
        missing_attendance_pct: 1.0,
        ..PayrollConfig::default_test()
    };
    let out = run(config, &roster(20, 6000.0));
    assert!(out.ghosts.is_empty());
    assert_eq!(out.summary.zero_attendance_rows, 20);
}

#[test]
fn zero_workdays_means_no_overtime_pay() {
    let config = PayrollConfig {
        workdays: 0,
        ..PayrollConfig::default_test()
    };
    let out = run(config, &roster(10, 6000.0));
    for rec in &out.records {
        assert_eq!(rec.attendance_days, 0);
        assert_eq!(rec.overtime_pay, 0.0);
        assert_eq!(rec.gross_salary, 6000.0);
    }
}

/// Statuses are drawn per record, so one employee can flip between months.
#[test]
fn status_is_mostly_active() {
    let config = PayrollConfig {
        start_month: Some(YearMonth::new(2024, 1)),
        months: 12,
        ..PayrollConfig::default_test()
    };
    let out = run(config, &roster(100, 6000.0));
    let inactive = out
        .records
        .iter()
        .filter(|r| r.employee_status == EmployeeStatus::Inactive)
        .count();
    assert_eq!(out.summary.inactive_rows, inactive);
    assert!(inactive > 0 && inactive < 60, "inactive={inactive} of 1200");
}

#[test]
fn empty_roster_produces_no_rows() {
    let out = run(PayrollConfig::default(), &[]);
    assert!(out.records.is_empty());
    assert!(out.ghosts.is_empty());
}

#[test]
fn default_start_month_is_previous_month() {
    let config = PayrollConfig {
        start_month: None,
        ..PayrollConfig::default_test()
    };
    let out = run(config, &roster(2, 6000.0));
    assert_eq!(out.windows[0].month(), YearMonth::new(2026, 9));
}

#[test]
fn last_supported_month_runs_and_overflow_is_an_error() {
    let config: PayrollConfig =
        serde_json::from_str(r#"{ "start_month": "9999-12", "months": 1 }"#).unwrap();
    assert!(config.validate().is_ok());
    let out = run(config.clone(), &roster(3, 6000.0));
    assert_eq!(out.windows.len(), 1);
    assert!(out.records.iter().all(|r| r.period_end == NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()));

    let past_end = PayrollConfig { months: 2, ..config };
    assert!(PayrollEngine::new(past_end).run(&roster(3, 6000.0), today()).is_err());
}
