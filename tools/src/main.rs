//! payroll-gen: synthetic FactPayroll generator.
//!
//! Usage:
//!   payroll-gen --input zenvy_hr_payroll_data.csv --output FactPayroll.csv \
//!     --start-month 2025-12 --months 1 --workdays 22 --overtime-multiplier 1.5 \
//!     --missing-attendance-pct 0.05 --duplicate-pct 0.03 --ghost-pct 0.02 \
//!     --overtime-abuse-pct 0.04 --seed 42
//!   payroll-gen --input roster.csv --config payroll.json --db run.db

use anyhow::{bail, Result};
use factpayroll_core::{
    config::PayrollConfig,
    engine::{PayrollEngine, PayrollRun},
    output::write_csv_file,
    roster::load_roster_csv,
    store::PayrollStore,
    summary::AnomalySummary,
};
use std::env;

#[derive(serde::Serialize)]
struct RunReport<'a> {
    run_id: &'a str,
    input: &'a str,
    output: &'a str,
    config: &'a PayrollConfig,
    months: Vec<String>,
    summary: &'a AnomalySummary,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(input) = flag_value(&args, "--input") else {
        bail!("--input <roster.csv> is required");
    };
    let output = flag_value(&args, "--output").unwrap_or("FactPayroll.csv");
    let db = flag_value(&args, "--db");

    let config = build_config(&args)?;
    config.validate()?;

    let employees = load_roster_csv(input)?;
    let engine = PayrollEngine::new(config);
    let today = chrono::Local::now().date_naive();
    let run = engine.run(&employees, today)?;

    write_csv_file(output, &run.records)?;

    let started_at = epoch_secs();
    let run_id = format!("run-{}-{started_at}", engine.config.seed);
    if let Some(db) = db {
        let store = PayrollStore::open(db)?;
        store.migrate()?;
        store.save_run(&run_id, engine.config.seed, env!("CARGO_PKG_VERSION"), started_at, &run)?;
        log::info!("persisted {run_id} to {db}");
    }

    println!(
        "Generated {} payroll rows across {} month(s) -> {output}",
        run.records.len(),
        engine.config.months
    );
    print_summary(&run, &run_id, input, output, &engine.config)?;
    Ok(())
}

/// Defaults, then the optional JSON file, then individual flags.
fn build_config(args: &[String]) -> Result<PayrollConfig> {
    let mut config = match flag_value(args, "--config") {
        Some(path) => PayrollConfig::load(path)?,
        None => PayrollConfig::default(),
    };
    if let Some(month) = flag_value(args, "--start-month") {
        config.start_month = Some(month.parse()?);
    }
    config.months = parse_arg(args, "--months", config.months)?;
    config.workdays = parse_arg(args, "--workdays", config.workdays)?;
    config.overtime_multiplier = parse_arg(args, "--overtime-multiplier", config.overtime_multiplier)?;
    config.missing_attendance_pct =
        parse_arg(args, "--missing-attendance-pct", config.missing_attendance_pct)?;
    config.duplicate_pct = parse_arg(args, "--duplicate-pct", config.duplicate_pct)?;
    config.ghost_pct = parse_arg(args, "--ghost-pct", config.ghost_pct)?;
    config.overtime_abuse_pct = parse_arg(args, "--overtime-abuse-pct", config.overtime_abuse_pct)?;
    config.seed = parse_arg(args, "--seed", config.seed)?;
    Ok(config)
}

fn print_summary(
    run: &PayrollRun,
    run_id: &str,
    input: &str,
    output: &str,
    config: &PayrollConfig,
) -> Result<()> {
    let report = RunReport {
        run_id,
        input,
        output,
        config,
        months: run.windows.iter().map(|w| w.month().to_string()).collect(),
        summary: &run.summary,
    };
    println!();
    println!("=== ANOMALY SUMMARY ===");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// The flag's parsed value, `current` when absent, an error when unparseable.
fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, current: T) -> Result<T> {
    match flag_value(args, flag) {
        Some(raw) => match raw.parse() {
            Ok(value) => Ok(value),
            Err(_) => bail!("invalid {flag} value {raw:?}"),
        },
        None => Ok(current),
    }
}

fn epoch_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
