//! Roster normalisation: raw employee table to canonical `Employee` rows.
//!
//! RULE: Alternate header spellings are resolved exactly once, here.
//! Nothing downstream of `normalize_roster` ever looks at a header name.

use crate::{
    error::{SynthError, SynthResult},
    types::EmployeeKey,
};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

pub const SALARY_COLUMNS: &[&str] = &["Salary"];
pub const EMPLOYEE_ID_COLUMNS: &[&str] = &["EmployeeID"];
pub const FIRST_NAME_COLUMNS: &[&str] = &["First Name", "FirstName"];
pub const LAST_NAME_COLUMNS: &[&str] = &["Last Name", "LastName"];
pub const DEPARTMENT_COLUMNS: &[&str] = &["Department", "dept"];
pub const JOB_TITLE_COLUMNS: &[&str] = &["Job Title", "JobTitle"];
pub const YEARS_OF_EXPERIENCE_COLUMNS: &[&str] =
    &["Years Of Experience", "YearsOfExperience", "Years Of Experience "];

pub const DEFAULT_DEPARTMENT: &str = "Unknown";
const EMPLOYEE_ID_BASE: usize = 100_000;

/// A canonical roster employee. Immutable for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub key: EmployeeKey,
    pub employee_id: String,
    pub full_name: String,
    pub department: String,
    pub job_title: String,
    /// Monthly base salary; never negative, never NaN.
    pub base_salary: f64,
    pub years_of_experience: f64,
}

impl Employee {
    /// Minimal employee for fixtures: department "Unknown", no tenure.
    pub fn new(key: EmployeeKey, base_salary: f64) -> Self {
        Self {
            key,
            employee_id: format!("E{}_", EMPLOYEE_ID_BASE + (key as usize).saturating_sub(1)),
            full_name: String::new(),
            department: DEFAULT_DEPARTMENT.into(),
            job_title: String::new(),
            base_salary,
            years_of_experience: 0.0,
        }
    }
}

/// A raw table as read from the roster source: header row plus text cells.
#[derive(Debug, Clone, Default)]
pub struct RosterTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Header positions for each canonical field, resolved once per table.
/// Each field takes the first spelling present in the header row.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterSchema {
    salary: usize,
    employee_id: Option<usize>,
    first_name: Option<usize>,
    last_name: Option<usize>,
    department: Option<usize>,
    job_title: Option<usize>,
    /// All present experience columns, in preference order.
    years_of_experience: Vec<usize>,
}

impl RosterSchema {
    pub fn resolve(headers: &[String]) -> SynthResult<Self> {
        let find = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| headers.iter().position(|h| h.as_str() == *name))
        };
        let salary = find(SALARY_COLUMNS).ok_or_else(|| SynthError::MissingColumn {
            column: SALARY_COLUMNS[0].into(),
        })?;
        let years_of_experience = YEARS_OF_EXPERIENCE_COLUMNS
            .iter()
            .filter_map(|name| headers.iter().position(|h| h.as_str() == *name))
            .collect();
        Ok(Self {
            salary,
            employee_id: find(EMPLOYEE_ID_COLUMNS),
            first_name: find(FIRST_NAME_COLUMNS),
            last_name: find(LAST_NAME_COLUMNS),
            department: find(DEPARTMENT_COLUMNS),
            job_title: find(JOB_TITLE_COLUMNS),
            years_of_experience,
        })
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

fn opt_cell(row: &[String], idx: Option<usize>) -> &str {
    idx.map_or("", |i| cell(row, i))
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Map a raw table onto canonical employees, assigning keys 1..=N in row order.
///
/// Fails only when the salary column is absent. Bad salary cells become 0.
pub fn normalize_roster(table: &RosterTable) -> SynthResult<Vec<Employee>> {
    let schema = RosterSchema::resolve(&table.headers)?;
    let mut employees = Vec::with_capacity(table.rows.len());
    let mut coerced = 0usize;

    for (idx, row) in table.rows.iter().enumerate() {
        let key = (idx + 1) as EmployeeKey;

        let raw_salary = cell(row, schema.salary);
        let base_salary = match parse_number(raw_salary) {
            Some(v) if v >= 0.0 => v,
            _ => {
                log::warn!("roster row {key}: salary {raw_salary:?} is not a valid amount, using 0");
                coerced += 1;
                0.0
            }
        };

        let first = opt_cell(row, schema.first_name);
        let last = opt_cell(row, schema.last_name);

        let employee_id = match schema.employee_id {
            Some(i) => cell(row, i).to_string(),
            None => {
                let initials: String = first
                    .chars()
                    .take(1)
                    .chain(last.chars().take(1))
                    .collect::<String>()
                    .to_uppercase();
                format!("E{}_{initials}", EMPLOYEE_ID_BASE + idx)
            }
        };

        let department = match schema.department {
            Some(i) => cell(row, i).to_string(),
            None => DEFAULT_DEPARTMENT.to_string(),
        };

        let years_of_experience = schema
            .years_of_experience
            .iter()
            .find_map(|&i| parse_number(cell(row, i)))
            .unwrap_or(0.0);

        employees.push(Employee {
            key,
            employee_id,
            full_name: format!("{first} {last}").trim().to_string(),
            department,
            job_title: opt_cell(row, schema.job_title).to_string(),
            base_salary,
            years_of_experience,
        });
    }

    if coerced > 0 {
        log::warn!("roster: {coerced} of {} salaries coerced to 0", employees.len());
    }
    log::info!("roster: normalised {} employees", employees.len());
    Ok(employees)
}

/// Read a headed CSV roster from any reader.
pub fn read_roster<R: io::Read>(reader: R) -> SynthResult<RosterTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in rdr.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(RosterTable { headers, rows })
}

/// Load and normalise a CSV roster file.
pub fn load_roster_csv(path: impl AsRef<Path>) -> SynthResult<Vec<Employee>> {
    let file = std::fs::File::open(path)?;
    let table = read_roster(io::BufReader::new(file))?;
    normalize_roster(&table)
}
