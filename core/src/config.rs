use crate::{
    calendar::YearMonth,
    error::{SynthError, SynthResult},
};
use serde::{Deserialize, Serialize};

/// Every knob the generator honours. Percentages are fractions in [0, 1].
///
/// The core trusts these values; call `validate()` at the boundary
/// before handing the config to `PayrollEngine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PayrollConfig {
    /// First month to generate. `None` means the month before "today".
    pub start_month: Option<YearMonth>,
    pub months: u32,
    pub workdays: i32,
    pub overtime_multiplier: f64,
    pub missing_attendance_pct: f64,
    pub duplicate_pct: f64,
    pub ghost_pct: f64,
    pub overtime_abuse_pct: f64,
    pub seed: u64,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            start_month: None,
            months: 1,
            workdays: 22,
            overtime_multiplier: 1.5,
            missing_attendance_pct: 0.05,
            duplicate_pct: 0.03,
            ghost_pct: 0.02,
            overtime_abuse_pct: 0.04,
            seed: 42,
        }
    }
}

impl PayrollConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PayrollConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Compact fixture for tests: fixed start month, no anomalies.
    pub fn default_test() -> Self {
        Self {
            start_month: Some(YearMonth::new(2025, 12)),
            months: 1,
            missing_attendance_pct: 0.0,
            duplicate_pct: 0.0,
            ghost_pct: 0.0,
            overtime_abuse_pct: 0.0,
            ..Self::default()
        }
    }

    /// Caller-side range checks. The synthesis core never calls this.
    pub fn validate(&self) -> SynthResult<()> {
        let pcts = [
            ("missing_attendance_pct", self.missing_attendance_pct),
            ("duplicate_pct", self.duplicate_pct),
            ("ghost_pct", self.ghost_pct),
            ("overtime_abuse_pct", self.overtime_abuse_pct),
        ];
        for (field, value) in pcts {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(SynthError::InvalidConfig {
                    field,
                    reason: format!("{value} is not a fraction in [0, 1]"),
                });
            }
        }
        if self.months == 0 {
            return Err(SynthError::InvalidConfig {
                field: "months",
                reason: "must generate at least one month".into(),
            });
        }
        if let Some(start) = self.start_month {
            if start.plus_months(self.months - 1).is_none() {
                return Err(SynthError::InvalidConfig {
                    field: "months",
                    reason: format!("{} months from {start} runs past 9999-12", self.months),
                });
            }
        }
        if !self.overtime_multiplier.is_finite() || self.overtime_multiplier < 0.0 {
            return Err(SynthError::InvalidConfig {
                field: "overtime_multiplier",
                reason: format!("{} must be finite and >= 0", self.overtime_multiplier),
            });
        }
        Ok(())
    }
}
