//! The payroll engine: runs the generator pipeline end to end.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Month sequencing        (no randomness)
//!   2. Ghost selection         (anomaly stream)
//!   3. Record synthesis        (anomaly stream, month by month, roster order)
//!   4. Duplicate injection     (anomaly stream: selection, then perturbation)
//!   5. Duplicate reconciliation (no randomness)
//!   6. Output ordering          (no randomness)
//!
//! RULES:
//!   - All randomness flows through the RngBank; one anomaly stream per run.
//!   - Payment references come from the reference stream only.
//!   - Every stage reports what it did as a RunEvent.

use crate::{
    anomaly::{select_ghosts, GhostSet},
    calendar::{month_range, MonthWindow},
    config::PayrollConfig,
    duplicates::{inject_duplicates, payment_groups, reconcile_duplicates},
    error::SynthResult,
    event::{EventLogEntry, RunEvent},
    output::sort_for_output,
    rng::{PayrollRng, RngBank, StreamSlot},
    roster::Employee,
    summary::AnomalySummary,
    synthesizer::{PayrollRecord, PayrollSynthesizer},
};
use chrono::NaiveDate;

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollRun {
    pub windows: Vec<MonthWindow>,
    pub ghosts: GhostSet,
    /// Final fact rows, in output order.
    pub records: Vec<PayrollRecord>,
    pub events: Vec<RunEvent>,
    pub summary: AnomalySummary,
}

impl PayrollRun {
    /// Event log rows ready for persistence, numbered in emission order.
    pub fn event_log(&self, run_id: &str) -> SynthResult<Vec<EventLogEntry>> {
        self.events
            .iter()
            .enumerate()
            .map(|(seq, event)| {
                Ok(EventLogEntry {
                    id:         None,
                    run_id:     run_id.to_string(),
                    seq:        seq as u32,
                    stage:      event.stage().to_string(),
                    event_type: event.type_name().to_string(),
                    payload:    serde_json::to_string(event)?,
                })
            })
            .collect()
    }
}

pub struct PayrollEngine {
    pub config:   PayrollConfig,
    pub rng_bank: RngBank,
}

impl PayrollEngine {
    pub fn new(config: PayrollConfig) -> Self {
        Self {
            rng_bank: RngBank::new(config.seed),
            config,
        }
    }

    /// Run the whole pipeline. `today` only matters when no start month is
    /// configured. Each call starts from fresh streams, so repeated calls
    /// return identical runs.
    pub fn run(&self, employees: &[Employee], today: NaiveDate) -> SynthResult<PayrollRun> {
        let mut rng = self.rng_bank.for_stream(StreamSlot::Anomaly);
        let mut refs = self.rng_bank.for_stream(StreamSlot::Reference);
        self.run_with_streams(employees, today, &mut rng, &mut refs)
    }

    /// Run the pipeline on caller-supplied streams.
    pub fn run_with_streams(
        &self,
        employees: &[Employee],
        today: NaiveDate,
        rng: &mut PayrollRng,
        refs: &mut PayrollRng,
    ) -> SynthResult<PayrollRun> {
        let cfg = &self.config;
        let windows = month_range(cfg.start_month, cfg.months, today)?;
        let mut events = vec![RunEvent::RunInitialized {
            seed: self.rng_bank.master_seed(),
            employees: employees.len(),
            months: windows.len(),
        }];
        log::info!(
            "engine: {} employees x {} months, seed {}",
            employees.len(),
            windows.len(),
            self.rng_bank.master_seed()
        );

        let ghosts = select_ghosts(employees, cfg.ghost_pct, rng);
        events.push(RunEvent::GhostsSelected {
            keys: ghosts.iter().copied().collect(),
        });

        let synthesizer = PayrollSynthesizer::new(cfg, &ghosts);
        let mut records = Vec::with_capacity(employees.len() * windows.len());
        for window in &windows {
            let month = synthesizer.synthesize_month(employees, window, rng, refs);
            log::info!("engine: synthesized {} rows for {}", month.len(), window.month());
            events.push(RunEvent::MonthSynthesized {
                month: window.month(),
                rows: month.len(),
            });
            records.extend(month);
        }

        let base_rows = records.len();
        let injected = inject_duplicates(&mut records, cfg.duplicate_pct, rng, refs);
        events.push(RunEvent::DuplicatesInjected {
            base_rows,
            duplicates: injected,
        });

        let mut records = reconcile_duplicates(&records);
        events.push(RunEvent::DuplicatesReconciled {
            groups: payment_groups(&records).values().filter(|&&n| n > 1).count(),
            flagged_rows: records.iter().filter(|r| r.is_duplicate_payment).count(),
        });

        sort_for_output(&mut records);
        let summary = AnomalySummary::from_records(&records, &ghosts, injected);
        events.push(RunEvent::RunCompleted { rows: records.len() });

        Ok(PayrollRun {
            windows,
            ghosts,
            records,
            events,
            summary,
        })
    }
}
