//! Aggregate run report, written as `run_report.json`.

use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use tel_core::series::AggregationMethod;
use tel_core::EngineError;

pub const RUN_REPORT_FILE: &str = "run_report.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Detection,
    Validation,
}

/// A unit that could not produce its output batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitFailure {
    pub stage: Stage,
    pub method: AggregationMethod,
    pub definition: u8,
    pub region: String,
    /// Start of the event being validated; absent for detection units.
    pub event_start: Option<NaiveDate>,
    pub kind: &'static str,
    pub message: String,
}

impl UnitFailure {
    pub fn new(
        stage: Stage,
        method: AggregationMethod,
        definition: u8,
        region: &str,
        error: &EngineError,
    ) -> Self {
        UnitFailure {
            stage,
            method,
            definition,
            region: region.to_string(),
            event_start: None,
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn for_event(mut self, start: NaiveDate) -> Self {
        self.event_start = Some(start);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub detection_units: usize,
    pub detection_succeeded: usize,
    pub events_detected: usize,
    pub validation_units: usize,
    pub events_annotated: usize,
    pub failures: Vec<UnitFailure>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
