//! The twelve event definitions.
//!
//! Each definition is a fixed statistical rule: a direction, the daily
//! statistic it inspects, one or two quantile levels, a minimum run length,
//! and the run-finding algorithm family that applies them. This registry is
//! the single source of truth for definition parameters; other crates look
//! definitions up by id rather than restating them.

use crate::error::{EngineError, Result};
use crate::series::{Direction, Statistic};
use serde::Serialize;
use std::fmt;

/// Half width of the calendar-day window pooled for rolling thresholds:
/// 7 days either side of the target day, 15 days in total.
pub const ROLLING_HALF_WINDOW: usize = 7;

/// Minimum run length for fixed-threshold runs.
pub const FIXED_MIN_RUN: usize = 2;

/// Minimum segment length for dual-threshold segments and calendar-day runs.
pub const SEGMENT_MIN_RUN: usize = 3;

/// The run-finding algorithm a definition uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Family {
    /// Single fixed threshold, maximal runs.
    A,
    /// Dual fixed thresholds, greedy growable segments merged on overlap.
    B,
    /// Calendar-day rolling threshold, maximal runs.
    C,
}

/// Quantile levels of a definition, shaped by its family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Criterion {
    Fixed { quantile: f64 },
    Growable { strict: f64, loose: f64 },
    Calendar { quantile: f64 },
}

/// A named event-detection rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Definition {
    pub id: u8,
    pub name: &'static str,
    pub direction: Direction,
    pub statistic: Statistic,
    pub criterion: Criterion,
    /// Shortest run, in days, that counts as an event.
    pub min_run: usize,
}

impl Definition {
    pub fn family(&self) -> Family {
        match self.criterion {
            Criterion::Fixed { .. } => Family::A,
            Criterion::Growable { .. } => Family::B,
            Criterion::Calendar { .. } => Family::C,
        }
    }

    /// Quantile levels in the order they are reported (strict first).
    pub fn quantiles(&self) -> Vec<f64> {
        match self.criterion {
            Criterion::Fixed { quantile } | Criterion::Calendar { quantile } => vec![quantile],
            Criterion::Growable { strict, loose } => vec![strict, loose],
        }
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def{:02} ({})", self.id, self.name)
    }
}

/// All definitions, ordered by id. Ids 1-8 describe heat waves and 9-12
/// cold snaps.
pub static DEFINITIONS: &[Definition] = &[
    Definition {
        id: 1,
        name: "mean temperature above 90th percentile",
        direction: Direction::Heat,
        statistic: Statistic::Mean,
        criterion: Criterion::Fixed { quantile: 0.90 },
        min_run: FIXED_MIN_RUN,
    },
    Definition {
        id: 2,
        name: "mean temperature above 95th percentile",
        direction: Direction::Heat,
        statistic: Statistic::Mean,
        criterion: Criterion::Fixed { quantile: 0.95 },
        min_run: FIXED_MIN_RUN,
    },
    Definition {
        id: 3,
        name: "mean temperature above 98th percentile",
        direction: Direction::Heat,
        statistic: Statistic::Mean,
        criterion: Criterion::Fixed { quantile: 0.98 },
        min_run: FIXED_MIN_RUN,
    },
    Definition {
        id: 4,
        name: "maximum temperature above 95th percentile",
        direction: Direction::Heat,
        statistic: Statistic::Max,
        criterion: Criterion::Fixed { quantile: 0.95 },
        min_run: FIXED_MIN_RUN,
    },
    Definition {
        id: 5,
        name: "minimum temperature above 95th percentile",
        direction: Direction::Heat,
        statistic: Statistic::Min,
        criterion: Criterion::Fixed { quantile: 0.95 },
        min_run: FIXED_MIN_RUN,
    },
    Definition {
        id: 6,
        name: "maximum temperature 97.5th/81st percentile segments",
        direction: Direction::Heat,
        statistic: Statistic::Max,
        criterion: Criterion::Growable {
            strict: 0.975,
            loose: 0.81,
        },
        min_run: SEGMENT_MIN_RUN,
    },
    Definition {
        id: 7,
        name: "minimum temperature 97.5th/81st percentile segments",
        direction: Direction::Heat,
        statistic: Statistic::Min,
        criterion: Criterion::Growable {
            strict: 0.975,
            loose: 0.81,
        },
        min_run: SEGMENT_MIN_RUN,
    },
    Definition {
        id: 8,
        name: "maximum temperature above calendar-day 90th percentile",
        direction: Direction::Heat,
        statistic: Statistic::Max,
        criterion: Criterion::Calendar { quantile: 0.90 },
        min_run: SEGMENT_MIN_RUN,
    },
    Definition {
        id: 9,
        name: "mean temperature below 5th percentile",
        direction: Direction::Cold,
        statistic: Statistic::Mean,
        criterion: Criterion::Fixed { quantile: 0.05 },
        min_run: FIXED_MIN_RUN,
    },
    Definition {
        id: 10,
        name: "minimum temperature 2.5th/19th percentile segments",
        direction: Direction::Cold,
        statistic: Statistic::Min,
        criterion: Criterion::Growable {
            strict: 0.025,
            loose: 0.19,
        },
        min_run: SEGMENT_MIN_RUN,
    },
    Definition {
        id: 11,
        name: "maximum temperature 2.5th/19th percentile segments",
        direction: Direction::Cold,
        statistic: Statistic::Max,
        criterion: Criterion::Growable {
            strict: 0.025,
            loose: 0.19,
        },
        min_run: SEGMENT_MIN_RUN,
    },
    Definition {
        id: 12,
        name: "minimum temperature below calendar-day 10th percentile",
        direction: Direction::Cold,
        statistic: Statistic::Min,
        criterion: Criterion::Calendar { quantile: 0.10 },
        min_run: SEGMENT_MIN_RUN,
    },
];

/// Look up a registered definition by id.
pub fn definition(id: u8) -> Result<&'static Definition> {
    DEFINITIONS
        .iter()
        .find(|d| d.id == id)
        .ok_or(EngineError::UnknownDefinition(id))
}
