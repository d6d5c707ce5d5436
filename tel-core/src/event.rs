use crate::date_range::DateRange;
use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

/// A detected heat wave or cold snap in one region.
///
/// `duration` always equals the number of days from `start` through `end`;
/// the constructors derive it from the span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub region: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// The most extreme day of the event, or the span midpoint once merged.
    pub centroid: NaiveDate,
    /// Most extreme temperature reached during the event.
    pub extremum: f64,
    pub duration: u32,
}

impl Event {
    pub fn new(
        region: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        centroid: NaiveDate,
        extremum: f64,
    ) -> Self {
        let duration = DateRange(start, end).num_days() as u32;
        Self {
            region: region.into(),
            start,
            end,
            centroid,
            extremum,
            duration,
        }
    }

    pub fn window(&self) -> DateRange {
        DateRange(self.start, self.end)
    }

    /// Inclusive overlap: events sharing a single day overlap.
    pub fn overlaps(&self, other: &Event) -> bool {
        self.region == other.region && self.window().overlaps(&other.window())
    }

    /// Calendar year the event starts in.
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Middle day of the span, rounding toward the start for even lengths.
    pub fn midpoint(&self) -> NaiveDate {
        let half = (self.duration.saturating_sub(1) / 2) as i64;
        self.start + TimeDelta::days(half)
    }
}

/// An event paired with the share of its region's counties that
/// independently satisfy the event's criterion over its window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedEvent {
    pub event: Event,
    /// Percentage in [0, 100].
    pub coverage: f64,
}
