//! Row structs for the output tables.
//!
//! All structs derive `Serialize` and are written without serde's implicit
//! header so that empty tables still carry their column names.

use serde::Serialize;
use tel_core::event::{AnnotatedEvent, Event};
use tel_core::series::AggregationMethod;
use tel_data::summary::EventSummary;
use tel_utils::dates::format_date;

/// A row type with a fixed column order.
pub trait CsvRow: Serialize {
    const HEADERS: &'static [&'static str];
}

/// One event of an event library file.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventRow {
    pub region: String,
    pub start: String,
    pub end: String,
    pub centroid: String,
    pub extremum: f64,
    pub duration: u32,
}

impl CsvRow for EventRow {
    const HEADERS: &'static [&'static str] =
        &["region", "start", "end", "centroid", "extremum", "duration"];
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        EventRow {
            region: event.region.clone(),
            start: format_date(&event.start),
            end: format_date(&event.end),
            centroid: format_date(&event.centroid),
            extremum: event.extremum,
            duration: event.duration,
        }
    }
}

/// One validated event, with the percentage of counties that passed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoverageRow {
    pub region: String,
    pub start: String,
    pub end: String,
    pub centroid: String,
    pub extremum: f64,
    pub duration: u32,
    pub coverage: f64,
}

impl CsvRow for CoverageRow {
    const HEADERS: &'static [&'static str] = &[
        "region", "start", "end", "centroid", "extremum", "duration", "coverage",
    ];
}

impl From<&AnnotatedEvent> for CoverageRow {
    fn from(annotated: &AnnotatedEvent) -> Self {
        let event = EventRow::from(&annotated.event);
        CoverageRow {
            region: event.region,
            start: event.start,
            end: event.end,
            centroid: event.centroid,
            extremum: event.extremum,
            duration: event.duration,
            coverage: annotated.coverage,
        }
    }
}

/// Events per year for one (method, definition, region).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountRow {
    pub method: AggregationMethod,
    pub definition: u8,
    pub region: String,
    pub year: i32,
    pub events: usize,
}

impl CsvRow for CountRow {
    const HEADERS: &'static [&'static str] = &["method", "definition", "region", "year", "events"];
}

/// Event statistics for one (method, definition, region).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryRow {
    pub method: AggregationMethod,
    pub definition: u8,
    pub region: String,
    pub events: usize,
    pub event_days: u32,
    pub mean_duration: Option<f64>,
    pub max_duration: u32,
    pub most_extreme: Option<f64>,
    pub most_extreme_date: Option<String>,
    pub mean_coverage: Option<f64>,
    /// True if this region holds the most extreme event of the definition
    /// under this method.
    pub record_holder: bool,
}

impl CsvRow for SummaryRow {
    const HEADERS: &'static [&'static str] = &[
        "method",
        "definition",
        "region",
        "events",
        "event_days",
        "mean_duration",
        "max_duration",
        "most_extreme",
        "most_extreme_date",
        "mean_coverage",
        "record_holder",
    ];
}

impl SummaryRow {
    pub fn new(
        method: AggregationMethod,
        definition: u8,
        summary: &EventSummary,
        record_holder: bool,
    ) -> Self {
        SummaryRow {
            method,
            definition,
            region: summary.region.clone(),
            events: summary.events,
            event_days: summary.event_days,
            mean_duration: summary.mean_duration,
            max_duration: summary.max_duration,
            most_extreme: summary.most_extreme,
            most_extreme_date: summary.most_extreme_date.as_ref().map(format_date),
            mean_coverage: summary.mean_coverage,
            record_holder,
        }
    }
}

/// Record-wide thresholds of a fixed or dual-threshold definition.
/// Fixed definitions leave `loose` empty.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FixedThresholdRow {
    pub region: String,
    pub strict: Option<f64>,
    pub loose: Option<f64>,
}

impl CsvRow for FixedThresholdRow {
    const HEADERS: &'static [&'static str] = &["region", "strict", "loose"];
}

/// One calendar day's threshold.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarThresholdRow {
    pub region: String,
    pub day: u32,
    pub threshold: Option<f64>,
}

impl CsvRow for CalendarThresholdRow {
    const HEADERS: &'static [&'static str] = &["region", "day", "threshold"];
}
