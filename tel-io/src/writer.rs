//! CSV writers for event libraries and run tables.

use crate::models::{CalendarThresholdRow, CoverageRow, CsvRow, EventRow, FixedThresholdRow};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tel_core::event::{AnnotatedEvent, Event};
use tel_core::series::AggregationMethod;
use tel_data::threshold::ThresholdProfile;

pub const EVENT_COUNTS_FILE: &str = "event_counts.csv";
pub const EVENT_SUMMARY_FILE: &str = "event_summary.csv";

/// `events_<method>_defNN.csv` inside `dir`.
pub fn events_path(dir: &Path, method: AggregationMethod, definition: u8) -> PathBuf {
    dir.join(format!("events_{}_def{:02}.csv", method.as_str(), definition))
}

/// `coverage_<method>_defNN.csv` inside `dir`.
pub fn coverage_path(dir: &Path, method: AggregationMethod, definition: u8) -> PathBuf {
    dir.join(format!("coverage_{}_def{:02}.csv", method.as_str(), definition))
}

/// Write `rows` under their header. The header is written even when there
/// are no rows.
pub fn write_rows<T: CsvRow>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(T::HEADERS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    log::debug!("writer: Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_events(path: &Path, events: &[Event]) -> anyhow::Result<()> {
    let rows: Vec<EventRow> = events.iter().map(EventRow::from).collect();
    write_rows(path, &rows)
}

pub fn write_coverage(path: &Path, annotated: &[AnnotatedEvent]) -> anyhow::Result<()> {
    let rows: Vec<CoverageRow> = annotated.iter().map(CoverageRow::from).collect();
    write_rows(path, &rows)
}

/// Write one definition's threshold profiles, one or more rows per region.
///
/// Calendar profiles produce `region,day,threshold` rows for all 366 days;
/// fixed and dual profiles produce `region,strict,loose` rows.
pub fn write_thresholds(
    path: &Path,
    profiles: &[(String, ThresholdProfile)],
) -> anyhow::Result<()> {
    let is_calendar = profiles
        .iter()
        .any(|(_, profile)| matches!(profile, ThresholdProfile::Calendar(_)));
    if is_calendar {
        let rows: Vec<CalendarThresholdRow> = profiles
            .iter()
            .filter_map(|(region, profile)| match profile {
                ThresholdProfile::Calendar(calendar) => Some((region, calendar)),
                _ => None,
            })
            .flat_map(|(region, calendar)| {
                calendar
                    .days()
                    .iter()
                    .enumerate()
                    .map(move |(slot, threshold)| CalendarThresholdRow {
                        region: region.clone(),
                        day: slot as u32 + 1,
                        threshold: *threshold,
                    })
            })
            .collect();
        write_rows(path, &rows)
    } else {
        let rows: Vec<FixedThresholdRow> = profiles
            .iter()
            .filter_map(|(region, profile)| {
                let (strict, loose) = match profile {
                    ThresholdProfile::Fixed(threshold) => (*threshold, None),
                    ThresholdProfile::Dual { strict, loose } => (*strict, *loose),
                    ThresholdProfile::Calendar(_) => return None,
                };
                Some(FixedThresholdRow {
                    region: region.clone(),
                    strict,
                    loose,
                })
            })
            .collect();
        write_rows(path, &rows)
    }
}
