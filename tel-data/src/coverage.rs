//! Spatial coverage validator.
//!
//! Each county of an event's region is checked on its own over exactly the
//! event's date window, against the region's thresholds. Family B counties
//! are held to a fixed window: no growth and no merging happen at county
//! level.

use crate::detect::{longest_run, satisfies};
use crate::threshold::ThresholdProfile;
use chrono::{Datelike, NaiveDate};
use tel_core::date_range::DateRange;
use tel_core::definition::{Criterion, Definition};
use tel_core::event::{AnnotatedEvent, Event};
use tel_core::series::{DailySeries, Direction};
use tel_core::{EngineError, Result};

/// Whether one county independently satisfies the definition over `window`.
pub fn county_passes(
    window: DateRange,
    definition: &Definition,
    profile: &ThresholdProfile,
    county: &DailySeries,
) -> Result<bool> {
    let direction = definition.direction;
    let days: Vec<(NaiveDate, Option<f64>)> = window
        .map(|date| (date, county.value_on(definition.statistic, date)))
        .collect();

    let passes = match (definition.criterion, profile) {
        (Criterion::Fixed { .. }, ThresholdProfile::Fixed(threshold)) => {
            longest_run(&days, |(_, value)| satisfies(direction, *value, *threshold))
                >= definition.min_run
        }
        (Criterion::Calendar { .. }, ThresholdProfile::Calendar(threshold)) => {
            longest_run(&days, |(date, value)| {
                satisfies(direction, *value, threshold.for_day(date.ordinal()))
            }) >= definition.min_run
        }
        (Criterion::Growable { .. }, ThresholdProfile::Dual { strict, loose }) => {
            fixed_window_passes(direction, &days, *strict, *loose, definition.min_run)
        }
        _ => return Err(EngineError::ProfileMismatch(definition.id)),
    };
    Ok(passes)
}

fn fixed_window_passes(
    direction: Direction,
    days: &[(NaiveDate, Option<f64>)],
    strict: Option<f64>,
    loose: Option<f64>,
    min_run: usize,
) -> bool {
    let (Some(strict), Some(loose)) = (strict, loose) else {
        return false;
    };
    let values: Option<Vec<f64>> = days.iter().map(|(_, value)| *value).collect();
    let Some(values) = values else {
        return false;
    };
    if values.is_empty() {
        return false;
    }
    let strict_run = longest_run(&values, |v| direction.exceeds(*v, strict));
    let all_loose = values.iter().all(|v| direction.exceeds(*v, loose));
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    strict_run >= min_run && all_loose && direction.exceeds(mean, strict)
}

/// Percentage of `counties` that pass over the event's window.
pub fn spatial_coverage(
    event: &Event,
    definition: &Definition,
    profile: &ThresholdProfile,
    counties: &[&DailySeries],
) -> Result<f64> {
    if counties.is_empty() {
        return Err(EngineError::DegenerateRegion(event.region.clone()));
    }
    let mut passing = 0;
    for county in counties {
        if county_passes(event.window(), definition, profile, county)? {
            passing += 1;
        }
    }
    Ok(passing as f64 / counties.len() as f64 * 100.0)
}

pub fn annotate(
    event: &Event,
    definition: &Definition,
    profile: &ThresholdProfile,
    counties: &[&DailySeries],
) -> Result<AnnotatedEvent> {
    let coverage = spatial_coverage(event, definition, profile, counties)?;
    Ok(AnnotatedEvent {
        event: event.clone(),
        coverage,
    })
}
