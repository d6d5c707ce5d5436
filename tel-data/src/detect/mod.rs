//! Event detector.
//!
//! The three definition families differ enough in control flow that each
//! lives in its own module; [`Detector`] picks one from the definition's
//! criterion and the thresholds fitted for it.

pub mod calendar;
pub mod fixed;
pub mod growable;

use crate::merge::merge_overlapping;
use crate::threshold::{CalendarThreshold, ThresholdProfile};
use std::ops::Range;
use tel_core::definition::{Criterion, Definition};
use tel_core::event::Event;
use tel_core::series::{DailySeries, Direction, Statistic};
use tel_core::{EngineError, Result};

/// A run-finding algorithm bound to its definition and thresholds.
#[derive(Debug, Clone, Copy)]
pub enum Detector<'a> {
    /// Family A: maximal runs beyond one record-wide threshold.
    Fixed {
        definition: &'a Definition,
        threshold: Option<f64>,
    },
    /// Family B: greedy dual-threshold segments, merged where they overlap.
    Growable {
        definition: &'a Definition,
        strict: Option<f64>,
        loose: Option<f64>,
    },
    /// Family C: maximal runs beyond each day's calendar threshold.
    Calendar {
        definition: &'a Definition,
        threshold: &'a CalendarThreshold,
    },
}

impl<'a> Detector<'a> {
    pub fn for_definition(
        definition: &'a Definition,
        profile: &'a ThresholdProfile,
    ) -> Result<Self> {
        match (definition.criterion, profile) {
            (Criterion::Fixed { .. }, ThresholdProfile::Fixed(threshold)) => Ok(Detector::Fixed {
                definition,
                threshold: *threshold,
            }),
            (Criterion::Growable { .. }, ThresholdProfile::Dual { strict, loose }) => {
                Ok(Detector::Growable {
                    definition,
                    strict: *strict,
                    loose: *loose,
                })
            }
            (Criterion::Calendar { .. }, ThresholdProfile::Calendar(threshold)) => {
                Ok(Detector::Calendar {
                    definition,
                    threshold,
                })
            }
            _ => Err(EngineError::ProfileMismatch(definition.id)),
        }
    }

    pub fn definition(&self) -> &'a Definition {
        match self {
            Detector::Fixed { definition, .. }
            | Detector::Growable { definition, .. }
            | Detector::Calendar { definition, .. } => definition,
        }
    }

    /// Canonical events of one region, ordered by start date.
    pub fn detect(&self, series: &DailySeries) -> Vec<Event> {
        let mut events = match *self {
            Detector::Fixed {
                definition,
                threshold,
            } => fixed::detect(series, definition, threshold),
            Detector::Growable {
                definition,
                strict,
                loose,
            } => merge_overlapping(
                growable::candidates(series, definition, strict, loose),
                definition.direction,
            ),
            Detector::Calendar {
                definition,
                threshold,
            } => calendar::detect(series, definition, threshold),
        };
        events.sort_by_key(|event| event.start);
        events
    }
}

/// Whether a possibly missing value lies beyond a possibly undefined threshold.
pub(crate) fn satisfies(direction: Direction, value: Option<f64>, threshold: Option<f64>) -> bool {
    match (value, threshold) {
        (Some(value), Some(threshold)) => direction.exceeds(value, threshold),
        _ => false,
    }
}

/// Maximal runs of qualifying offsets inside `span` that are at least
/// `min_run` days long.
pub(crate) fn qualifying_runs(
    span: Range<usize>,
    min_run: usize,
    qualifies: impl Fn(usize) -> bool,
) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;
    for offset in span.clone() {
        match (qualifies(offset), run_start) {
            (true, None) => run_start = Some(offset),
            (false, Some(start)) => {
                if offset - start >= min_run {
                    runs.push(start..offset);
                }
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        if span.end - start >= min_run {
            runs.push(start..span.end);
        }
    }
    runs
}

/// Length of the longest run of qualifying entries.
pub(crate) fn longest_run<T>(items: &[T], qualifies: impl Fn(&T) -> bool) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for item in items {
        if qualifies(item) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Turn a run of offsets into an event.
///
/// The centroid is the day holding the most extreme value of the
/// direction's extremum statistic (earliest day on ties); the triggering
/// statistic stands in when that statistic is missing for the whole run.
pub(crate) fn run_event(
    series: &DailySeries,
    direction: Direction,
    trigger: Statistic,
    run: Range<usize>,
) -> Option<Event> {
    let most_extreme = |statistic: Statistic| {
        run.clone()
            .filter_map(|offset| series.value(statistic, offset).map(|value| (offset, value)))
            .fold(None, |best: Option<(usize, f64)>, (offset, value)| match best {
                Some((_, best_value)) if !direction.is_more_extreme(value, best_value) => best,
                _ => Some((offset, value)),
            })
    };
    let (centroid, extremum) =
        most_extreme(direction.extremum_statistic()).or_else(|| most_extreme(trigger))?;
    let index = series.index();
    Some(Event::new(
        series.id(),
        index.date_at(run.start)?,
        index.date_at(run.end.checked_sub(1)?)?,
        index.date_at(centroid)?,
        extremum,
    ))
}
