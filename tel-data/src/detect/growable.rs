//! Family B: dual-threshold segments.
//!
//! A segment opens on three consecutive days beyond the strict threshold,
//! then grows one day at a time, first to the right and then to the left,
//! while the new day is beyond the loose threshold and the mean of the grown
//! segment stays beyond the strict one. Leftward growth may reach back over
//! an earlier segment of the same year; those overlaps are resolved by
//! [`crate::merge::merge_overlapping`], so the segments produced here are
//! candidates rather than canonical events.

use super::run_event;
use log::trace;
use std::ops::Range;
use tel_core::definition::Definition;
use tel_core::event::Event;
use tel_core::series::{DailySeries, Direction};

/// Consecutive strict days needed to open a segment.
const OPENING_DAYS: usize = 3;

/// Candidate segments for every year of the record, in scan order.
pub fn candidates(
    series: &DailySeries,
    definition: &Definition,
    strict: Option<f64>,
    loose: Option<f64>,
) -> Vec<Event> {
    let (Some(strict), Some(loose)) = (strict, loose) else {
        return Vec::new();
    };
    let index = series.index();
    let values = series.values(definition.statistic);
    let thresholds = DualThreshold {
        direction: definition.direction,
        strict,
        loose,
    };

    index
        .years()
        .filter_map(|year| index.year_span(year))
        .flat_map(|span| year_segments(values, &thresholds, span, definition.min_run))
        .filter_map(|segment| {
            run_event(series, definition.direction, definition.statistic, segment)
        })
        .collect()
}

struct DualThreshold {
    direction: Direction,
    strict: f64,
    loose: f64,
}

impl DualThreshold {
    fn is_strict(&self, value: Option<f64>) -> bool {
        value.is_some_and(|v| self.direction.exceeds(v, self.strict))
    }

    /// Whether `next` may join a segment of `len` days summing to `sum`.
    fn admits(&self, sum: f64, len: usize, next: Option<f64>) -> bool {
        match next {
            Some(next) => {
                self.direction.exceeds(next, self.loose)
                    && self.direction.exceeds((sum + next) / (len + 1) as f64, self.strict)
            }
            None => false,
        }
    }
}

/// Scan one calendar year and return its accepted segments.
fn year_segments(
    values: &[Option<f64>],
    thresholds: &DualThreshold,
    span: Range<usize>,
    min_run: usize,
) -> Vec<Range<usize>> {
    let value = |offset: usize| values.get(offset).copied().flatten();
    let mut segments = Vec::new();
    let mut day = span.start;
    while day + OPENING_DAYS <= span.end {
        let opens = (day..day + OPENING_DAYS).all(|offset| thresholds.is_strict(value(offset)));
        if !opens {
            day += 1;
            continue;
        }

        let mut first = day;
        let mut last = day + OPENING_DAYS - 1;
        let mut sum: f64 = (first..=last).filter_map(value).sum();

        while last + 1 < span.end && thresholds.admits(sum, last - first + 1, value(last + 1)) {
            last += 1;
            sum += value(last).unwrap_or_default();
        }
        while first > span.start && thresholds.admits(sum, last - first + 1, value(first - 1)) {
            first -= 1;
            sum += value(first).unwrap_or_default();
        }

        if last - first + 1 >= min_run {
            trace!("growable: segment {}..={}", first, last);
            segments.push(first..last + 1);
        }
        day = last + 1;
    }
    segments
}
