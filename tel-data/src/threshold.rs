//! Threshold engine.
//!
//! Families A and B compare each day with one or two quantiles fitted over
//! the whole record. Family C compares each day with a quantile fitted over
//! a 15-day calendar window pooled across every year, which follows the
//! seasonal cycle instead of flagging only the hottest (or coldest) season.

use crate::quantile::{quantile, quantile_sorted, quantiles};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tel_core::calendar::CALENDAR_SLOTS;
use tel_core::definition::{Criterion, Definition, ROLLING_HALF_WINDOW};
use tel_core::series::{DailySeries, Statistic};
use tel_core::{EngineError, Result};

/// What ordinal day 366 compares against when its rolling pool is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeapDayPolicy {
    /// Day 366 keeps its own, possibly undefined, threshold.
    #[default]
    Absent,
    /// An undefined day 366 borrows the day 365 threshold.
    ReuseDay365,
}

/// Parameters of the rolling calendar-day computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingOptions {
    /// Days pooled on each side of the target day.
    pub half_window: usize,
    pub leap_day: LeapDayPolicy,
}

impl Default for RollingOptions {
    fn default() -> Self {
        Self {
            half_window: ROLLING_HALF_WINDOW,
            leap_day: LeapDayPolicy::default(),
        }
    }
}

/// One threshold per ordinal day of the year.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarThreshold {
    days: Vec<Option<f64>>,
    leap_day: LeapDayPolicy,
}

impl CalendarThreshold {
    pub fn new(days: Vec<Option<f64>>, leap_day: LeapDayPolicy) -> Self {
        let mut days = days;
        days.resize(CALENDAR_SLOTS, None);
        Self { days, leap_day }
    }

    /// Threshold for an ordinal day (1-366); `None` when undefined.
    pub fn for_day(&self, day_of_year: u32) -> Option<f64> {
        let own = day_of_year
            .checked_sub(1)
            .and_then(|slot| self.days.get(slot as usize))
            .copied()
            .flatten();
        match (own, day_of_year, self.leap_day) {
            (None, 366, LeapDayPolicy::ReuseDay365) => self.for_day(365),
            _ => own,
        }
    }

    /// The 366 slot thresholds as computed, without leap-day fallback.
    pub fn days(&self) -> &[Option<f64>] {
        &self.days
    }

    pub fn undefined_days(&self) -> usize {
        self.days.iter().filter(|d| d.is_none()).count()
    }
}

/// Thresholds of one region under one definition and aggregation method.
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdProfile {
    Fixed(Option<f64>),
    Dual {
        strict: Option<f64>,
        loose: Option<f64>,
    },
    Calendar(CalendarThreshold),
}

impl ThresholdProfile {
    /// True when no day can ever qualify against this profile.
    pub fn is_undefined(&self) -> bool {
        match self {
            ThresholdProfile::Fixed(value) => value.is_none(),
            ThresholdProfile::Dual { strict, loose } => strict.is_none() || loose.is_none(),
            ThresholdProfile::Calendar(calendar) => calendar.undefined_days() == CALENDAR_SLOTS,
        }
    }
}

/// Fit the thresholds a definition needs from a region's series.
pub fn compute_profile(
    series: &DailySeries,
    definition: &Definition,
    options: &RollingOptions,
) -> Result<ThresholdProfile> {
    let values = series.values(definition.statistic);
    let profile = match definition.criterion {
        Criterion::Fixed { quantile: p } => {
            ThresholdProfile::Fixed(quantile(values.iter().flatten().copied(), p)?)
        }
        Criterion::Growable { strict, loose } => {
            let fitted = quantiles(values.iter().flatten().copied(), &[strict, loose])?;
            ThresholdProfile::Dual {
                strict: fitted[0],
                loose: fitted[1],
            }
        }
        Criterion::Calendar { quantile: p } => {
            ThresholdProfile::Calendar(rolling_threshold(series, definition.statistic, p, options)?)
        }
    };
    if profile.is_undefined() {
        warn!(
            "threshold: {} has no valid {} values for {}",
            series.id(),
            definition.statistic.as_str(),
            definition
        );
    }
    Ok(profile)
}

/// Calendar-day quantiles pooled over a centred window across all years.
///
/// The series is laid out as consecutive 366-slot years; for slot `d` every
/// year contributes the positions `d - half_window ..= d + half_window`, which
/// run into the neighbouring year near Jan 1 and Dec 31. Positions before the
/// first or after the last year, and the absent day 366 of common years,
/// contribute nothing. A day whose pool is empty stays undefined.
pub fn rolling_threshold(
    series: &DailySeries,
    statistic: Statistic,
    probability: f64,
    options: &RollingOptions,
) -> Result<CalendarThreshold> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(EngineError::InvalidQuantile(probability));
    }

    let padded = series.index().padded(series.values(statistic));
    let years = series.index().num_years();
    let half = options.half_window as isize;

    let mut days = Vec::with_capacity(CALENDAR_SLOTS);
    let mut pool = Vec::with_capacity(years * (2 * options.half_window + 1));
    for slot in 0..CALENDAR_SLOTS {
        pool.clear();
        for year in 0..years {
            let centre = (year * CALENDAR_SLOTS + slot) as isize;
            for position in (centre - half)..=(centre + half) {
                if position < 0 {
                    continue;
                }
                if let Some(value) = padded.get(position as usize).copied().flatten() {
                    pool.push(value);
                }
            }
        }
        if pool.is_empty() {
            debug!("threshold: {} day {} has an empty pool", series.id(), slot + 1);
            days.push(None);
            continue;
        }
        pool.sort_by(|a, b| a.total_cmp(b));
        days.push(Some(quantile_sorted(&pool, probability)));
    }
    Ok(CalendarThreshold::new(days, options.leap_day))
}
