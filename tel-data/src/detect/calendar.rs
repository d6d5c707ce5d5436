//! Family C: runs beyond each day's own calendar-day threshold.
//!
//! Thresholds come from the whole record, but each date is matched with the
//! threshold of its true ordinal day, so in a leap year Mar 1 is day 61 and
//! Dec 31 is day 366. A day whose threshold is undefined never qualifies and
//! therefore can neither open nor extend a run.

use super::{qualifying_runs, run_event, satisfies};
use crate::threshold::CalendarThreshold;
use tel_core::definition::Definition;
use tel_core::event::Event;
use tel_core::series::DailySeries;

pub fn detect(
    series: &DailySeries,
    definition: &Definition,
    threshold: &CalendarThreshold,
) -> Vec<Event> {
    let index = series.index();
    let values = series.values(definition.statistic);

    index
        .years()
        .filter_map(|year| index.year_span(year))
        .flat_map(|span| {
            let first = span.start;
            let qualifies = |offset: usize| {
                let day_of_year = (offset - first + 1) as u32;
                satisfies(definition.direction, values[offset], threshold.for_day(day_of_year))
            };
            qualifying_runs(span, definition.min_run, qualifies)
        })
        .filter_map(|run| run_event(series, definition.direction, definition.statistic, run))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::{rolling_threshold, LeapDayPolicy, RollingOptions};
    use chrono::NaiveDate;
    use tel_core::calendar::{CalendarIndex, CALENDAR_SLOTS};
    use tel_core::definition::{Criterion, SEGMENT_MIN_RUN};
    use tel_core::series::{DailySeriesBuilder, Direction, Statistic};

    fn heat_definition() -> Definition {
        Definition {
            id: 8,
            name: "test calendar heat",
            direction: Direction::Heat,
            statistic: Statistic::Max,
            criterion: Criterion::Calendar { quantile: 0.9 },
            min_run: SEGMENT_MIN_RUN,
        }
    }

    fn flat_threshold(
        value: f64,
        day_366: Option<f64>,
        leap_day: LeapDayPolicy,
    ) -> CalendarThreshold {
        let mut days = vec![Some(value); CALENDAR_SLOTS];
        days[CALENDAR_SLOTS - 1] = day_366;
        CalendarThreshold::new(days, leap_day)
    }

    fn series_with(index: CalendarIndex, hot: &[NaiveDate]) -> DailySeries {
        let mut max = vec![Some(10.0); index.len()];
        for date in hot {
            max[index.offset(*date).unwrap()] = Some(25.0);
        }
        DailySeriesBuilder::new("RFCW", index)
            .with_values(Statistic::Max, &max)
            .build()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn undefined_day_366_does_not_extend_a_run() {
        let index = CalendarIndex::new(2000, 2000).unwrap();
        let hot = [ymd(2000, 12, 28), ymd(2000, 12, 29), ymd(2000, 12, 30), ymd(2000, 12, 31)];
        let series = series_with(index, &hot);

        let absent = flat_threshold(20.0, None, LeapDayPolicy::Absent);
        let events = detect(&series, &heat_definition(), &absent);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, ymd(2000, 12, 28));
        assert_eq!(events[0].end, ymd(2000, 12, 30));
        assert_eq!(events[0].duration, 3);

        let reuse = flat_threshold(20.0, None, LeapDayPolicy::ReuseDay365);
        let events = detect(&series, &heat_definition(), &reuse);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].end, ymd(2000, 12, 31));
        assert_eq!(events[0].duration, 4);
    }

    #[test]
    fn undefined_day_366_does_not_start_a_run() {
        // Dec 30-31 of a leap year followed by Jan 1-2: the only way to reach
        // three days would go through day 366 and across the year edge.
        let index = CalendarIndex::new(2000, 2001).unwrap();
        let hot = [ymd(2000, 12, 31), ymd(2001, 1, 1), ymd(2001, 1, 2)];
        let series = series_with(index, &hot);
        let threshold = flat_threshold(20.0, None, LeapDayPolicy::Absent);
        assert!(detect(&series, &heat_definition(), &threshold).is_empty());
    }

    #[test]
    fn days_map_to_true_ordinal_in_leap_years() {
        // Only ordinal days 61-63 have a reachable threshold.
        let mut days = vec![Some(100.0); CALENDAR_SLOTS];
        for slot in 60..63 {
            days[slot] = Some(5.0);
        }
        let threshold = CalendarThreshold::new(days, LeapDayPolicy::Absent);
        let index = CalendarIndex::new(2000, 2001).unwrap();
        let series = series_with(index, &[]);

        let events = detect(&series, &heat_definition(), &threshold);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].start, ymd(2000, 3, 1));
        assert_eq!(events[0].end, ymd(2000, 3, 3));
        assert_eq!(events[1].start, ymd(2001, 3, 2));
        assert_eq!(events[1].end, ymd(2001, 3, 4));
    }

    #[test]
    fn two_day_runs_are_too_short() {
        let index = CalendarIndex::new(2001, 2001).unwrap();
        let series = series_with(index, &[ymd(2001, 7, 1), ymd(2001, 7, 2)]);
        let threshold = flat_threshold(20.0, Some(20.0), LeapDayPolicy::Absent);
        assert!(detect(&series, &heat_definition(), &threshold).is_empty());
    }

    #[test]
    fn rolling_threshold_picks_out_seasonal_anomaly() {
        // A cold-season warm spell: well below summer values, but far above
        // its own calendar days.
        let index = CalendarIndex::new(1990, 1999).unwrap();
        let max: Vec<Option<f64>> = (0..index.len())
            .map(|offset| {
                let date = index.date_at(offset).unwrap();
                let doy = chrono::Datelike::ordinal(&date) as f64;
                let phase = 2.0 * std::f64::consts::PI * (doy - 15.0) / 365.25;
                let season = 20.0 - 15.0 * phase.cos();
                Some(season + ((offset * 31) % 7) as f64 * 0.2)
            })
            .collect();
        let mut max = max;
        let spell = index.offset(ymd(1995, 1, 20)).unwrap();
        for offset in spell..spell + 4 {
            max[offset] = Some(18.0);
        }
        let series = DailySeriesBuilder::new("RFCW", index)
            .with_values(Statistic::Max, &max)
            .build();

        let threshold =
            rolling_threshold(&series, Statistic::Max, 0.9, &RollingOptions::default()).unwrap();
        let events = detect(&series, &heat_definition(), &threshold);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, ymd(1995, 1, 20));
        assert_eq!(events[0].duration, 4);

        // A single record-wide 90th percentile would never flag 18 degrees.
        let summer = threshold.for_day(196).unwrap();
        assert!(summer > 30.0);
    }
}
