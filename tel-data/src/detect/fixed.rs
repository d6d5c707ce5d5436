//! Family A: runs beyond a single record-wide threshold, found one calendar
//! year at a time.

use super::{qualifying_runs, run_event, satisfies};
use tel_core::definition::Definition;
use tel_core::event::Event;
use tel_core::series::DailySeries;

pub fn detect(series: &DailySeries, definition: &Definition, threshold: Option<f64>) -> Vec<Event> {
    if threshold.is_none() {
        return Vec::new();
    }
    let index = series.index();
    let values = series.values(definition.statistic);
    let qualifies =
        |offset: usize| satisfies(definition.direction, values[offset], threshold);

    index
        .years()
        .filter_map(|year| index.year_span(year))
        .flat_map(|span| qualifying_runs(span, definition.min_run, &qualifies))
        .filter_map(|run| run_event(series, definition.direction, definition.statistic, run))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::{compute_profile, RollingOptions, ThresholdProfile};
    use chrono::NaiveDate;
    use tel_core::calendar::CalendarIndex;
    use tel_core::definition::{Criterion, FIXED_MIN_RUN};
    use tel_core::series::{DailySeriesBuilder, Direction, Statistic};

    fn heat_definition(quantile: f64) -> Definition {
        Definition {
            id: 1,
            name: "test mean heat",
            direction: Direction::Heat,
            statistic: Statistic::Mean,
            criterion: Criterion::Fixed { quantile },
            min_run: FIXED_MIN_RUN,
        }
    }

    /// Five years of flat 20 degree means with days 100-104 of the third
    /// year raised by 10 degrees; day 102 carries the hottest maximum.
    fn spiked_series() -> DailySeries {
        let index = CalendarIndex::new(1981, 1985).unwrap();
        let spike = index.year_span(1983).unwrap().start + 99;
        let mut mean = vec![Some(20.0); index.len()];
        let mut max = vec![Some(26.0); index.len()];
        for (i, offset) in (spike..spike + 5).enumerate() {
            mean[offset] = Some(30.0);
            max[offset] = Some([36.0, 37.0, 39.5, 38.0, 36.5][i]);
        }
        DailySeriesBuilder::new("SRSE", index)
            .with_values(Statistic::Mean, &mean)
            .with_values(Statistic::Max, &max)
            .with_values(Statistic::Min, &vec![Some(14.0); index.len()])
            .build()
    }

    #[test]
    fn single_spike_yields_exactly_one_event() {
        let series = spiked_series();
        let definition = heat_definition(0.90);
        let profile = compute_profile(&series, &definition, &RollingOptions::default()).unwrap();
        let ThresholdProfile::Fixed(threshold) = profile else {
            panic!("expected a fixed profile");
        };
        assert_eq!(threshold, Some(20.0));

        let events = detect(&series, &definition, threshold);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.region, "SRSE");
        assert_eq!(event.start, NaiveDate::from_yo_opt(1983, 100).unwrap());
        assert_eq!(event.end, NaiveDate::from_yo_opt(1983, 104).unwrap());
        assert_eq!(event.duration, 5);
        assert_eq!(event.centroid, NaiveDate::from_yo_opt(1983, 102).unwrap());
        assert_eq!(event.extremum, 39.5);
    }

    #[test]
    fn single_hot_day_is_not_an_event() {
        let index = CalendarIndex::new(2001, 2001).unwrap();
        let mut mean = vec![Some(0.0); index.len()];
        mean[40] = Some(5.0);
        mean[50] = Some(5.0);
        mean[51] = Some(5.0);
        let series = DailySeriesBuilder::new("R", index)
            .with_values(Statistic::Mean, &mean)
            .build();
        let events = detect(&series, &heat_definition(0.9), Some(1.0));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].duration, 2);
        assert_eq!(events[0].start, index.date_at(50).unwrap());
    }

    #[test]
    fn runs_are_cut_at_year_edges() {
        let index = CalendarIndex::new(2001, 2002).unwrap();
        let mut mean = vec![Some(0.0); index.len()];
        // Dec 30 2001 through Jan 1 2002
        for offset in 363..366 {
            mean[offset] = Some(5.0);
        }
        let series = DailySeriesBuilder::new("R", index)
            .with_values(Statistic::Mean, &mean)
            .build();
        let events = detect(&series, &heat_definition(0.9), Some(1.0));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].end, NaiveDate::from_ymd_opt(2001, 12, 31).unwrap());
        assert_eq!(events[0].duration, 2);
    }

    #[test]
    fn cold_definition_looks_below_threshold() {
        let index = CalendarIndex::new(2001, 2001).unwrap();
        let mut mean = vec![Some(5.0); index.len()];
        let mut min = vec![Some(0.0); index.len()];
        for offset in 20..24 {
            mean[offset] = Some(-10.0);
        }
        min[21] = Some(-18.0);
        min[22] = Some(-18.0);
        let series = DailySeriesBuilder::new("R", index)
            .with_values(Statistic::Mean, &mean)
            .with_values(Statistic::Min, &min)
            .build();
        let definition = Definition {
            direction: Direction::Cold,
            ..heat_definition(0.05)
        };
        let events = detect(&series, &definition, Some(0.0));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].duration, 4);
        assert_eq!(events[0].centroid, index.date_at(21).unwrap());
        assert_eq!(events[0].extremum, -18.0);
    }

    #[test]
    fn undefined_threshold_detects_nothing() {
        let series = spiked_series();
        assert!(detect(&series, &heat_definition(0.9), None).is_empty());
    }

    #[test]
    fn missing_days_break_runs() {
        let index = CalendarIndex::new(2001, 2001).unwrap();
        let mut mean = vec![Some(5.0); index.len()];
        for offset in (0..index.len()).step_by(2) {
            mean[offset] = None;
        }
        let series = DailySeriesBuilder::new("R", index)
            .with_values(Statistic::Mean, &mean)
            .build();
        assert!(detect(&series, &heat_definition(0.9), Some(1.0)).is_empty());
    }

    #[test]
    fn durations_match_spans_and_minimum() {
        let index = CalendarIndex::new(1999, 2001).unwrap();
        let mean: Vec<Option<f64>> = (0..index.len())
            .map(|i| Some(((i * 5) % 13) as f64))
            .collect();
        let series = DailySeriesBuilder::new("R", index)
            .with_values(Statistic::Mean, &mean)
            .build();
        let events = detect(&series, &heat_definition(0.9), Some(6.0));
        assert!(!events.is_empty());
        for event in &events {
            let span = (event.end - event.start).num_days() + 1;
            assert_eq!(event.duration as i64, span);
            assert!(event.duration as usize >= FIXED_MIN_RUN);
            assert!(event.start <= event.centroid && event.centroid <= event.end);
        }
    }
}
