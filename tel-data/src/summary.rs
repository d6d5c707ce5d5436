//! Per-region event statistics.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use tel_core::event::{AnnotatedEvent, Event};
use tel_core::series::Direction;

/// Number of events starting in each year of `years`, zero years included.
pub fn year_counts(events: &[Event], years: RangeInclusive<i32>) -> Vec<(i32, usize)> {
    let mut counts: BTreeMap<i32, usize> = years.map(|year| (year, 0)).collect();
    for event in events {
        if let Some(count) = counts.get_mut(&event.year()) {
            *count += 1;
        }
    }
    counts.into_iter().collect()
}

/// Aggregate statistics of one region's events for one definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub region: String,
    pub events: usize,
    pub event_days: u32,
    pub mean_duration: Option<f64>,
    pub max_duration: u32,
    pub most_extreme: Option<f64>,
    pub most_extreme_date: Option<NaiveDate>,
    pub mean_coverage: Option<f64>,
}

impl EventSummary {
    pub fn from_events(region: &str, events: &[Event], direction: Direction) -> Self {
        let event_days: u32 = events.iter().map(|event| event.duration).sum();
        let mean_duration =
            (!events.is_empty()).then(|| event_days as f64 / events.len() as f64);
        let extreme = events.iter().fold(None, |best: Option<&Event>, event| match best {
            Some(best) if !direction.is_more_extreme(event.extremum, best.extremum) => Some(best),
            _ => Some(event),
        });
        EventSummary {
            region: region.to_string(),
            events: events.len(),
            event_days,
            mean_duration,
            max_duration: events.iter().map(|event| event.duration).max().unwrap_or(0),
            most_extreme: extreme.map(|event| event.extremum),
            most_extreme_date: extreme.map(|event| event.centroid),
            mean_coverage: None,
        }
    }

    /// Summary of validated events, with the mean coverage filled in.
    pub fn from_annotated(
        region: &str,
        annotated: &[AnnotatedEvent],
        direction: Direction,
    ) -> Self {
        let events: Vec<Event> = annotated.iter().map(|a| a.event.clone()).collect();
        let mut summary = Self::from_events(region, &events, direction);
        if !annotated.is_empty() {
            let total: f64 = annotated.iter().map(|a| a.coverage).sum();
            summary.mean_coverage = Some(total / annotated.len() as f64);
        }
        summary
    }

    /// True when no summary in `all` holds a more extreme event than this one.
    pub fn is_most_extreme_in(&self, all: &[EventSummary], direction: Direction) -> bool {
        let Some(own) = self.most_extreme else {
            return false;
        };
        all.iter()
            .filter_map(|other| other.most_extreme)
            .all(|other| !direction.is_more_extreme(other, own))
    }
}
