//! Event merger for dual-threshold segments.

use log::debug;
use std::collections::BTreeMap;
use tel_core::event::Event;
use tel_core::series::Direction;

/// Resolve overlapping candidates into non-overlapping canonical events.
///
/// Candidates are grouped by region and sorted by start date; any two that
/// share a day are merged, and passes repeat until one completes without a
/// merge. The output is ordered by region, then start date.
pub fn merge_overlapping(candidates: Vec<Event>, direction: Direction) -> Vec<Event> {
    let mut by_region: BTreeMap<String, Vec<Event>> = BTreeMap::new();
    for candidate in candidates {
        by_region
            .entry(candidate.region.clone())
            .or_default()
            .push(candidate);
    }
    by_region
        .into_values()
        .flat_map(|events| merge_region(events, direction))
        .collect()
}

fn merge_region(mut events: Vec<Event>, direction: Direction) -> Vec<Event> {
    let candidates = events.len();
    loop {
        events.sort_by_key(|event| (event.start, event.end));
        let mut merged_any = false;
        let mut i = 0;
        while i + 1 < events.len() {
            if events[i].overlaps(&events[i + 1]) {
                let next = events.remove(i + 1);
                events[i] = merge_pair(&events[i], &next, direction);
                merged_any = true;
            } else {
                i += 1;
            }
        }
        if !merged_any {
            break;
        }
    }
    if events.len() < candidates {
        debug!(
            "merge: {} candidates became {} events",
            candidates,
            events.len()
        );
    }
    events
}

/// Union of two overlapping events.
///
/// The extremum is the more extreme of the two; the centroid is the midpoint
/// of the merged span rather than a fresh extremum lookup.
pub fn merge_pair(a: &Event, b: &Event, direction: Direction) -> Event {
    let start = a.start.min(b.start);
    let end = a.end.max(b.end);
    let mut merged = Event::new(
        a.region.clone(),
        start,
        end,
        start,
        direction.more_extreme(a.extremum, b.extremum),
    );
    merged.centroid = merged.midpoint();
    merged
}

/// True when any two events of the same region share a day.
pub fn has_overlaps(events: &[Event]) -> bool {
    events
        .iter()
        .enumerate()
        .any(|(i, a)| events[i + 1..].iter().any(|b| a.overlaps(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(doy: u32) -> NaiveDate {
        NaiveDate::from_yo_opt(1995, doy).unwrap()
    }

    fn candidate(region: &str, start: u32, end: u32, extremum: f64) -> Event {
        Event::new(region, day(start), day(end), day(start), extremum)
    }

    #[test]
    fn overlapping_pair_merges_to_midpoint_centroid() {
        let merged = merge_overlapping(
            vec![candidate("SRSE", 50, 55, 38.0), candidate("SRSE", 53, 60, 39.0)],
            Direction::Heat,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start, day(50));
        assert_eq!(merged[0].end, day(60));
        assert_eq!(merged[0].duration, 11);
        assert_eq!(merged[0].centroid, day(55));
        assert_eq!(merged[0].extremum, 39.0);
    }

    #[test]
    fn cold_merge_keeps_lowest_extremum() {
        let merged = merge_overlapping(
            vec![candidate("NPCC", 10, 14, -21.0), candidate("NPCC", 12, 13, -25.5)],
            Direction::Cold,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].extremum, -25.5);
        assert_eq!((merged[0].start, merged[0].end), (day(10), day(14)));
    }

    #[test]
    fn chained_overlaps_reach_fixed_point() {
        let merged = merge_overlapping(
            vec![
                candidate("SRSE", 30, 33, 1.0),
                candidate("SRSE", 1, 3, 1.0),
                candidate("SRSE", 3, 5, 1.0),
                candidate("SRSE", 5, 7, 1.0),
                candidate("SRSE", 2, 40, 1.0),
            ],
            Direction::Heat,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!((merged[0].start, merged[0].end), (day(1), day(40)));
        assert_eq!(merged[0].duration, 40);
    }

    #[test]
    fn adjacent_events_stay_separate() {
        let merged = merge_overlapping(
            vec![candidate("SRSE", 1, 3, 1.0), candidate("SRSE", 4, 6, 1.0)],
            Direction::Heat,
        );
        assert_eq!(merged.len(), 2);
        // untouched events keep their own centroids
        assert_eq!(merged[1].centroid, day(4));
    }

    #[test]
    fn regions_never_merge_with_each_other() {
        let merged = merge_overlapping(
            vec![candidate("SRSE", 1, 5, 1.0), candidate("RFCE", 2, 6, 1.0)],
            Direction::Heat,
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].region, "RFCE");
        assert_eq!(merged[1].region, "SRSE");
    }

    #[test]
    fn merging_is_idempotent() {
        let candidates = vec![
            candidate("SRSE", 100, 104, 2.0),
            candidate("SRSE", 90, 101, 3.0),
            candidate("SRSE", 150, 152, 1.0),
            candidate("SRSE", 151, 160, 4.0),
            candidate("SRSE", 200, 202, 5.0),
        ];
        let once = merge_overlapping(candidates, Direction::Heat);
        assert!(!has_overlaps(&once));
        let twice = merge_overlapping(once.clone(), Direction::Heat);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }
}
