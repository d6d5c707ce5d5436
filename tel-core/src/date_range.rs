use chrono::{NaiveDate, TimeDelta};
use std::mem::replace;

/// An inclusive window of days, iterated from the first date through the
/// last. Event windows and county extraction windows are both `DateRange`s.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    /// Number of days in the window; zero when the window is inverted.
    pub fn num_days(&self) -> usize {
        let days = (self.1 - self.0).num_days() + 1;
        days.max(0) as usize
    }

    /// True when the two windows share at least one day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.0 <= other.1 && other.0 <= self.1
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = self.0 + TimeDelta::days(1);
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }
}
