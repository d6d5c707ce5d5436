use crate::error::{EngineError, Result};
use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::ops::{Range, RangeInclusive};
use tel_utils::dates::{date_from_day_of_year, days_in_year};

/// Number of calendar-day slots in a year view. Slot `n` holds ordinal
/// day `n + 1`; slot 365 (day 366) only exists in leap years.
pub const CALENDAR_SLOTS: usize = 366;

/// First year of the historical record.
pub const DEFAULT_FIRST_YEAR: i32 = 1980;

/// Last year of the historical record.
pub const DEFAULT_LAST_YEAR: i32 = 2024;

/// Maps dates and (year, day-of-year) pairs onto absolute day offsets since
/// January 1 of the first year of the record.
///
/// The record always spans whole calendar years, so every year owns a
/// contiguous block of 365 or 366 offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarIndex {
    first_year: i32,
    last_year: i32,
    start: NaiveDate,
    len: usize,
}

impl CalendarIndex {
    pub fn new(first_year: i32, last_year: i32) -> Result<Self> {
        let span_error = EngineError::InvalidRecordSpan {
            first_year,
            last_year,
        };
        if first_year > last_year {
            return Err(span_error);
        }
        let start = NaiveDate::from_ymd_opt(first_year, 1, 1).ok_or(span_error)?;
        let len = (first_year..=last_year)
            .map(|year| days_in_year(year) as usize)
            .sum();
        Ok(Self {
            first_year,
            last_year,
            start,
            len,
        })
    }

    pub fn first_year(&self) -> i32 {
        self.first_year
    }

    pub fn last_year(&self) -> i32 {
        self.last_year
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.last_year
    }

    pub fn num_years(&self) -> usize {
        (self.last_year - self.first_year + 1) as usize
    }

    /// Total number of days in the record.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Absolute day offset of a date, or `None` outside the record.
    pub fn offset(&self, date: NaiveDate) -> Option<usize> {
        let days = (date - self.start).num_days();
        if days < 0 || days as usize >= self.len {
            return None;
        }
        Some(days as usize)
    }

    /// Absolute offset of an ordinal day within a year of the record.
    pub fn offset_of(&self, year: i32, day_of_year: u32) -> Option<usize> {
        date_from_day_of_year(year, day_of_year).and_then(|date| self.offset(date))
    }

    pub fn date_at(&self, offset: usize) -> Option<NaiveDate> {
        if offset >= self.len {
            return None;
        }
        Some(self.start + TimeDelta::days(offset as i64))
    }

    /// The offsets belonging to one calendar year of the record.
    pub fn year_span(&self, year: i32) -> Option<Range<usize>> {
        let first = self.offset_of(year, 1)?;
        Some(first..first + days_in_year(year) as usize)
    }

    /// One 366-slot row per year. Slot 366 of a common year is absent.
    pub fn calendar_view<T: Copy>(
        &self,
        values: &[Option<T>],
    ) -> Vec<[Option<T>; CALENDAR_SLOTS]> {
        self.years()
            .map(|year| {
                let mut row = [None; CALENDAR_SLOTS];
                if let Some(span) = self.year_span(year) {
                    for (slot, offset) in span.enumerate() {
                        row[slot] = values.get(offset).copied().flatten();
                    }
                }
                row
            })
            .collect()
    }

    /// The calendar view flattened into `years x 366` positions, so that a
    /// window moving across Dec 31 continues into the next year's Jan 1.
    pub fn padded<T: Copy>(&self, values: &[Option<T>]) -> Vec<Option<T>> {
        self.calendar_view(values).into_iter().flatten().collect()
    }
}

impl Default for CalendarIndex {
    fn default() -> Self {
        Self {
            first_year: DEFAULT_FIRST_YEAR,
            last_year: DEFAULT_LAST_YEAR,
            start: NaiveDate::from_ymd_opt(DEFAULT_FIRST_YEAR, 1, 1).unwrap_or_default(),
            len: (DEFAULT_FIRST_YEAR..=DEFAULT_LAST_YEAR)
                .map(|year| days_in_year(year) as usize)
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_covers_1980_through_2024() {
        let index = CalendarIndex::default();
        assert_eq!(index, CalendarIndex::new(1980, 2024).unwrap());
        // 45 years, 12 of them leap years
        assert_eq!(index.len(), 45 * 365 + 12);
        assert_eq!(index.date_at(index.len() - 1), NaiveDate::from_ymd_opt(2024, 12, 31));
    }

    #[test]
    fn rejects_inverted_span() {
        assert!(matches!(
            CalendarIndex::new(2001, 2000),
            Err(EngineError::InvalidRecordSpan { .. })
        ));
    }

    #[test]
    fn offsets_account_for_leap_years() {
        let index = CalendarIndex::new(1980, 1982).unwrap();
        assert_eq!(index.offset_of(1980, 1), Some(0));
        assert_eq!(index.offset_of(1980, 366), Some(365));
        assert_eq!(index.offset_of(1981, 1), Some(366));
        assert_eq!(index.offset_of(1981, 366), None);
        assert_eq!(index.offset_of(1982, 1), Some(731));
        assert_eq!(index.year_span(1981), Some(366..731));
        assert_eq!(index.date_at(730), NaiveDate::from_ymd_opt(1981, 12, 31));
        assert_eq!(index.offset(NaiveDate::from_ymd_opt(1979, 12, 31).unwrap()), None);
        assert_eq!(index.date_at(index.len()), None);
    }

    #[test]
    fn calendar_view_pads_day_366_in_common_years() {
        let index = CalendarIndex::new(1980, 1981).unwrap();
        let values: Vec<Option<f64>> = (0..index.len()).map(|i| Some(i as f64)).collect();
        let view = index.calendar_view(&values);
        assert_eq!(view.len(), 2);
        assert_eq!(view[0][365], Some(365.0));
        assert_eq!(view[1][0], Some(366.0));
        assert_eq!(view[1][364], Some(730.0));
        assert_eq!(view[1][365], None);

        let padded = index.padded(&values);
        assert_eq!(padded.len(), 2 * CALENDAR_SLOTS);
        assert_eq!(padded[CALENDAR_SLOTS], Some(366.0));
        assert_eq!(padded[2 * CALENDAR_SLOTS - 1], None);
    }
}
