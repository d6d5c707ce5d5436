use crate::calendar::CalendarIndex;
use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A daily temperature statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Mean,
    Max,
    Min,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Max => "max",
            Statistic::Min => "min",
        }
    }
}

/// Whether a definition looks for unusually hot or unusually cold days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Heat,
    Cold,
}

impl Direction {
    /// Strict comparison against a threshold: above for heat, below for cold.
    pub fn exceeds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Direction::Heat => value > threshold,
            Direction::Cold => value < threshold,
        }
    }

    /// The statistic whose extreme marks an event's centroid: the hottest
    /// daily maximum for heat waves, the coldest daily minimum for cold snaps.
    pub fn extremum_statistic(&self) -> Statistic {
        match self {
            Direction::Heat => Statistic::Max,
            Direction::Cold => Statistic::Min,
        }
    }

    /// True when `a` is strictly more extreme than `b`.
    pub fn is_more_extreme(&self, a: f64, b: f64) -> bool {
        match self {
            Direction::Heat => a > b,
            Direction::Cold => a < b,
        }
    }

    pub fn more_extreme(&self, a: f64, b: f64) -> f64 {
        if self.is_more_extreme(b, a) {
            b
        } else {
            a
        }
    }
}

/// The rule used to combine county temperatures into one regional series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    Unweighted,
    #[serde(rename = "area", alias = "area_weighted")]
    AreaWeighted,
    #[serde(rename = "population", alias = "population_weighted")]
    PopulationWeighted,
}

impl AggregationMethod {
    pub const ALL: [AggregationMethod; 3] = [
        AggregationMethod::Unweighted,
        AggregationMethod::AreaWeighted,
        AggregationMethod::PopulationWeighted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::Unweighted => "unweighted",
            AggregationMethod::AreaWeighted => "area",
            AggregationMethod::PopulationWeighted => "population",
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unweighted" => Ok(AggregationMethod::Unweighted),
            "area" | "area_weighted" | "area-weighted" => Ok(AggregationMethod::AreaWeighted),
            "population" | "population_weighted" | "population-weighted" => {
                Ok(AggregationMethod::PopulationWeighted)
            }
            other => Err(EngineError::UnknownMethod(other.to_string())),
        }
    }
}

/// Daily mean/max/min temperatures of one spatial unit (a region under one
/// aggregation method, or a county) over the whole record.
///
/// Every statistic is aligned with the calendar index; a missing day is
/// `None`. Built once with [`DailySeriesBuilder`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    id: String,
    index: CalendarIndex,
    mean: Vec<Option<f64>>,
    max: Vec<Option<f64>>,
    min: Vec<Option<f64>>,
}

impl DailySeries {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn index(&self) -> &CalendarIndex {
        &self.index
    }

    pub fn values(&self, statistic: Statistic) -> &[Option<f64>] {
        match statistic {
            Statistic::Mean => &self.mean,
            Statistic::Max => &self.max,
            Statistic::Min => &self.min,
        }
    }

    pub fn value(&self, statistic: Statistic, offset: usize) -> Option<f64> {
        self.values(statistic).get(offset).copied().flatten()
    }

    pub fn value_on(&self, statistic: Statistic, date: NaiveDate) -> Option<f64> {
        self.index
            .offset(date)
            .and_then(|offset| self.value(statistic, offset))
    }

    /// Number of days carrying a value for the statistic.
    pub fn valid_days(&self, statistic: Statistic) -> usize {
        self.values(statistic).iter().flatten().count()
    }
}

/// Incrementally fills a [`DailySeries`] from dated records.
#[derive(Debug, Clone)]
pub struct DailySeriesBuilder {
    series: DailySeries,
}

impl DailySeriesBuilder {
    pub fn new(id: impl Into<String>, index: CalendarIndex) -> Self {
        let len = index.len();
        Self {
            series: DailySeries {
                id: id.into(),
                index,
                mean: vec![None; len],
                max: vec![None; len],
                min: vec![None; len],
            },
        }
    }

    /// Record one day. Later records for the same date replace earlier ones.
    pub fn set(
        &mut self,
        date: NaiveDate,
        mean: Option<f64>,
        max: Option<f64>,
        min: Option<f64>,
    ) -> Result<&mut Self> {
        let offset = self
            .series
            .index
            .offset(date)
            .ok_or(EngineError::DateOutOfRange(date))?;
        self.series.mean[offset] = mean.filter(|v| v.is_finite());
        self.series.max[offset] = max.filter(|v| v.is_finite());
        self.series.min[offset] = min.filter(|v| v.is_finite());
        Ok(self)
    }

    /// Fill one statistic from a slice aligned with the calendar index.
    pub fn with_values(mut self, statistic: Statistic, values: &[Option<f64>]) -> Self {
        let target = match statistic {
            Statistic::Mean => &mut self.series.mean,
            Statistic::Max => &mut self.series.max,
            Statistic::Min => &mut self.series.min,
        };
        for (slot, value) in target.iter_mut().zip(values) {
            *slot = value.filter(|v| v.is_finite());
        }
        self
    }

    pub fn build(self) -> DailySeries {
        self.series
    }
}
