//! Run configuration.
//!
//! A run is configured from an optional TOML file; command-line flags given
//! explicitly take precedence over the file.
//!
//! ```toml
//! first_year = 1980
//! last_year = 2024
//! definitions = [1, 6, 8, 12]
//! methods = ["unweighted", "population"]
//! half_window = 7
//! leap_day = "reuse_day365"
//! skip_coverage = false
//! ```

use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tel_core::calendar::{CalendarIndex, DEFAULT_FIRST_YEAR, DEFAULT_LAST_YEAR};
use tel_core::definition::{definition, Definition, DEFINITIONS, ROLLING_HALF_WINDOW};
use tel_core::series::AggregationMethod;
use tel_data::threshold::{LeapDayPolicy, RollingOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub first_year: i32,
    pub last_year: i32,
    /// Definition ids to run.
    pub definitions: Vec<u8>,
    pub methods: Vec<AggregationMethod>,
    pub half_window: usize,
    pub leap_day: LeapDayPolicy,
    /// Detect events only, without county re-validation.
    pub skip_coverage: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            first_year: DEFAULT_FIRST_YEAR,
            last_year: DEFAULT_LAST_YEAR,
            definitions: DEFINITIONS.iter().map(|d| d.id).collect(),
            methods: AggregationMethod::ALL.to_vec(),
            half_window: ROLLING_HALF_WINDOW,
            leap_day: LeapDayPolicy::default(),
            skip_coverage: false,
        }
    }
}

impl RunConfig {
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("parsing config {}", path.display()))
    }

    /// The file named by `--config` (or the defaults) with the remaining
    /// flags applied on top.
    pub fn resolve(args: &RunArgs) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(args);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&mut self, args: &RunArgs) {
        if let Some(first_year) = args.first_year {
            self.first_year = first_year;
        }
        if let Some(last_year) = args.last_year {
            self.last_year = last_year;
        }
        if !args.definitions.is_empty() {
            self.definitions = args.definitions.clone();
        }
        if !args.methods.is_empty() {
            self.methods = args.methods.clone();
        }
        if let Some(half_window) = args.half_window {
            self.half_window = half_window;
        }
        if args.reuse_day_365 {
            self.leap_day = LeapDayPolicy::ReuseDay365;
        }
        if args.skip_coverage {
            self.skip_coverage = true;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.index()?;
        self.selected_definitions()?;
        if self.methods.is_empty() {
            anyhow::bail!("no aggregation methods selected");
        }
        Ok(())
    }

    pub fn index(&self) -> anyhow::Result<CalendarIndex> {
        Ok(CalendarIndex::new(self.first_year, self.last_year)?)
    }

    pub fn rolling_options(&self) -> RollingOptions {
        RollingOptions {
            half_window: self.half_window,
            leap_day: self.leap_day,
        }
    }

    pub fn selected_definitions(&self) -> anyhow::Result<Vec<&'static Definition>> {
        if self.definitions.is_empty() {
            anyhow::bail!("no definitions selected");
        }
        let mut selected = Vec::with_capacity(self.definitions.len());
        for id in &self.definitions {
            selected.push(definition(*id)?);
        }
        selected.sort_by_key(|d| d.id);
        selected.dedup_by_key(|d| d.id);
        Ok(selected)
    }
}

/// Flags shared by every subcommand that runs the engine.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// TOML run configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// First year of the record
    #[arg(long)]
    pub first_year: Option<i32>,

    /// Last year of the record
    #[arg(long)]
    pub last_year: Option<i32>,

    /// Definition ids to run, comma separated (default: all)
    #[arg(short = 'd', long, value_delimiter = ',')]
    pub definitions: Vec<u8>,

    /// Aggregation methods to run, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    pub methods: Vec<AggregationMethod>,

    /// Days pooled on each side of a calendar day for rolling thresholds
    #[arg(long)]
    pub half_window: Option<usize>,

    /// Let day 366 fall back to the day 365 threshold when its own is undefined
    #[arg(long)]
    pub reuse_day_365: bool,

    /// Skip county re-validation
    #[arg(long)]
    pub skip_coverage: bool,
}
