//! The `thresholds` and `definitions` commands.

use crate::config::{RunArgs, RunConfig};
use crate::pipeline::threshold_profiles;
use clap::Args;
use log::{info, warn};
use std::path::PathBuf;
use tel_core::definition::{definition, Criterion, DEFINITIONS};
use tel_io::writer::write_thresholds;
use tel_io::{load_series, read_input};

#[derive(Args, Debug, Clone)]
pub struct ThresholdArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Regional (or county) series CSV
    #[arg(short = 's', long)]
    pub series: PathBuf,

    /// Definition id whose thresholds to compute
    #[arg(long = "for")]
    pub for_definition: u8,

    /// Output CSV path
    #[arg(short = 'o', long)]
    pub output: PathBuf,
}

pub fn run_thresholds(args: &ThresholdArgs) -> anyhow::Result<()> {
    let config = RunConfig::resolve(&args.run)?;
    let definition = definition(args.for_definition)?;
    let series = load_series(&read_input(&args.series)?, config.index()?)?;

    let profiles = threshold_profiles(&series, definition, &config.rolling_options())?;
    let undefined = profiles.iter().filter(|(_, p)| p.is_undefined()).count();
    if undefined > 0 {
        warn!("{} of {} series have undefined thresholds", undefined, profiles.len());
    }
    write_thresholds(&args.output, &profiles)?;
    info!(
        "Thresholds for {} over {} series written to {}",
        definition,
        profiles.len(),
        args.output.display()
    );
    Ok(())
}

/// One line per registered definition.
pub fn definition_table() -> Vec<String> {
    DEFINITIONS
        .iter()
        .map(|d| {
            let mode = match d.criterion {
                Criterion::Fixed { .. } => "fixed",
                Criterion::Growable { .. } => "dual",
                Criterion::Calendar { .. } => "calendar",
            };
            let levels: Vec<String> = d.quantiles().iter().map(|q| format!("q{}", q)).collect();
            let criterion = format!("{} {}", mode, levels.join("/"));
            format!(
                "{:02}  {:?}  {:<4}  {:<18}  min {}  {}",
                d.id,
                d.family(),
                d.statistic.as_str(),
                criterion,
                d.min_run,
                d.name
            )
        })
        .collect()
}

pub fn run_definitions() -> anyhow::Result<()> {
    for line in definition_table() {
        println!("{}", line);
    }
    Ok(())
}
