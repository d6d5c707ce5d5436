//! The `detect` command: build event and coverage libraries.

use crate::config::{RunArgs, RunConfig};
use crate::pipeline::{self, Inputs, RunOutput};
use crate::report::RUN_REPORT_FILE;
use clap::Args;
use log::{info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tel_core::region::Membership;
use tel_core::series::AggregationMethod;
use tel_io::writer::{
    coverage_path, events_path, write_coverage, write_events, write_rows, EVENT_COUNTS_FILE,
    EVENT_SUMMARY_FILE,
};
use tel_io::{load_membership, load_series, read_input};

#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Regional series for one aggregation method, as METHOD=PATH (repeatable)
    #[arg(short = 'r', long = "regional", value_parser = parse_regional, required = true)]
    pub regional: Vec<(AggregationMethod, PathBuf)>,

    /// County series CSV, required unless coverage is skipped
    #[arg(short = 'c', long)]
    pub counties: Option<PathBuf>,

    /// County to region membership CSV, required unless coverage is skipped
    #[arg(short = 'm', long)]
    pub membership: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long)]
    pub output: PathBuf,
}

fn parse_regional(s: &str) -> Result<(AggregationMethod, PathBuf), String> {
    let (method, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected METHOD=PATH, got {}", s))?;
    let method = method.parse::<AggregationMethod>().map_err(|e| e.to_string())?;
    Ok((method, PathBuf::from(path)))
}

pub fn run_detect(args: &DetectArgs) -> anyhow::Result<()> {
    let config = RunConfig::resolve(&args.run)?;
    let inputs = load_inputs(args, &config)?;
    let output = pipeline::run(&inputs, &config)?;
    write_outputs(&args.output, &config, &output)?;

    let report = &output.report;
    if report.has_failures() {
        warn!(
            "{} units failed, see {}",
            report.failures.len(),
            args.output.join(RUN_REPORT_FILE).display()
        );
    }
    info!(
        "Detect complete: {} events, {} annotated. Output: {}",
        report.events_detected,
        report.events_annotated,
        args.output.display()
    );
    Ok(())
}

fn load_inputs(args: &DetectArgs, config: &RunConfig) -> anyhow::Result<Inputs> {
    let index = config.index()?;

    let mut regional = BTreeMap::new();
    for (method, path) in &args.regional {
        if !config.methods.contains(method) {
            info!("Skipping {} series, method not selected", method);
            continue;
        }
        info!("Loading {} regional series from {}", method, path.display());
        regional.insert(*method, load_series(&read_input(path)?, index)?);
    }
    for method in &config.methods {
        if !regional.contains_key(method) {
            warn!("No regional series given for the {} method", method);
        }
    }

    let membership = match &args.membership {
        Some(path) => load_membership(&read_input(path)?)?,
        None if config.skip_coverage => Membership::new(),
        None => anyhow::bail!("--membership is required unless coverage is skipped"),
    };
    let counties = match &args.counties {
        _ if config.skip_coverage => BTreeMap::new(),
        Some(path) => load_series(&read_input(path)?, index)?,
        None => anyhow::bail!("--counties is required unless coverage is skipped"),
    };

    Ok(Inputs {
        index,
        regional,
        counties,
        membership,
    })
}

/// Write every table of a run into `dir`.
pub fn write_outputs(dir: &Path, config: &RunConfig, output: &RunOutput) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    for method in &config.methods {
        for definition in config.selected_definitions()? {
            let batches: Vec<_> = output.batches_for(*method, definition.id).collect();
            let events: Vec<_> = batches.iter().flat_map(|b| b.events.iter().cloned()).collect();
            write_events(&events_path(dir, *method, definition.id), &events)?;
            if !config.skip_coverage {
                let annotated: Vec<_> = batches
                    .iter()
                    .flat_map(|b| b.annotated.iter().cloned())
                    .collect();
                write_coverage(&coverage_path(dir, *method, definition.id), &annotated)?;
            }
        }
    }

    let counts = pipeline::count_rows(&output.batches, config.first_year..=config.last_year);
    write_rows(&dir.join(EVENT_COUNTS_FILE), &counts)?;
    let summaries = pipeline::summary_rows(&output.batches, !config.skip_coverage);
    write_rows(&dir.join(EVENT_SUMMARY_FILE), &summaries)?;
    output.report.write(&dir.join(RUN_REPORT_FILE))?;
    Ok(())
}
