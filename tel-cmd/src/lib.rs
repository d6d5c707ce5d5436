//! Command implementations for the TEL CLI.
//!
//! Provides subcommands for building event libraries, inspecting threshold
//! profiles and listing the registered definitions.

use clap::Subcommand;

pub mod config;
pub mod detect;
pub mod pipeline;
pub mod report;
pub mod thresholds;

#[derive(Subcommand)]
pub enum Command {
    /// Detect events for every selected method, definition and region, then
    /// validate them against county series
    Detect(detect::DetectArgs),

    /// Write the threshold profile of one definition for every series in a file
    Thresholds(thresholds::ThresholdArgs),

    /// List the registered event definitions
    Definitions,
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Detect(args) => detect::run_detect(&args),
        Command::Thresholds(args) => thresholds::run_thresholds(&args),
        Command::Definitions => thresholds::run_definitions(),
    }
}
