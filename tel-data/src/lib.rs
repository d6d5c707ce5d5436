//! Event detection and spatial-coverage validation.
//!
//! This crate turns daily regional series into threshold profiles, runs the
//! three definition families over them, and re-checks every event county by
//! county.

pub mod coverage;
pub mod detect;
pub mod merge;
pub mod quantile;
pub mod summary;
pub mod threshold;
