//! File input and output for thermal event runs.
//!
//! Inputs are CSV files, plain or gzip-compressed, read fully into memory
//! before any processing starts:
//!
//! - **Regional series**: `region,date,mean,max,min`, one file per aggregation method
//! - **County series**: `county,date,mean,max,min`
//! - **Membership**: `county,region`
//!
//! Outputs are CSV tables written through the row types in [`models`].
//!
//! # Usage
//!
//! ```rust
//! use tel_core::calendar::CalendarIndex;
//! use tel_io::loader::load_series;
//!
//! let index = CalendarIndex::new(2001, 2001).unwrap();
//! let csv = "region,date,mean,max,min\nSRSE,2001-07-01,28.1,34.0,22.5\n";
//! let series = load_series(csv, index).unwrap();
//! assert_eq!(series["SRSE"].valid_days(tel_core::series::Statistic::Max), 1);
//! ```

pub mod loader;
pub mod models;
pub mod writer;

pub use loader::{load_membership, load_series, read_input};
