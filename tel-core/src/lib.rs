pub mod calendar;
pub mod date_range;
pub mod definition;
pub mod error;
pub mod event;
pub mod region;
pub mod series;

pub use error::{EngineError, Result};
