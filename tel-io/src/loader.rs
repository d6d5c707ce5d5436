//! CSV loaders for daily series and county membership.
//!
//! Each loader parses CSV data from a string slice; [`read_input`] gets that
//! string from disk, inflating `.gz` files on the way.
//!
//! # CSV Formats
//!
//! - **Series** (has headers): `id,date(YYYY-MM-DD),mean,max,min`
//! - **Membership** (has headers): `county,region`

use anyhow::Context;
use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tel_core::calendar::CalendarIndex;
use tel_core::region::Membership;
use tel_core::series::{DailySeries, DailySeriesBuilder};
use tel_core::EngineError;
use tel_utils::dates::parse_date;

/// Read a whole input file, decompressing it when the name ends in `.gz`.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut contents = String::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(file)
            .read_to_string(&mut contents)
            .with_context(|| format!("inflating {}", path.display()))?;
    } else {
        let mut file = file;
        file.read_to_string(&mut contents)
            .with_context(|| format!("reading {}", path.display()))?;
    }
    Ok(contents)
}

/// Load daily series keyed by their id column.
///
/// Expected format (with headers): `id,date,mean,max,min`, where `id` is a
/// region or a county. Empty or non-numeric values load as missing. Rows
/// without an id or a parseable date are skipped, as are rows outside the
/// record span of `index`.
///
/// # Example CSV
/// ```text
/// region,date,mean,max,min
/// SRSE,1980-07-01,28.1,34.0,22.5
/// SRSE,1980-07-02,,35.2,
/// ```
pub fn load_series(
    csv_data: &str,
    index: CalendarIndex,
) -> anyhow::Result<BTreeMap<String, DailySeries>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let mut builders: BTreeMap<String, DailySeriesBuilder> = BTreeMap::new();
    let mut count = 0u32;
    let mut skipped = 0u32;
    let mut out_of_range = 0u32;
    for result in rdr.records() {
        let r = result?;
        let id = r.get(0).unwrap_or("").trim();
        let date = match parse_date(r.get(1).unwrap_or("")) {
            Ok(date) if !id.is_empty() => date,
            _ => {
                skipped += 1;
                continue;
            }
        };
        let value = |column: usize| r.get(column).and_then(|s| s.trim().parse::<f64>().ok());

        let builder = builders
            .entry(id.to_string())
            .or_insert_with(|| DailySeriesBuilder::new(id, index));
        match builder.set(date, value(2), value(3), value(4)) {
            Ok(_) => count += 1,
            Err(EngineError::DateOutOfRange(_)) => out_of_range += 1,
            Err(e) => return Err(e.into()),
        }
    }
    log::info!(
        "loader: Loaded {} rows for {} series, skipped {} malformed and {} outside {}-{}",
        count,
        builders.len(),
        skipped,
        out_of_range,
        index.first_year(),
        index.last_year()
    );
    Ok(builders
        .into_iter()
        .map(|(id, builder)| (id, builder.build()))
        .collect())
}

/// Load the county to region assignment.
///
/// Expected format (with headers): `county,region`. Rows missing either
/// column are skipped. A county listed twice keeps its last region, and the
/// reassignment is logged.
///
/// # Example CSV
/// ```text
/// county,region
/// 06001,WECC_CA
/// 06003,WECC_CA
/// ```
pub fn load_membership(csv_data: &str) -> anyhow::Result<Membership> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let mut membership = Membership::new();
    let mut skipped = 0u32;
    for result in rdr.records() {
        let r = result?;
        let county = r.get(0).unwrap_or("").trim();
        let region = r.get(1).unwrap_or("").trim();
        if county.is_empty() || region.is_empty() {
            skipped += 1;
            continue;
        }
        if let Some(previous) = membership.region_of(county) {
            if previous != region {
                log::warn!(
                    "loader: County {} reassigned from {} to {}",
                    county,
                    previous,
                    region
                );
            }
        }
        membership.assign(county, region);
    }
    log::info!(
        "loader: Loaded {} counties in {} regions, skipped {}",
        membership.len(),
        membership.regions().len(),
        skipped
    );
    Ok(membership)
}
