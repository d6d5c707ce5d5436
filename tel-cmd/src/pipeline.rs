//! Parallel run pipeline.
//!
//! Detection units are (method, definition, region) triples and validation
//! units are single events. Both kinds run on the rayon pool against the
//! read-only [`Inputs`]; every unit yields its own batch or a
//! [`UnitFailure`], and nothing is shared between units while they run.

use crate::config::RunConfig;
use crate::report::{RunReport, Stage, UnitFailure};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use tel_core::calendar::CalendarIndex;
use tel_core::definition::Definition;
use tel_core::event::{AnnotatedEvent, Event};
use tel_core::region::Membership;
use tel_core::series::{AggregationMethod, DailySeries};
use tel_core::EngineError;
use tel_data::coverage::annotate;
use tel_data::detect::Detector;
use tel_data::summary::{year_counts, EventSummary};
use tel_data::threshold::{compute_profile, RollingOptions, ThresholdProfile};
use tel_io::models::{CountRow, SummaryRow};

/// Everything a run reads, loaded once up front.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub index: CalendarIndex,
    pub regional: BTreeMap<AggregationMethod, BTreeMap<String, DailySeries>>,
    pub counties: BTreeMap<String, DailySeries>,
    pub membership: Membership,
}

impl Inputs {
    /// Regions named by the membership or by any regional series, sorted.
    pub fn regions(&self) -> Vec<String> {
        let mut regions: BTreeSet<&str> = self.membership.regions().into_iter().collect();
        for by_region in self.regional.values() {
            regions.extend(by_region.keys().map(String::as_str));
        }
        regions.into_iter().map(str::to_string).collect()
    }

    /// County series of every member county of a region. A member county
    /// without a series is a `MissingInput`, so coverage is always taken over
    /// the full membership.
    fn county_series(&self, region: &str) -> tel_core::Result<Vec<&DailySeries>> {
        let members = self.membership.counties_in(region);
        let missing: Vec<&str> = members
            .iter()
            .copied()
            .filter(|county| !self.counties.contains_key(*county))
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::MissingInput(format!(
                "county series for {} of {} counties in region {}: {}",
                missing.len(),
                members.len(),
                region,
                missing.join(", ")
            )));
        }
        Ok(members
            .into_iter()
            .filter_map(|county| self.counties.get(county))
            .collect())
    }
}

/// Output of one detection unit, plus its validated events once coverage
/// has run.
#[derive(Debug, Clone)]
pub struct Batch {
    pub method: AggregationMethod,
    pub definition: &'static Definition,
    pub region: String,
    pub profile: ThresholdProfile,
    pub events: Vec<Event>,
    pub annotated: Vec<AnnotatedEvent>,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Ordered by method, definition id, then region.
    pub batches: Vec<Batch>,
    pub report: RunReport,
}

impl RunOutput {
    /// Batches of one (method, definition) pair, in region order.
    pub fn batches_for(
        &self,
        method: AggregationMethod,
        definition: u8,
    ) -> impl Iterator<Item = &Batch> {
        self.batches
            .iter()
            .filter(move |batch| batch.method == method && batch.definition.id == definition)
    }
}

pub fn run(inputs: &Inputs, config: &RunConfig) -> anyhow::Result<RunOutput> {
    let definitions = config.selected_definitions()?;
    let options = config.rolling_options();
    let regions = inputs.regions();

    let mut units: Vec<(AggregationMethod, &'static Definition, &str)> = Vec::new();
    for method in &config.methods {
        for definition in &definitions {
            for region in &regions {
                units.push((*method, *definition, region.as_str()));
            }
        }
    }
    info!(
        "pipeline: {} detection units ({} methods, {} definitions, {} regions)",
        units.len(),
        config.methods.len(),
        definitions.len(),
        regions.len()
    );

    let results: Vec<Result<Batch, UnitFailure>> = units
        .par_iter()
        .map(|&(method, definition, region)| {
            detect_unit(inputs, method, definition, region, &options).map_err(|e| {
                UnitFailure::new(Stage::Detection, method, definition.id, region, &e)
            })
        })
        .collect();

    let mut report = RunReport {
        detection_units: units.len(),
        ..RunReport::default()
    };
    let mut batches = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(batch) => {
                report.detection_succeeded += 1;
                report.events_detected += batch.events.len();
                batches.push(batch);
            }
            Err(failure) => {
                warn!(
                    "pipeline: detection failed for {} def{:02} {}: {}",
                    failure.method, failure.definition, failure.region, failure.message
                );
                report.failures.push(failure);
            }
        }
    }
    info!(
        "pipeline: {} of {} detection units succeeded, {} events",
        report.detection_succeeded, report.detection_units, report.events_detected
    );

    if config.skip_coverage {
        info!("pipeline: coverage validation skipped");
    } else {
        validate(inputs, &mut batches, &mut report);
    }
    Ok(RunOutput { batches, report })
}

fn detect_unit(
    inputs: &Inputs,
    method: AggregationMethod,
    definition: &'static Definition,
    region: &str,
    options: &RollingOptions,
) -> tel_core::Result<Batch> {
    let series = inputs
        .regional
        .get(&method)
        .and_then(|by_region| by_region.get(region))
        .ok_or_else(|| {
            EngineError::MissingInput(format!("{} series for region {}", method, region))
        })?;
    let profile = compute_profile(series, definition, options)?;
    let events = Detector::for_definition(definition, &profile)?.detect(series);
    debug!(
        "pipeline: {} {} {}: {} events",
        method,
        definition,
        region,
        events.len()
    );
    Ok(Batch {
        method,
        definition,
        region: region.to_string(),
        profile,
        events,
        annotated: Vec::new(),
    })
}

fn validate(inputs: &Inputs, batches: &mut [Batch], report: &mut RunReport) {
    let shared: &[Batch] = batches;
    let counties: BTreeMap<&str, tel_core::Result<Vec<&DailySeries>>> = shared
        .iter()
        .map(|batch| (batch.region.as_str(), inputs.county_series(&batch.region)))
        .collect();
    for (region, series) in &counties {
        if let Err(e) = series {
            warn!("pipeline: coverage unavailable for {}: {}", region, e);
        }
    }
    let jobs: Vec<(usize, &Event)> = shared
        .iter()
        .enumerate()
        .flat_map(|(b, batch)| batch.events.iter().map(move |event| (b, event)))
        .collect();
    report.validation_units = jobs.len();

    let results: Vec<(usize, Result<AnnotatedEvent, UnitFailure>)> = jobs
        .par_iter()
        .map(|&(b, event)| {
            let batch = &shared[b];
            let result = match counties.get(batch.region.as_str()) {
                Some(Ok(region_counties)) => {
                    annotate(event, batch.definition, &batch.profile, region_counties)
                }
                Some(Err(e)) => Err(e.clone()),
                None => annotate(event, batch.definition, &batch.profile, &[]),
            }
            .map_err(|e| {
                UnitFailure::new(
                    Stage::Validation,
                    batch.method,
                    batch.definition.id,
                    &batch.region,
                    &e,
                )
                .for_event(event.start)
            });
            (b, result)
        })
        .collect();

    for (b, result) in results {
        match result {
            Ok(annotated) => {
                report.events_annotated += 1;
                batches[b].annotated.push(annotated);
            }
            Err(failure) => {
                debug!(
                    "pipeline: validation failed for {} def{:02} {}: {}",
                    failure.method, failure.definition, failure.region, failure.message
                );
                report.failures.push(failure);
            }
        }
    }
    let failed = report.validation_units - report.events_annotated;
    if failed > 0 {
        warn!(
            "pipeline: {} of {} events could not be validated",
            failed, report.validation_units
        );
    }
    info!("pipeline: {} events annotated with coverage", report.events_annotated);
}

/// Profiles of one definition for every series, computed in parallel.
pub fn threshold_profiles(
    series: &BTreeMap<String, DailySeries>,
    definition: &Definition,
    options: &RollingOptions,
) -> tel_core::Result<Vec<(String, ThresholdProfile)>> {
    series
        .par_iter()
        .map(|(id, series)| Ok((id.clone(), compute_profile(series, definition, options)?)))
        .collect()
}

/// Per-year event counts for every batch, years without events included.
pub fn count_rows(batches: &[Batch], years: RangeInclusive<i32>) -> Vec<CountRow> {
    batches
        .iter()
        .flat_map(|batch| {
            year_counts(&batch.events, years.clone())
                .into_iter()
                .map(move |(year, events)| CountRow {
                    method: batch.method,
                    definition: batch.definition.id,
                    region: batch.region.clone(),
                    year,
                    events,
                })
        })
        .collect()
}

/// One summary row per batch; `record_holder` is decided within each
/// (method, definition) pair.
pub fn summary_rows(batches: &[Batch], with_coverage: bool) -> Vec<SummaryRow> {
    let summaries: Vec<EventSummary> = batches
        .iter()
        .map(|batch| {
            let direction = batch.definition.direction;
            if with_coverage {
                EventSummary::from_annotated(&batch.region, &batch.annotated, direction)
            } else {
                EventSummary::from_events(&batch.region, &batch.events, direction)
            }
        })
        .collect();

    batches
        .iter()
        .zip(&summaries)
        .map(|(batch, summary)| {
            let peers: Vec<EventSummary> = batches
                .iter()
                .zip(&summaries)
                .filter(|(other, _)| {
                    other.method == batch.method && other.definition.id == batch.definition.id
                })
                .map(|(_, other)| other.clone())
                .collect();
            let record_holder = summary.is_most_extreme_in(&peers, batch.definition.direction);
            SummaryRow::new(batch.method, batch.definition.id, summary, record_holder)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tel_core::series::{DailySeriesBuilder, Statistic};

    /// 1981-1985 with days 100-104 of 1983 raised 10 degrees above a flat
    /// 20 degree mean; the raised days peak at `peak`.
    fn spiked(id: &str, index: CalendarIndex, peak: f64) -> DailySeries {
        let spike = index.year_span(1983).unwrap().start + 99;
        let mut mean = vec![Some(20.0); index.len()];
        let mut max = vec![Some(26.0); index.len()];
        for offset in spike..spike + 5 {
            mean[offset] = Some(30.0);
            max[offset] = Some(peak);
        }
        DailySeriesBuilder::new(id, index)
            .with_values(Statistic::Mean, &mean)
            .with_values(Statistic::Max, &max)
            .with_values(Statistic::Min, &vec![Some(12.0); index.len()])
            .build()
    }

    fn flat(id: &str, index: CalendarIndex) -> DailySeries {
        DailySeriesBuilder::new(id, index)
            .with_values(Statistic::Mean, &vec![Some(20.0); index.len()])
            .build()
    }

    /// SRSE has a series and two counties, RFCW has a county but no
    /// series, NPCC has a series but no counties.
    fn inputs() -> Inputs {
        let index = CalendarIndex::new(1981, 1985).unwrap();
        let mut by_region = BTreeMap::new();
        by_region.insert("SRSE".to_string(), spiked("SRSE", index, 39.5));
        by_region.insert("NPCC".to_string(), spiked("NPCC", index, 37.0));
        let mut regional = BTreeMap::new();
        regional.insert(AggregationMethod::Unweighted, by_region);

        let mut counties = BTreeMap::new();
        counties.insert("c1".to_string(), spiked("c1", index, 39.5));
        counties.insert("c2".to_string(), flat("c2", index));
        counties.insert("c3".to_string(), flat("c3", index));

        let membership: Membership = [("c1", "SRSE"), ("c2", "SRSE"), ("c3", "RFCW")]
            .into_iter()
            .collect();
        Inputs {
            index,
            regional,
            counties,
            membership,
        }
    }

    fn config(skip_coverage: bool) -> RunConfig {
        RunConfig {
            first_year: 1981,
            last_year: 1985,
            definitions: vec![1],
            methods: vec![AggregationMethod::Unweighted],
            skip_coverage,
            ..RunConfig::default()
        }
    }

    #[test]
    fn regions_come_from_membership_and_series() {
        assert_eq!(inputs().regions(), vec!["NPCC", "RFCW", "SRSE"]);
    }

    #[test]
    fn run_records_failures_without_aborting() {
        let output = run(&inputs(), &config(false)).unwrap();
        let report = &output.report;
        assert_eq!(report.detection_units, 3);
        assert_eq!(report.detection_succeeded, 2);
        assert_eq!(report.events_detected, 2);
        assert_eq!(report.validation_units, 2);
        assert_eq!(report.events_annotated, 1);

        let kinds: Vec<(&str, &str)> = report
            .failures
            .iter()
            .map(|f| (f.region.as_str(), f.kind))
            .collect();
        assert!(kinds.contains(&("RFCW", "missing_input")));
        assert!(kinds.contains(&("NPCC", "degenerate_region")));
        let degenerate = report.failures.iter().find(|f| f.region == "NPCC").unwrap();
        assert_eq!(degenerate.stage, Stage::Validation);
        assert_eq!(degenerate.event_start, NaiveDate::from_yo_opt(1983, 100));

        let srse = output.batches.iter().find(|b| b.region == "SRSE").unwrap();
        assert_eq!(srse.events.len(), 1);
        assert_eq!(srse.events[0].duration, 5);
        assert_eq!(srse.annotated.len(), 1);
        assert!((srse.annotated[0].coverage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn missing_method_fails_every_unit_of_it() {
        let config = RunConfig {
            methods: vec![AggregationMethod::Unweighted, AggregationMethod::AreaWeighted],
            ..config(true)
        };
        let output = run(&inputs(), &config).unwrap();
        assert_eq!(output.report.detection_units, 6);
        let area_failures = output
            .report
            .failures
            .iter()
            .filter(|f| f.method == AggregationMethod::AreaWeighted)
            .count();
        assert_eq!(area_failures, 3);
        assert_eq!(output.batches_for(AggregationMethod::AreaWeighted, 1).count(), 0);
        assert_eq!(output.batches_for(AggregationMethod::Unweighted, 1).count(), 2);
    }

    #[test]
    fn skipping_coverage_leaves_events_unannotated() {
        let output = run(&inputs(), &config(true)).unwrap();
        assert_eq!(output.report.validation_units, 0);
        assert!(output.batches.iter().all(|b| b.annotated.is_empty()));
        assert_eq!(output.report.failures.len(), 1);
    }

    #[test]
    fn counts_cover_every_year() {
        let output = run(&inputs(), &config(true)).unwrap();
        let rows = count_rows(&output.batches, 1981..=1985);
        assert_eq!(rows.len(), 10);
        let srse_1983 = rows
            .iter()
            .find(|r| r.region == "SRSE" && r.year == 1983)
            .unwrap();
        assert_eq!(srse_1983.events, 1);
        assert_eq!(rows.iter().map(|r| r.events).sum::<usize>(), 2);
    }

    #[test]
    fn summary_marks_the_record_holder() {
        let output = run(&inputs(), &config(false)).unwrap();
        let rows = summary_rows(&output.batches, false);
        assert_eq!(rows.len(), 2);
        let srse = rows.iter().find(|r| r.region == "SRSE").unwrap();
        let npcc = rows.iter().find(|r| r.region == "NPCC").unwrap();
        assert!(srse.record_holder);
        assert!(!npcc.record_holder);
        assert_eq!(srse.most_extreme, Some(39.5));

        let with_coverage = summary_rows(&output.batches, true);
        let srse = with_coverage.iter().find(|r| r.region == "SRSE").unwrap();
        assert_eq!(srse.mean_coverage, Some(50.0));
        let npcc = with_coverage.iter().find(|r| r.region == "NPCC").unwrap();
        assert_eq!(npcc.events, 0);
    }

    #[test]
    fn member_counties_without_series_fail_validation() {
        let mut inputs = inputs();
        for county in ["c4", "c5"] {
            inputs.membership.assign(county, "SRSE");
        }
        inputs.counties.remove("c2");
        let output = run(&inputs, &config(false)).unwrap();

        let srse = output.batches.iter().find(|b| b.region == "SRSE").unwrap();
        assert_eq!(srse.events.len(), 1);
        assert!(srse.annotated.is_empty());
        let failure = output
            .report
            .failures
            .iter()
            .find(|f| f.region == "SRSE")
            .unwrap();
        assert_eq!(failure.stage, Stage::Validation);
        assert_eq!(failure.kind, "missing_input");
        assert!(failure.message.contains("3 of 4 counties"));
        assert!(failure.message.contains("c2, c4, c5"));
    }

    #[test]
    fn profiles_for_every_series() {
        let inputs = inputs();
        let definition = tel_core::definition::definition(1).unwrap();
        let profiles = threshold_profiles(
            &inputs.regional[&AggregationMethod::Unweighted],
            definition,
            &RollingOptions::default(),
        )
        .unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].0, "NPCC");
        assert_eq!(profiles[0].1, ThresholdProfile::Fixed(Some(20.0)));
    }
}
