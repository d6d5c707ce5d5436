use std::collections::{BTreeMap, BTreeSet};

/// County to region assignment produced by the geospatial overlay.
///
/// Iteration order is deterministic (sorted by id) so repeated runs emit
/// identical libraries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Membership {
    county_region: BTreeMap<String, String>,
}

impl Membership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a county to a region, replacing any earlier assignment.
    pub fn assign(&mut self, county: impl Into<String>, region: impl Into<String>) {
        self.county_region.insert(county.into(), region.into());
    }

    pub fn region_of(&self, county: &str) -> Option<&str> {
        self.county_region.get(county).map(String::as_str)
    }

    /// Counties mapped to a region, sorted by id.
    pub fn counties_in(&self, region: &str) -> Vec<&str> {
        self.county_region
            .iter()
            .filter(|(_, r)| r.as_str() == region)
            .map(|(county, _)| county.as_str())
            .collect()
    }

    /// Distinct regions, sorted by id.
    pub fn regions(&self) -> Vec<&str> {
        self.county_region
            .values()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.county_region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.county_region.is_empty()
    }
}

impl<C: Into<String>, R: Into<String>> FromIterator<(C, R)> for Membership {
    fn from_iter<T: IntoIterator<Item = (C, R)>>(iter: T) -> Self {
        let mut membership = Membership::new();
        for (county, region) in iter {
            membership.assign(county, region);
        }
        membership
    }
}
