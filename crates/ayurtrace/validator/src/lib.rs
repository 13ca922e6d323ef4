//! AyurTrace validation engine.
//!
//! Evaluates the smart-contract-style domain rules against a proposed
//! record before the ledger admits it: a geo-fence bounding box for
//! location-bearing records and seasonal harvesting windows for
//! restricted species. Pure computation, no I/O.
//!
//! Rules are open: a record that carries no location passes the
//! geo-fence rule, and a species with no seasonal restriction passes the
//! seasonal rule. The resulting report never blocks an append — the
//! ledger stores it as the record's `validated` flag and downstream
//! consumers choose their own policy.

#![deny(unsafe_code)]

use ayurtrace_types::{
    CollectionEventDraft, GeoLocation, ProcessingStepDraft, QualityTestDraft,
};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Latitude/longitude bounding box for permitted collection regions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoFence {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl GeoFence {
    /// Approximate national bounding box of India.
    pub fn india() -> Self {
        Self {
            min_latitude: 8.0,
            max_latitude: 37.0,
            min_longitude: 68.0,
            max_longitude: 97.0,
        }
    }

    pub fn contains(&self, location: &GeoLocation) -> bool {
        location.latitude >= self.min_latitude
            && location.latitude <= self.max_latitude
            && location.longitude >= self.min_longitude
            && location.longitude <= self.max_longitude
    }
}

/// Month-of-year harvesting window for one species.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonalRule {
    pub species: String,
    /// Permitted months, 1-based (January = 1).
    pub permitted_months: Vec<u32>,
}

impl SeasonalRule {
    /// November through March, the window for winter-harvest herbs.
    pub fn winter_harvest(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            permitted_months: vec![11, 12, 1, 2, 3],
        }
    }

    fn permits(&self, month: u32) -> bool {
        self.permitted_months.contains(&month)
    }
}

/// One failed rule check, named for logging and display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleViolation {
    OutsideGeoFence { latitude: f64, longitude: f64 },
    OutOfSeason { species: String, month: u32 },
    MissingTimestamp { species: String },
}

impl std::fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleViolation::OutsideGeoFence {
                latitude,
                longitude,
            } => write!(f, "location ({latitude}, {longitude}) is outside the geo-fence"),
            RuleViolation::OutOfSeason { species, month } => {
                write!(f, "{species} may not be harvested in month {month}")
            }
            RuleViolation::MissingTimestamp { species } => {
                write!(f, "{species} is seasonally restricted but the record has no timestamp")
            }
        }
    }
}

/// Outcome of evaluating every applicable rule against one record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<RuleViolation>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// The facts a record exposes to the rule set. Absent facts pass the
/// corresponding rule.
pub trait Validatable {
    fn location(&self) -> Option<&GeoLocation> {
        None
    }

    fn species(&self) -> Option<&str> {
        None
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

impl Validatable for CollectionEventDraft {
    fn location(&self) -> Option<&GeoLocation> {
        Some(&self.location)
    }

    fn species(&self) -> Option<&str> {
        Some(&self.species)
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Some(self.occurred_at)
    }
}

impl Validatable for QualityTestDraft {
    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Some(self.occurred_at)
    }
}

impl Validatable for ProcessingStepDraft {
    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Some(self.occurred_at)
    }
}

/// Evaluates domain rules against proposed records.
pub struct ValidationEngine {
    geo_fence: GeoFence,
    seasonal: Vec<SeasonalRule>,
}

impl ValidationEngine {
    pub fn new(geo_fence: GeoFence, seasonal: Vec<SeasonalRule>) -> Self {
        Self { geo_fence, seasonal }
    }

    /// India geo-fence plus the winter-harvest restriction on
    /// Ashwagandha.
    pub fn with_defaults() -> Self {
        Self::new(
            GeoFence::india(),
            vec![SeasonalRule::winter_harvest("Ashwagandha")],
        )
    }

    pub fn add_seasonal_rule(&mut self, rule: SeasonalRule) {
        self.seasonal.push(rule);
    }

    /// Evaluate every applicable rule and collect the failures.
    pub fn validate<S: Validatable>(&self, subject: &S) -> ValidationReport {
        let mut report = ValidationReport::default();

        if let Some(location) = subject.location() {
            if !self.geo_fence.contains(location) {
                report.violations.push(RuleViolation::OutsideGeoFence {
                    latitude: location.latitude,
                    longitude: location.longitude,
                });
            }
        }

        if let Some(species) = subject.species() {
            if let Some(rule) = self.seasonal.iter().find(|rule| rule.species == species) {
                match subject.occurred_at() {
                    Some(occurred_at) => {
                        let month = occurred_at.month();
                        if !rule.permits(month) {
                            report.violations.push(RuleViolation::OutOfSeason {
                                species: species.to_string(),
                                month,
                            });
                        }
                    }
                    // A restricted species with no usable timestamp fails
                    // rather than panicking.
                    None => report.violations.push(RuleViolation::MissingTimestamp {
                        species: species.to_string(),
                    }),
                }
            }
        }

        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
