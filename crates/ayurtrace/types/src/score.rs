//! Display scoring heuristics.
//!
//! These are presentation-layer numbers, not validation gates. The
//! weights and thresholds are fixed product constants and downstream
//! displays depend on them verbatim.

use crate::{QualityTest, TestResults};

/// Pesticide residue at or below this level counts as clean.
pub const PESTICIDE_CLEAN_MAX_PPM: f64 = 0.1;

/// Heavy-metal content at or below this level counts as clean.
pub const HEAVY_METALS_CLEAN_MAX_PPM: f64 = 0.05;

/// Microbial load at or below this level counts as clean.
pub const MICROBIAL_CLEAN_MAX_CFU: f64 = 1000.0;

/// Moisture above this level costs sustainability points.
pub const MOISTURE_SAFE_MAX_PCT: f64 = 12.0;

/// Score for a single quality test, out of 100.
///
/// DNA authenticity 30, each clean contaminant check 20, plus an
/// alkaloid-content contribution scaled by 10 and capped at 10.
pub fn test_score(results: &TestResults) -> f64 {
    let mut score = 0.0;
    if results.dna_authenticity {
        score += 30.0;
    }
    if results.pesticide_ppm <= PESTICIDE_CLEAN_MAX_PPM {
        score += 20.0;
    }
    if results.heavy_metals_ppm <= HEAVY_METALS_CLEAN_MAX_PPM {
        score += 20.0;
    }
    if results.microbial_load_cfu <= MICROBIAL_CLEAN_MAX_CFU {
        score += 20.0;
    }
    score += (results.alkaloid_pct * 10.0).min(10.0);
    score
}

/// Overall product score: arithmetic mean of its tests' scores, rounded
/// to the nearest integer. A product without tests scores zero.
pub fn overall_score(tests: &[QualityTest]) -> u8 {
    if tests.is_empty() {
        return 0;
    }
    let total: f64 = tests.iter().map(|test| test_score(&test.results)).sum();
    (total / tests.len() as f64).round() as u8
}

/// Sustainability score for a tested batch: start at 100 and deduct for
/// each exceeded threshold, floored at zero.
pub fn sustainability_score(results: &TestResults) -> u8 {
    let mut score: i32 = 100;
    if results.pesticide_ppm > PESTICIDE_CLEAN_MAX_PPM {
        score -= 20;
    }
    if results.heavy_metals_ppm > HEAVY_METALS_CLEAN_MAX_PPM {
        score -= 15;
    }
    if results.moisture_pct > MOISTURE_SAFE_MAX_PCT {
        score -= 10;
    }
    if !results.dna_authenticity {
        score -= 25;
    }
    score.max(0) as u8
}
