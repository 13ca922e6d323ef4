//! AyurTrace domain records.
//!
//! The four append-only record kinds of the traceability ledger, their
//! submission drafts, and the display scoring heuristics. Records are
//! immutable once admitted; a draft carries everything the caller supplies
//! and the ledger adds identity, fingerprint, admission instant, and the
//! validation flag.

#![deny(unsafe_code)]

pub mod score;

use ayurtrace_fingerprint::Fingerprint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of one ledger record, unique for the store lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a participating party (collector, lab, processor).
///
/// Authorship attribution only; the surrounding identity provider is out
/// of scope and simply supplies this string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyId(pub String);

impl PartyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A party with its display name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
}

/// Geographic origin of a collection event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

/// Maturity of the harvested material at collection time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaturityStage {
    Immature,
    Optimal,
    Mature,
    OverMature,
}

/// Field-side quality readings taken at collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub moisture_pct: f64,
    pub purity_pct: f64,
    pub maturity: MaturityStage,
}

/// Lab result bundle for one quality test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResults {
    pub moisture_pct: f64,
    pub pesticide_ppm: f64,
    pub dna_authenticity: bool,
    pub heavy_metals_ppm: f64,
    pub microbial_load_cfu: f64,
    pub alkaloid_pct: f64,
}

/// Environmental conditions recorded for a processing step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalConditions {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub duration_hours: f64,
}

/// The enumerated transformation stages a batch can pass through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStage {
    #[serde(rename = "Cleaning & Sorting")]
    CleaningSorting,
    Drying,
    Grinding,
    Sieving,
    Storage,
    Packaging,
    #[serde(rename = "Quality Control")]
    QualityControl,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ProcessingStage::CleaningSorting => "Cleaning & Sorting",
            ProcessingStage::Drying => "Drying",
            ProcessingStage::Grinding => "Grinding",
            ProcessingStage::Sieving => "Sieving",
            ProcessingStage::Storage => "Storage",
            ProcessingStage::Packaging => "Packaging",
            ProcessingStage::QualityControl => "Quality Control",
        };
        write!(f, "{label}")
    }
}

/// Final-quality summary attached to a finished product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalQuality {
    pub overall_score: u8,
    pub certifications: Vec<String>,
}

// ── Drafts ──────────────────────────────────────────────────────────

/// Caller-supplied content for one harvest/collection action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionEventDraft {
    pub occurred_at: DateTime<Utc>,
    pub collector: Party,
    pub species: String,
    pub location: GeoLocation,
    pub quantity_kg: f64,
    pub quality: QualityMetrics,
    pub sustainability_score: u8,
}

/// Caller-supplied content for one lab test against a collection event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityTestDraft {
    pub occurred_at: DateTime<Utc>,
    pub lab: Party,
    pub collection_event_id: RecordId,
    pub results: TestResults,
    pub certification: String,
}

/// Caller-supplied content for one transformation stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStepDraft {
    pub occurred_at: DateTime<Utc>,
    pub processor: Party,
    pub stage: ProcessingStage,
    pub conditions: EnvironmentalConditions,
    pub input_batch: String,
    pub output_batch: String,
}

/// Caller-supplied content for a finished product.
///
/// The constituent records are denormalized copies, not references, so a
/// product remains self-describing even as the ledger grows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub batch_id: String,
    pub product_name: String,
    pub manufacturer: String,
    pub collection_events: Vec<CollectionEvent>,
    pub quality_tests: Vec<QualityTest>,
    pub processing_steps: Vec<ProcessingStep>,
    pub final_quality: FinalQuality,
    pub created_at: DateTime<Utc>,
}

// ── Admitted records ────────────────────────────────────────────────

/// One admitted harvest/collection action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionEvent {
    pub id: RecordId,
    pub occurred_at: DateTime<Utc>,
    pub collector: Party,
    pub species: String,
    pub location: GeoLocation,
    pub quantity_kg: f64,
    pub quality: QualityMetrics,
    pub sustainability_score: u8,
    pub fingerprint: Fingerprint,
    pub prev_fingerprint: Option<Fingerprint>,
    pub admitted_at: DateTime<Utc>,
    pub validated: bool,
}

/// One admitted lab test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityTest {
    pub id: RecordId,
    pub occurred_at: DateTime<Utc>,
    pub lab: Party,
    pub collection_event_id: RecordId,
    pub results: TestResults,
    pub certification: String,
    pub fingerprint: Fingerprint,
    pub prev_fingerprint: Option<Fingerprint>,
    pub admitted_at: DateTime<Utc>,
    pub validated: bool,
}

/// One admitted transformation stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStep {
    pub id: RecordId,
    pub occurred_at: DateTime<Utc>,
    pub processor: Party,
    pub stage: ProcessingStage,
    pub conditions: EnvironmentalConditions,
    pub input_batch: String,
    pub output_batch: String,
    pub fingerprint: Fingerprint,
    pub prev_fingerprint: Option<Fingerprint>,
    pub admitted_at: DateTime<Utc>,
    pub validated: bool,
}

/// One admitted finished product, queryable by id or QR code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub qr_code: String,
    pub batch_id: String,
    pub product_name: String,
    pub manufacturer: String,
    pub collection_events: Vec<CollectionEvent>,
    pub quality_tests: Vec<QualityTest>,
    pub processing_steps: Vec<ProcessingStep>,
    pub final_quality: FinalQuality,
    pub created_at: DateTime<Utc>,
    pub fingerprint: Fingerprint,
    pub prev_fingerprint: Option<Fingerprint>,
    pub admitted_at: DateTime<Utc>,
}

/// The four record kinds held by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Collection,
    QualityTest,
    Processing,
    Product,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Collection => "collection-event",
            RecordKind::QualityTest => "quality-test",
            RecordKind::Processing => "processing-step",
            RecordKind::Product => "product",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A record of any kind, tagged; the generic lookup surface returns this
/// instead of an untyped blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerRecord {
    Collection(CollectionEvent),
    QualityTest(QualityTest),
    Processing(ProcessingStep),
    Product(Product),
}

impl LedgerRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            LedgerRecord::Collection(_) => RecordKind::Collection,
            LedgerRecord::QualityTest(_) => RecordKind::QualityTest,
            LedgerRecord::Processing(_) => RecordKind::Processing,
            LedgerRecord::Product(_) => RecordKind::Product,
        }
    }

    pub fn id(&self) -> &RecordId {
        match self {
            LedgerRecord::Collection(event) => &event.id,
            LedgerRecord::QualityTest(test) => &test.id,
            LedgerRecord::Processing(step) => &step.id,
            LedgerRecord::Product(product) => &product.id,
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            LedgerRecord::Collection(event) => &event.fingerprint,
            LedgerRecord::QualityTest(test) => &test.fingerprint,
            LedgerRecord::Processing(step) => &step.fingerprint,
            LedgerRecord::Product(product) => &product.fingerprint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ids_are_distinct() {
        assert_ne!(RecordId::generate(), RecordId::generate());
    }

    #[test]
    fn processing_stage_serializes_to_display_labels() {
        let json = serde_json::to_string(&ProcessingStage::CleaningSorting).unwrap();
        assert_eq!(json, "\"Cleaning & Sorting\"");
        let parsed: ProcessingStage = serde_json::from_str("\"Quality Control\"").unwrap();
        assert_eq!(parsed, ProcessingStage::QualityControl);
    }

    #[test]
    fn maturity_stage_uses_kebab_case() {
        let json = serde_json::to_string(&MaturityStage::OverMature).unwrap();
        assert_eq!(json, "\"over-mature\"");
    }
}
