//! AyurTrace ledger.
//!
//! The single logical owner of the four append-only traceability
//! collections: collection events, quality tests, processing steps, and
//! finished products. Appends are serialized under a write lock; reads
//! run concurrently and never observe a partially-appended record.
//!
//! Submissions flow one way: validation engine → fingerprint chain →
//! append. Validation never blocks admission — an invalid record is
//! appended with `validated = false` and downstream consumers pick their
//! own policy. Referential integrity from quality tests to collection
//! events is enforced at write time.

#![deny(unsafe_code)]

mod assemble;
mod error;
mod query;
mod store;

pub use assemble::{bundle_recent_validated, derive_qr_code, ProductBundle};
pub use error::LedgerError;
pub use query::{LedgerStats, ProvenanceTimeline, TimelineEntry, TimelineStage};
pub use store::LedgerStore;

#[cfg(test)]
pub(crate) mod test_support {
    use ayurtrace_types::{
        CollectionEventDraft, EnvironmentalConditions, GeoLocation, MaturityStage, Party, PartyId,
        ProcessingStage, ProcessingStepDraft, QualityMetrics, QualityTestDraft, RecordId,
        TestResults,
    };
    use chrono::{TimeZone, Utc};

    pub fn collection_draft(
        species: &str,
        latitude: f64,
        longitude: f64,
        month: u32,
    ) -> CollectionEventDraft {
        CollectionEventDraft {
            occurred_at: Utc.with_ymd_and_hms(2025, month, 10, 6, 0, 0).unwrap(),
            collector: Party {
                id: PartyId::new("COL001"),
                name: "Ramesh Kumar".into(),
            },
            species: species.into(),
            location: GeoLocation {
                latitude,
                longitude,
                address: "Kerala, India".into(),
            },
            quantity_kg: 25.0,
            quality: QualityMetrics {
                moisture_pct: 9.5,
                purity_pct: 98.0,
                maturity: MaturityStage::Optimal,
            },
            sustainability_score: 88,
        }
    }

    pub fn quality_draft(
        collection_event_id: RecordId,
        dna_authenticity: bool,
        alkaloid_pct: f64,
    ) -> QualityTestDraft {
        QualityTestDraft {
            occurred_at: Utc.with_ymd_and_hms(2025, 12, 12, 10, 0, 0).unwrap(),
            lab: Party {
                id: PartyId::new("LAB001"),
                name: "Central Herbal Lab".into(),
            },
            collection_event_id,
            results: TestResults {
                moisture_pct: 8.0,
                pesticide_ppm: 0.02,
                dna_authenticity,
                heavy_metals_ppm: 0.01,
                microbial_load_cfu: 200.0,
                alkaloid_pct,
            },
            certification: "AYUSH-CERTIFIED".into(),
        }
    }

    pub fn processing_draft(input_batch: &str, output_batch: &str) -> ProcessingStepDraft {
        ProcessingStepDraft {
            occurred_at: Utc.with_ymd_and_hms(2025, 12, 14, 9, 0, 0).unwrap(),
            processor: Party {
                id: PartyId::new("PROC001"),
                name: "Ayurvedic Processing Unit".into(),
            },
            stage: ProcessingStage::Drying,
            conditions: EnvironmentalConditions {
                temperature_c: 45.0,
                humidity_pct: 30.0,
                duration_hours: 24.0,
            },
            input_batch: input_batch.into(),
            output_batch: output_batch.into(),
        }
    }
}
