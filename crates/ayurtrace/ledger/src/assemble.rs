//! Product assembly: bundling validated collections, their tests, and
//! recent processing steps into a finished, QR-addressable product.

use ayurtrace_fingerprint::{self as fingerprint, Fingerprint};
use ayurtrace_types::{
    CollectionEvent, ProcessingStep, Product, ProductDraft, QualityTest, RecordId, RecordKind,
};
use chrono::Utc;
use tracing::info;

use crate::error::LedgerError;
use crate::store::LedgerStore;

/// The constituent records selected for one product.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductBundle {
    pub collection_events: Vec<CollectionEvent>,
    pub quality_tests: Vec<QualityTest>,
    pub processing_steps: Vec<ProcessingStep>,
}

/// QR payload issued for a product: `QR` plus the first eight id
/// characters, uppercased.
pub fn derive_qr_code(id: &RecordId) -> String {
    let prefix: String = id.0.chars().take(8).collect();
    format!("QR{}", prefix.to_uppercase())
}

impl LedgerStore {
    /// Admit a finished product: new id, derived QR code, fingerprint
    /// over the bundle, append.
    pub fn assemble_product(&self, draft: ProductDraft) -> Result<RecordId, LedgerError> {
        if draft.product_name.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "product name must not be empty".into(),
            ));
        }
        if draft.batch_id.trim().is_empty() {
            return Err(LedgerError::InvalidInput("batch id must not be empty".into()));
        }
        if draft.final_quality.overall_score > 100 {
            return Err(LedgerError::InvalidInput(
                "overall score must be at most 100".into(),
            ));
        }

        let mut state = self.write()?;
        let id = RecordId::generate();
        let qr_code = derive_qr_code(&id);
        let admitted_at = Utc::now();
        let mut product = Product {
            id: id.clone(),
            qr_code: qr_code.clone(),
            batch_id: draft.batch_id,
            product_name: draft.product_name,
            manufacturer: draft.manufacturer,
            collection_events: draft.collection_events,
            quality_tests: draft.quality_tests,
            processing_steps: draft.processing_steps,
            final_quality: draft.final_quality,
            created_at: draft.created_at,
            fingerprint: Fingerprint::ZERO,
            prev_fingerprint: state.head,
            admitted_at,
        };
        product.fingerprint = fingerprint::chained(
            RecordKind::Product.as_str(),
            product.prev_fingerprint.as_ref(),
            admitted_at,
            &product,
        )?;

        state.head = Some(product.fingerprint);
        let index = state.products.len();
        state.ids.insert(id.clone(), (RecordKind::Product, index));
        state.qr_index.insert(qr_code.clone(), index);
        state.chain.push((RecordKind::Product, index));
        info!(%id, %qr_code, "product assembled");
        state.products.push(product);
        Ok(id)
    }
}

/// The manufacturer-dashboard selection policy: the most recent
/// `max_collections` validated collections, every quality test
/// referencing them, and the last `max_steps` processing steps.
pub fn bundle_recent_validated(
    store: &LedgerStore,
    max_collections: usize,
    max_steps: usize,
) -> Result<ProductBundle, LedgerError> {
    let mut validated = store.validated_collections()?;
    let skip = validated.len().saturating_sub(max_collections);
    let collection_events = validated.split_off(skip);

    let mut quality_tests = Vec::new();
    for event in &collection_events {
        quality_tests.extend(store.quality_tests_for(&event.id)?);
    }

    let mut steps = store.processing_steps()?;
    let skip = steps.len().saturating_sub(max_steps);
    let processing_steps = steps.split_off(skip);

    Ok(ProductBundle {
        collection_events,
        quality_tests,
        processing_steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{collection_draft, processing_draft, quality_draft};
    use ayurtrace_types::{score, FinalQuality};
    use chrono::TimeZone;

    fn assembled_store() -> (LedgerStore, RecordId) {
        let store = LedgerStore::with_defaults();
        for species in ["Tulsi", "Brahmi", "Shatavari"] {
            let event_id = store
                .append_collection_event(collection_draft(species, 12.9, 77.5, 6))
                .unwrap();
            store
                .append_quality_test(quality_draft(event_id, true, 1.0))
                .unwrap();
        }
        store
            .append_processing_step(processing_draft("RAW-001", "DRY-001"))
            .unwrap();
        store
            .append_processing_step(processing_draft("DRY-001", "POW-001"))
            .unwrap();

        let bundle = bundle_recent_validated(&store, 3, 5).unwrap();
        assert_eq!(bundle.collection_events.len(), 3);
        assert_eq!(bundle.quality_tests.len(), 3);
        assert_eq!(bundle.processing_steps.len(), 2);

        let overall = score::overall_score(&bundle.quality_tests);
        let id = store
            .assemble_product(ProductDraft {
                batch_id: "BATCH-2025-001".into(),
                product_name: "Herbal Root Powder".into(),
                manufacturer: "Ayurvedic Wellness Co.".into(),
                collection_events: bundle.collection_events,
                quality_tests: bundle.quality_tests,
                processing_steps: bundle.processing_steps,
                final_quality: FinalQuality {
                    overall_score: overall,
                    certifications: vec!["AYUSH-CERTIFIED".into(), "ORGANIC".into()],
                },
                created_at: Utc.with_ymd_and_hms(2025, 12, 20, 12, 0, 0).unwrap(),
            })
            .unwrap();
        (store, id)
    }

    #[test]
    fn three_clean_tests_score_one_hundred() {
        let (store, id) = assembled_store();
        let product = store.get_product(&id).unwrap().unwrap();
        assert_eq!(product.final_quality.overall_score, 100);
        assert_eq!(score::overall_score(&product.quality_tests), 100);
    }

    #[test]
    fn qr_code_derives_from_the_product_id() {
        let (store, id) = assembled_store();
        let product = store.get_product(&id).unwrap().unwrap();
        assert_eq!(product.qr_code, derive_qr_code(&id));
        assert!(product.qr_code.starts_with("QR"));
        assert_eq!(product.qr_code.len(), 10);
    }

    #[test]
    fn qr_lookup_returns_the_assembled_product() {
        let (store, id) = assembled_store();
        let product = store.get_product(&id).unwrap().unwrap();
        let found = store.get_product_by_qr(&product.qr_code).unwrap().unwrap();
        assert_eq!(found, product);
        assert!(store.get_product_by_qr("QRDEADBEEF").unwrap().is_none());
    }

    #[test]
    fn batch_lookup_scans_products() {
        let (store, id) = assembled_store();
        let found = store.find_product_by_batch("BATCH-2025-001").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(store.find_product_by_batch("BATCH-NONE").unwrap().is_none());
    }

    #[test]
    fn provenance_is_ordered_by_occurrence_time() {
        let (store, id) = assembled_store();
        let timeline = store.provenance(&id).unwrap();
        assert_eq!(timeline.overall_score, 100);
        assert_eq!(timeline.entries.len(), 5);
        for pair in timeline.entries.windows(2) {
            assert!(pair[0].occurred_at <= pair[1].occurred_at);
        }
    }

    #[test]
    fn bundle_skips_unvalidated_collections() {
        let store = LedgerStore::with_defaults();
        // No quality test references the first event, so it never enters
        // the assembly pool.
        let untested = store
            .append_collection_event(collection_draft("Tulsi", 12.9, 77.5, 6))
            .unwrap();
        let tested = store
            .append_collection_event(collection_draft("Brahmi", 13.1, 78.0, 6))
            .unwrap();
        store
            .append_quality_test(quality_draft(tested.clone(), true, 1.0))
            .unwrap();

        let bundle = bundle_recent_validated(&store, 3, 5).unwrap();
        assert_eq!(bundle.collection_events.len(), 1);
        assert_eq!(bundle.collection_events[0].id, tested);
        assert_ne!(bundle.collection_events[0].id, untested);
    }

    #[test]
    fn empty_product_name_is_rejected() {
        let store = LedgerStore::with_defaults();
        let error = store
            .assemble_product(ProductDraft {
                batch_id: "BATCH-1".into(),
                product_name: " ".into(),
                manufacturer: "Ayurvedic Wellness Co.".into(),
                collection_events: vec![],
                quality_tests: vec![],
                processing_steps: vec![],
                final_quality: FinalQuality {
                    overall_score: 0,
                    certifications: vec![],
                },
                created_at: Utc::now(),
            })
            .unwrap_err();
        assert!(matches!(error, LedgerError::InvalidInput(_)));
    }
}
