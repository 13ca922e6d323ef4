use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use ayurtrace_fingerprint::{self as fingerprint, Fingerprint};
use ayurtrace_types::{
    CollectionEvent, CollectionEventDraft, LedgerRecord, ProcessingStep, ProcessingStepDraft,
    Product, QualityTest, QualityTestDraft, RecordId, RecordKind,
};
use ayurtrace_validator::ValidationEngine;
use chrono::Utc;
use tracing::{info, warn};

use crate::error::LedgerError;

/// In-memory ledger owning the four append-only collections.
///
/// Instantiated once at process startup and handed to callers by
/// reference; never a process-wide global, so every test gets a fresh
/// store.
pub struct LedgerStore {
    validation: ValidationEngine,
    pub(crate) inner: RwLock<LedgerState>,
}

#[derive(Default)]
pub(crate) struct LedgerState {
    pub(crate) collections: Vec<CollectionEvent>,
    pub(crate) quality_tests: Vec<QualityTest>,
    pub(crate) processing_steps: Vec<ProcessingStep>,
    pub(crate) products: Vec<Product>,
    /// Record id → position, for O(1) lookups across all four kinds.
    pub(crate) ids: HashMap<RecordId, (RecordKind, usize)>,
    /// QR code → product position.
    pub(crate) qr_index: HashMap<String, usize>,
    /// Fingerprint of the most recently admitted record.
    pub(crate) head: Option<Fingerprint>,
    /// Global admission order, for chain verification.
    pub(crate) chain: Vec<(RecordKind, usize)>,
}

impl LedgerStore {
    pub fn new(validation: ValidationEngine) -> Self {
        Self {
            validation,
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// Store with the default rule set (India geo-fence, winter-harvest
    /// Ashwagandha).
    pub fn with_defaults() -> Self {
        Self::new(ValidationEngine::with_defaults())
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }

    /// Admit one collection event. Never fails validation — an invalid
    /// record is appended with `validated = false` — but malformed input
    /// is rejected outright.
    pub fn append_collection_event(
        &self,
        draft: CollectionEventDraft,
    ) -> Result<RecordId, LedgerError> {
        if draft.species.trim().is_empty() {
            return Err(LedgerError::InvalidInput("species must not be empty".into()));
        }
        if draft.quantity_kg < 0.0 {
            return Err(LedgerError::InvalidInput(
                "quantity must be non-negative".into(),
            ));
        }
        if draft.sustainability_score > 100 {
            return Err(LedgerError::InvalidInput(
                "sustainability score must be at most 100".into(),
            ));
        }

        let report = self.validation.validate(&draft);
        if !report.passed() {
            warn!(
                species = %draft.species,
                violations = ?report.violations,
                "collection event admitted with failed validation"
            );
        }

        let mut state = self.write()?;
        let id = RecordId::generate();
        let admitted_at = Utc::now();
        let mut event = CollectionEvent {
            id: id.clone(),
            occurred_at: draft.occurred_at,
            collector: draft.collector,
            species: draft.species,
            location: draft.location,
            quantity_kg: draft.quantity_kg,
            quality: draft.quality,
            sustainability_score: draft.sustainability_score,
            fingerprint: Fingerprint::ZERO,
            prev_fingerprint: state.head,
            admitted_at,
            validated: report.passed(),
        };
        event.fingerprint = fingerprint::chained(
            RecordKind::Collection.as_str(),
            event.prev_fingerprint.as_ref(),
            admitted_at,
            &event,
        )?;

        state.head = Some(event.fingerprint);
        let index = state.collections.len();
        state.ids.insert(id.clone(), (RecordKind::Collection, index));
        state.chain.push((RecordKind::Collection, index));
        info!(%id, fingerprint = %event.fingerprint.short(), "collection event appended");
        state.collections.push(event);
        Ok(id)
    }

    /// Admit one quality test. The referenced collection event must
    /// already exist.
    pub fn append_quality_test(&self, draft: QualityTestDraft) -> Result<RecordId, LedgerError> {
        let report = self.validation.validate(&draft);
        if !report.passed() {
            warn!(
                lab = %draft.lab.id,
                violations = ?report.violations,
                "quality test admitted with failed validation"
            );
        }

        let mut state = self.write()?;
        match state.ids.get(&draft.collection_event_id) {
            Some((RecordKind::Collection, _)) => {}
            _ => {
                return Err(LedgerError::NotFound(format!(
                    "collection event {}",
                    draft.collection_event_id
                )))
            }
        }

        let id = RecordId::generate();
        let admitted_at = Utc::now();
        let mut test = QualityTest {
            id: id.clone(),
            occurred_at: draft.occurred_at,
            lab: draft.lab,
            collection_event_id: draft.collection_event_id,
            results: draft.results,
            certification: draft.certification,
            fingerprint: Fingerprint::ZERO,
            prev_fingerprint: state.head,
            admitted_at,
            validated: report.passed(),
        };
        test.fingerprint = fingerprint::chained(
            RecordKind::QualityTest.as_str(),
            test.prev_fingerprint.as_ref(),
            admitted_at,
            &test,
        )?;

        state.head = Some(test.fingerprint);
        let index = state.quality_tests.len();
        state.ids.insert(id.clone(), (RecordKind::QualityTest, index));
        state.chain.push((RecordKind::QualityTest, index));
        info!(%id, event = %test.collection_event_id, "quality test appended");
        state.quality_tests.push(test);
        Ok(id)
    }

    /// Admit one processing step. Batch ids are free text and carry no
    /// referential checks.
    pub fn append_processing_step(
        &self,
        draft: ProcessingStepDraft,
    ) -> Result<RecordId, LedgerError> {
        if draft.output_batch.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "output batch must not be empty".into(),
            ));
        }

        let report = self.validation.validate(&draft);
        if !report.passed() {
            warn!(
                processor = %draft.processor.id,
                violations = ?report.violations,
                "processing step admitted with failed validation"
            );
        }

        let mut state = self.write()?;
        let id = RecordId::generate();
        let admitted_at = Utc::now();
        let mut step = ProcessingStep {
            id: id.clone(),
            occurred_at: draft.occurred_at,
            processor: draft.processor,
            stage: draft.stage,
            conditions: draft.conditions,
            input_batch: draft.input_batch,
            output_batch: draft.output_batch,
            fingerprint: Fingerprint::ZERO,
            prev_fingerprint: state.head,
            admitted_at,
            validated: report.passed(),
        };
        step.fingerprint = fingerprint::chained(
            RecordKind::Processing.as_str(),
            step.prev_fingerprint.as_ref(),
            admitted_at,
            &step,
        )?;

        state.head = Some(step.fingerprint);
        let index = state.processing_steps.len();
        state.ids.insert(id.clone(), (RecordKind::Processing, index));
        state.chain.push((RecordKind::Processing, index));
        info!(%id, stage = %step.stage, "processing step appended");
        state.processing_steps.push(step);
        Ok(id)
    }

    /// Recompute every fingerprint against the stored previous-links and
    /// report the first divergence.
    pub fn verify_chain(&self) -> Result<(), LedgerError> {
        let state = self.read()?;
        let mut expected_prev: Option<Fingerprint> = None;

        for (kind, index) in &state.chain {
            let record = record_at(&state, *kind, *index)
                .ok_or_else(|| LedgerError::NotFound(format!("chain entry {kind}#{index}")))?;
            let (prev, stored) = match &record {
                LedgerRecord::Collection(event) => (event.prev_fingerprint, event.fingerprint),
                LedgerRecord::QualityTest(test) => (test.prev_fingerprint, test.fingerprint),
                LedgerRecord::Processing(step) => (step.prev_fingerprint, step.fingerprint),
                LedgerRecord::Product(product) => (product.prev_fingerprint, product.fingerprint),
            };

            if prev != expected_prev {
                return Err(LedgerError::IntegrityViolation {
                    record_id: record.id().clone(),
                    reason: "previous fingerprint link mismatch".into(),
                });
            }

            let recomputed = recompute_fingerprint(&record)?;
            if recomputed != stored {
                return Err(LedgerError::IntegrityViolation {
                    record_id: record.id().clone(),
                    reason: "fingerprint mismatch".into(),
                });
            }

            expected_prev = Some(stored);
        }

        Ok(())
    }
}

pub(crate) fn record_at(
    state: &LedgerState,
    kind: RecordKind,
    index: usize,
) -> Option<LedgerRecord> {
    match kind {
        RecordKind::Collection => state
            .collections
            .get(index)
            .cloned()
            .map(LedgerRecord::Collection),
        RecordKind::QualityTest => state
            .quality_tests
            .get(index)
            .cloned()
            .map(LedgerRecord::QualityTest),
        RecordKind::Processing => state
            .processing_steps
            .get(index)
            .cloned()
            .map(LedgerRecord::Processing),
        RecordKind::Product => state.products.get(index).cloned().map(LedgerRecord::Product),
    }
}

fn recompute_fingerprint(record: &LedgerRecord) -> Result<Fingerprint, LedgerError> {
    let fingerprint = match record {
        LedgerRecord::Collection(event) => {
            let mut content = event.clone();
            content.fingerprint = Fingerprint::ZERO;
            fingerprint::chained(
                RecordKind::Collection.as_str(),
                event.prev_fingerprint.as_ref(),
                event.admitted_at,
                &content,
            )?
        }
        LedgerRecord::QualityTest(test) => {
            let mut content = test.clone();
            content.fingerprint = Fingerprint::ZERO;
            fingerprint::chained(
                RecordKind::QualityTest.as_str(),
                test.prev_fingerprint.as_ref(),
                test.admitted_at,
                &content,
            )?
        }
        LedgerRecord::Processing(step) => {
            let mut content = step.clone();
            content.fingerprint = Fingerprint::ZERO;
            fingerprint::chained(
                RecordKind::Processing.as_str(),
                step.prev_fingerprint.as_ref(),
                step.admitted_at,
                &content,
            )?
        }
        LedgerRecord::Product(product) => {
            let mut content = product.clone();
            content.fingerprint = Fingerprint::ZERO;
            fingerprint::chained(
                RecordKind::Product.as_str(),
                product.prev_fingerprint.as_ref(),
                product.admitted_at,
                &content,
            )?
        }
    };
    Ok(fingerprint)
}
