//! Read path: lookups by id, QR code, and batch, simple filters, and the
//! consumer-facing provenance timeline.
//!
//! All reads clone out of the locked state, so callers hold snapshots and
//! never a lock. Scans are linear; the id and QR indices cover the hot
//! lookups.

use ayurtrace_types::{
    score, CollectionEvent, GeoLocation, LedgerRecord, ProcessingStep, Product, QualityTest,
    RecordId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::store::{record_at, LedgerStore};

/// Headline counts for dashboards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub collection_events: usize,
    pub quality_tests: usize,
    pub processing_steps: usize,
    pub products: usize,
    pub validated_collections: usize,
}

/// One step of a product's journey, ordered by occurrence time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub occurred_at: DateTime<Utc>,
    pub stage: TimelineStage,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    pub validated: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineStage {
    Collection,
    Processing,
}

/// Consumer-facing provenance view of one product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceTimeline {
    pub product_id: RecordId,
    pub qr_code: String,
    pub product_name: String,
    pub overall_score: u8,
    pub certifications: Vec<String>,
    pub entries: Vec<TimelineEntry>,
}

impl LedgerStore {
    pub fn collection_events(&self) -> Result<Vec<CollectionEvent>, LedgerError> {
        Ok(self.read()?.collections.clone())
    }

    pub fn quality_tests(&self) -> Result<Vec<QualityTest>, LedgerError> {
        Ok(self.read()?.quality_tests.clone())
    }

    pub fn processing_steps(&self) -> Result<Vec<ProcessingStep>, LedgerError> {
        Ok(self.read()?.processing_steps.clone())
    }

    pub fn products(&self) -> Result<Vec<Product>, LedgerError> {
        Ok(self.read()?.products.clone())
    }

    pub fn get_collection_event(
        &self,
        id: &RecordId,
    ) -> Result<Option<CollectionEvent>, LedgerError> {
        match self.get_record(id)? {
            Some(LedgerRecord::Collection(event)) => Ok(Some(event)),
            _ => Ok(None),
        }
    }

    pub fn get_quality_test(&self, id: &RecordId) -> Result<Option<QualityTest>, LedgerError> {
        match self.get_record(id)? {
            Some(LedgerRecord::QualityTest(test)) => Ok(Some(test)),
            _ => Ok(None),
        }
    }

    pub fn get_processing_step(
        &self,
        id: &RecordId,
    ) -> Result<Option<ProcessingStep>, LedgerError> {
        match self.get_record(id)? {
            Some(LedgerRecord::Processing(step)) => Ok(Some(step)),
            _ => Ok(None),
        }
    }

    pub fn get_product(&self, id: &RecordId) -> Result<Option<Product>, LedgerError> {
        match self.get_record(id)? {
            Some(LedgerRecord::Product(product)) => Ok(Some(product)),
            _ => Ok(None),
        }
    }

    /// Lookup of any record kind by id.
    pub fn get_record(&self, id: &RecordId) -> Result<Option<LedgerRecord>, LedgerError> {
        let state = self.read()?;
        let Some((kind, index)) = state.ids.get(id) else {
            return Ok(None);
        };
        Ok(record_at(&state, *kind, *index))
    }

    /// Lookup by the QR code issued at assembly.
    pub fn get_product_by_qr(&self, qr_code: &str) -> Result<Option<Product>, LedgerError> {
        let state = self.read()?;
        let Some(index) = state.qr_index.get(qr_code) else {
            return Ok(None);
        };
        Ok(state.products.get(*index).cloned())
    }

    /// Linear scan over products by their caller-supplied batch id.
    pub fn find_product_by_batch(&self, batch_id: &str) -> Result<Option<Product>, LedgerError> {
        let state = self.read()?;
        Ok(state
            .products
            .iter()
            .find(|product| product.batch_id == batch_id)
            .cloned())
    }

    /// Processing steps whose input or output batch matches.
    pub fn processing_steps_for_batch(
        &self,
        batch_id: &str,
    ) -> Result<Vec<ProcessingStep>, LedgerError> {
        let state = self.read()?;
        Ok(state
            .processing_steps
            .iter()
            .filter(|step| step.input_batch == batch_id || step.output_batch == batch_id)
            .cloned()
            .collect())
    }

    /// Quality tests referencing one collection event.
    pub fn quality_tests_for(&self, event_id: &RecordId) -> Result<Vec<QualityTest>, LedgerError> {
        let state = self.read()?;
        Ok(state
            .quality_tests
            .iter()
            .filter(|test| &test.collection_event_id == event_id)
            .cloned()
            .collect())
    }

    /// Collections that no quality test references yet.
    pub fn collections_pending_quality_test(
        &self,
    ) -> Result<Vec<CollectionEvent>, LedgerError> {
        let state = self.read()?;
        Ok(state
            .collections
            .iter()
            .filter(|event| {
                !state
                    .quality_tests
                    .iter()
                    .any(|test| test.collection_event_id == event.id)
            })
            .cloned()
            .collect())
    }

    /// Collections with at least one validated quality test, the
    /// manufacturer-facing input pool for product assembly.
    pub fn validated_collections(&self) -> Result<Vec<CollectionEvent>, LedgerError> {
        let state = self.read()?;
        Ok(state
            .collections
            .iter()
            .filter(|event| {
                state
                    .quality_tests
                    .iter()
                    .any(|test| test.collection_event_id == event.id && test.validated)
            })
            .cloned()
            .collect())
    }

    pub fn stats(&self) -> Result<LedgerStats, LedgerError> {
        let validated_collections = self.validated_collections()?.len();
        let state = self.read()?;
        Ok(LedgerStats {
            collection_events: state.collections.len(),
            quality_tests: state.quality_tests.len(),
            processing_steps: state.processing_steps.len(),
            products: state.products.len(),
            validated_collections,
        })
    }

    /// The product's embedded collection events and processing steps
    /// merged into one timeline, ordered by occurrence time ascending.
    pub fn provenance(&self, product_id: &RecordId) -> Result<ProvenanceTimeline, LedgerError> {
        let product = self
            .get_product(product_id)?
            .ok_or_else(|| LedgerError::NotFound(format!("product {product_id}")))?;

        let mut entries: Vec<TimelineEntry> = product
            .collection_events
            .iter()
            .map(|event| TimelineEntry {
                occurred_at: event.occurred_at,
                stage: TimelineStage::Collection,
                summary: format!("{} collected by {}", event.species, event.collector.name),
                location: Some(event.location.clone()),
                validated: event.validated,
            })
            .chain(product.processing_steps.iter().map(|step| TimelineEntry {
                occurred_at: step.occurred_at,
                stage: TimelineStage::Processing,
                summary: format!("{} by {}", step.stage, step.processor.name),
                location: None,
                validated: step.validated,
            }))
            .collect();
        entries.sort_by_key(|entry| entry.occurred_at);

        Ok(ProvenanceTimeline {
            product_id: product.id,
            qr_code: product.qr_code,
            product_name: product.product_name,
            overall_score: score::overall_score(&product.quality_tests),
            certifications: product.final_quality.certifications,
            entries,
        })
    }
}
