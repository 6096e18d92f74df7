use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::EngineSettings;

use super::domain::{DietInferenceRecord, RestaurantId};
use super::evidence::{EvidenceScorer, ENGINE_VERSION};
use super::repository::{DietStore, InferenceTransaction, RepositoryError};
use super::suitability::{resolve_suitability, EffectiveSuitability};

/// Service composing the evidence scorer with the store collaborators.
pub struct DietSuitabilityService<S> {
    store: Arc<S>,
    scorer: Arc<EvidenceScorer>,
    settings: EngineSettings,
}

impl<S> DietSuitabilityService<S>
where
    S: DietStore + 'static,
{
    pub fn new(store: Arc<S>, scorer: Arc<EvidenceScorer>, settings: EngineSettings) -> Self {
        Self {
            store,
            scorer,
            settings,
        }
    }

    /// Service using the built-in rule tables and default settings.
    pub fn with_builtin_rules(store: Arc<S>) -> Self {
        Self::new(
            store,
            Arc::new(EvidenceScorer::default()),
            EngineSettings::default(),
        )
    }

    pub fn scorer(&self) -> &EvidenceScorer {
        &self.scorer
    }

    /// Recompute and persist every tag's inference for the restaurant at the current engine
    /// version. All reads and scoring happen before the atomic unit opens, so a collaborator
    /// failure leaves previously stored rows untouched.
    pub fn compute_for_restaurant(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<DietInferenceRecord>, SuitabilityServiceError> {
        let tags = self.store.diet_tags()?;
        let items = self.store.active_menu_items(restaurant)?;
        let item_overrides = self.store.item_overrides(restaurant)?;

        let inferences = self.scorer.infer_restaurant(
            &tags,
            &items,
            &item_overrides,
            self.settings.inherit_subdiets,
        );

        let computed_at = Utc::now();
        let records: Vec<DietInferenceRecord> = inferences
            .into_iter()
            .map(|inference| DietInferenceRecord {
                restaurant_id: restaurant.clone(),
                engine_version: ENGINE_VERSION.to_string(),
                computed_at,
                inference,
            })
            .collect();

        self.store.within_transaction(restaurant, |transaction| {
            for record in &records {
                upsert(transaction, record.clone())?;
            }
            Ok(())
        })?;

        info!(
            restaurant = %restaurant.0,
            tags = records.len(),
            items = items.len(),
            engine_version = ENGINE_VERSION,
            "stored diet inference results"
        );

        Ok(records)
    }

    /// Resolve one verdict per known tag, ordered by tag key. Manual overrides always win.
    pub fn compute_effective_suitability(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<EffectiveSuitability>, SuitabilityServiceError> {
        let tags = self.store.diet_tags()?;
        let overrides = self.store.manual_overrides(restaurant)?;
        let records = self.store.inference_results(restaurant, ENGINE_VERSION)?;

        let resolved = resolve_suitability(&tags, &overrides, &records, ENGINE_VERSION);
        debug!(
            restaurant = %restaurant.0,
            overrides = overrides.len(),
            inferences = records.len(),
            "resolved effective diet suitability"
        );
        Ok(resolved)
    }
}

/// Read, then update in place or insert. An insert that races another writer and hits the
/// uniqueness constraint is retried as an update.
fn upsert(
    transaction: &mut dyn InferenceTransaction,
    record: DietInferenceRecord,
) -> Result<(), RepositoryError> {
    let existing = transaction.find(record.diet_tag_id(), &record.engine_version)?;
    if existing.is_some() {
        return transaction.update(record);
    }

    match transaction.insert(record.clone()) {
        Err(RepositoryError::Conflict) => {
            debug!(tag = %record.inference.diet_tag_key, "insert conflicted; updating instead");
            transaction.update(record)
        }
        other => other,
    }
}

/// Error raised by the suitability service.
#[derive(Debug, thiserror::Error)]
pub enum SuitabilityServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
