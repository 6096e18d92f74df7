use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::config::EngineSettings;
use crate::diet::domain::{
    ConfidenceLevel, DietInference, DietInferenceRecord, DietManualOverride, DietTag, DietTagId,
    Evidence, MenuItem, MenuItemDietOverride, MenuItemId, RestaurantId, ScoreBreakdown,
};
use crate::diet::evidence::{EvidenceScorer, ENGINE_VERSION};
use crate::diet::memory::MemoryDietStore;
use crate::diet::repository::{
    DietStore, DietTagRepository, InferenceRepository, InferenceTransaction,
    ItemOverrideRepository, ManualOverrideRepository, MenuItemRepository, RepositoryError,
};
use crate::diet::rules::RuleRegistry;
use crate::diet::service::DietSuitabilityService;

pub(super) fn restaurant() -> RestaurantId {
    RestaurantId("rest-001".to_string())
}

pub(super) fn tag(key: &str) -> DietTag {
    DietTag::new(
        format!("tag-{}", key.to_ascii_lowercase()),
        key,
        key.replace('_', " ").to_ascii_lowercase(),
    )
}

pub(super) fn tag_id(key: &str) -> DietTagId {
    tag(key).id
}

/// Every tag with built-in rules, deliberately out of key order.
pub(super) fn builtin_tags() -> Vec<DietTag> {
    ["VEGETARIAN", "HALAL", "VEGAN", "GLUTEN_FREE", "LACTOSE_FREE"]
        .into_iter()
        .map(tag)
        .collect()
}

pub(super) fn item(id: &str, name: &str) -> MenuItem {
    MenuItem::new(id, name)
}

pub(super) fn item_id(id: &str) -> MenuItemId {
    MenuItemId(id.to_string())
}

pub(super) fn scorer() -> EvidenceScorer {
    EvidenceScorer::new(RuleRegistry::builtin())
}

pub(super) fn no_overrides() -> HashMap<MenuItemId, bool> {
    HashMap::new()
}

pub(super) fn overrides(entries: &[(&str, bool)]) -> HashMap<MenuItemId, bool> {
    entries
        .iter()
        .map(|(id, supported)| (item_id(id), *supported))
        .collect()
}

/// Two vegan mains, a vegetarian pizza, a meat dish, and a salad with no diet hints.
pub(super) fn mixed_menu() -> Vec<MenuItem> {
    vec![
        item("item-1", "Vegan Burger").with_category("Burgers"),
        item("item-2", "Tofu Bowl").with_description("Rice, greens, sesame"),
        item("item-3", "Margherita Pizza").with_description("Tomato, mozzarella, basil"),
        item("item-4", "Chicken Curry").with_description("Spicy chicken in coconut sauce"),
        item("item-5", "Green Salad"),
    ]
}

pub(super) fn item_override(item: &str, key: &str, supported: bool) -> MenuItemDietOverride {
    MenuItemDietOverride {
        item_id: item_id(item),
        diet_tag_id: tag_id(key),
        supported,
    }
}

pub(super) fn manual_override(key: &str, supported: bool) -> DietManualOverride {
    DietManualOverride {
        restaurant_id: restaurant(),
        diet_tag_id: tag_id(key),
        supported,
        author: "ops@menu.example".to_string(),
        notes: Some("confirmed with the kitchen".to_string()),
        updated_at: at(2025, 3, 1),
    }
}

pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// A stored row with an empty evidence trail and the given headline numbers.
pub(super) fn inference_record(
    key: &str,
    score: u8,
    confidence: ConfidenceLevel,
    engine_version: &str,
    computed_at: DateTime<Utc>,
) -> DietInferenceRecord {
    DietInferenceRecord {
        restaurant_id: restaurant(),
        engine_version: engine_version.to_string(),
        computed_at,
        inference: DietInference {
            diet_tag_id: tag_id(key),
            diet_tag_key: key.to_string(),
            score,
            confidence,
            reasons: Evidence {
                matched_items: Vec::new(),
                excluded_items: Vec::new(),
                total_menu_items: 0,
                match_ratio: 0.0,
                score_breakdown: ScoreBreakdown {
                    positive_evidence: 0.0,
                    negative_evidence: 0.0,
                    strong_signals: 0,
                    manual_overrides: 0,
                    ratio_score: 0,
                    evidence_boost: 0,
                    evidence_penalty: 0,
                    confidence_multiplier: confidence.multiplier(),
                },
            },
        },
    }
}

pub(super) fn current_record(
    key: &str,
    score: u8,
    confidence: ConfidenceLevel,
) -> DietInferenceRecord {
    inference_record(key, score, confidence, ENGINE_VERSION, at(2025, 3, 2))
}

pub(super) fn seeded_store() -> MemoryDietStore {
    let store = MemoryDietStore::new();
    for entry in builtin_tags() {
        store.put_tag(entry).expect("tag stored");
    }
    store
        .put_menu(&restaurant(), mixed_menu())
        .expect("menu stored");
    store
}

pub(super) fn build_service<S>(store: Arc<S>) -> DietSuitabilityService<S>
where
    S: DietStore + 'static,
{
    DietSuitabilityService::new(store, Arc::new(scorer()), EngineSettings::default())
}

/// Delegates reads to a memory store but loses every `find` inside a transaction, so each
/// write goes through the insert path and collides with rows that already exist.
pub(super) struct StaleReadStore {
    pub(super) inner: MemoryDietStore,
}

impl DietTagRepository for StaleReadStore {
    fn diet_tags(&self) -> Result<Vec<DietTag>, RepositoryError> {
        self.inner.diet_tags()
    }
}

impl MenuItemRepository for StaleReadStore {
    fn active_menu_items(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        self.inner.active_menu_items(restaurant)
    }
}

impl ItemOverrideRepository for StaleReadStore {
    fn item_overrides(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<MenuItemDietOverride>, RepositoryError> {
        self.inner.item_overrides(restaurant)
    }
}

impl ManualOverrideRepository for StaleReadStore {
    fn manual_overrides(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<DietManualOverride>, RepositoryError> {
        self.inner.manual_overrides(restaurant)
    }
}

impl InferenceRepository for StaleReadStore {
    fn inference_results(
        &self,
        restaurant: &RestaurantId,
        engine_version: &str,
    ) -> Result<Vec<DietInferenceRecord>, RepositoryError> {
        self.inner.inference_results(restaurant, engine_version)
    }

    fn within_transaction<T, F>(
        &self,
        restaurant: &RestaurantId,
        work: F,
    ) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut dyn InferenceTransaction) -> Result<T, RepositoryError>,
    {
        self.inner.within_transaction(restaurant, |transaction| {
            let mut stale = StaleTransaction { inner: transaction };
            work(&mut stale)
        })
    }
}

struct StaleTransaction<'a> {
    inner: &'a mut dyn InferenceTransaction,
}

impl InferenceTransaction for StaleTransaction<'_> {
    fn find(
        &self,
        _diet_tag_id: &DietTagId,
        _engine_version: &str,
    ) -> Result<Option<DietInferenceRecord>, RepositoryError> {
        Ok(None)
    }

    fn insert(&mut self, record: DietInferenceRecord) -> Result<(), RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&mut self, record: DietInferenceRecord) -> Result<(), RepositoryError> {
        self.inner.update(record)
    }
}

/// Accepts `allowed_writes` writes per transaction, then fails every later one.
pub(super) struct FlakyWriteStore {
    pub(super) inner: MemoryDietStore,
    pub(super) allowed_writes: usize,
}

impl DietTagRepository for FlakyWriteStore {
    fn diet_tags(&self) -> Result<Vec<DietTag>, RepositoryError> {
        self.inner.diet_tags()
    }
}

impl MenuItemRepository for FlakyWriteStore {
    fn active_menu_items(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        self.inner.active_menu_items(restaurant)
    }
}

impl ItemOverrideRepository for FlakyWriteStore {
    fn item_overrides(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<MenuItemDietOverride>, RepositoryError> {
        self.inner.item_overrides(restaurant)
    }
}

impl ManualOverrideRepository for FlakyWriteStore {
    fn manual_overrides(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<DietManualOverride>, RepositoryError> {
        self.inner.manual_overrides(restaurant)
    }
}

impl InferenceRepository for FlakyWriteStore {
    fn inference_results(
        &self,
        restaurant: &RestaurantId,
        engine_version: &str,
    ) -> Result<Vec<DietInferenceRecord>, RepositoryError> {
        self.inner.inference_results(restaurant, engine_version)
    }

    fn within_transaction<T, F>(
        &self,
        restaurant: &RestaurantId,
        work: F,
    ) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut dyn InferenceTransaction) -> Result<T, RepositoryError>,
    {
        let allowed_writes = self.allowed_writes;
        self.inner.within_transaction(restaurant, |transaction| {
            let mut flaky = FlakyTransaction {
                inner: transaction,
                remaining: allowed_writes,
            };
            work(&mut flaky)
        })
    }
}

struct FlakyTransaction<'a> {
    inner: &'a mut dyn InferenceTransaction,
    remaining: usize,
}

impl FlakyTransaction<'_> {
    fn spend(&mut self) -> Result<(), RepositoryError> {
        if self.remaining == 0 {
            return Err(RepositoryError::Unavailable("connection reset".to_string()));
        }
        self.remaining -= 1;
        Ok(())
    }
}

impl InferenceTransaction for FlakyTransaction<'_> {
    fn find(
        &self,
        diet_tag_id: &DietTagId,
        engine_version: &str,
    ) -> Result<Option<DietInferenceRecord>, RepositoryError> {
        self.inner.find(diet_tag_id, engine_version)
    }

    fn insert(&mut self, record: DietInferenceRecord) -> Result<(), RepositoryError> {
        self.spend()?;
        self.inner.insert(record)
    }

    fn update(&mut self, record: DietInferenceRecord) -> Result<(), RepositoryError> {
        self.spend()?;
        self.inner.update(record)
    }
}

/// Every collaborator call fails.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl DietTagRepository for UnavailableStore {
    fn diet_tags(&self) -> Result<Vec<DietTag>, RepositoryError> {
        offline()
    }
}

impl MenuItemRepository for UnavailableStore {
    fn active_menu_items(
        &self,
        _restaurant: &RestaurantId,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        offline()
    }
}

impl ItemOverrideRepository for UnavailableStore {
    fn item_overrides(
        &self,
        _restaurant: &RestaurantId,
    ) -> Result<Vec<MenuItemDietOverride>, RepositoryError> {
        offline()
    }
}

impl ManualOverrideRepository for UnavailableStore {
    fn manual_overrides(
        &self,
        _restaurant: &RestaurantId,
    ) -> Result<Vec<DietManualOverride>, RepositoryError> {
        offline()
    }
}

impl InferenceRepository for UnavailableStore {
    fn inference_results(
        &self,
        _restaurant: &RestaurantId,
        _engine_version: &str,
    ) -> Result<Vec<DietInferenceRecord>, RepositoryError> {
        offline()
    }

    fn within_transaction<T, F>(
        &self,
        _restaurant: &RestaurantId,
        _work: F,
    ) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut dyn InferenceTransaction) -> Result<T, RepositoryError>,
    {
        offline()
    }
}
