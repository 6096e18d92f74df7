use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    DietInferenceRecord, DietManualOverride, DietTag, DietTagId, MenuItem, MenuItemDietOverride,
    MenuItemId, RestaurantId,
};
use super::repository::{
    DietTagRepository, InferenceRepository, InferenceTransaction, ItemOverrideRepository,
    ManualOverrideRepository, MenuItemRepository, RepositoryError,
};

type InferenceKey = (DietTagId, String);

#[derive(Debug, Default)]
struct MemoryState {
    tags: BTreeMap<DietTagId, DietTag>,
    menus: BTreeMap<RestaurantId, Vec<MenuItem>>,
    item_overrides: BTreeMap<(MenuItemId, DietTagId), bool>,
    manual_overrides: BTreeMap<(RestaurantId, DietTagId), DietManualOverride>,
    inferences: BTreeMap<RestaurantId, BTreeMap<InferenceKey, DietInferenceRecord>>,
}

/// In-process store implementing every collaborator trait. Transactions hold the store lock,
/// so atomic units are serialized and uncommitted writes are never visible.
#[derive(Debug, Clone, Default)]
pub struct MemoryDietStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDietStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".to_string()))
    }

    /// Insert or replace a tag by id.
    pub fn put_tag(&self, tag: DietTag) -> Result<(), RepositoryError> {
        self.lock()?.tags.insert(tag.id.clone(), tag);
        Ok(())
    }

    /// Replace the restaurant's whole menu.
    pub fn put_menu(
        &self,
        restaurant: &RestaurantId,
        items: Vec<MenuItem>,
    ) -> Result<(), RepositoryError> {
        self.lock()?.menus.insert(restaurant.clone(), items);
        Ok(())
    }

    pub fn put_item_override(&self, entry: MenuItemDietOverride) -> Result<(), RepositoryError> {
        self.lock()?
            .item_overrides
            .insert((entry.item_id, entry.diet_tag_id), entry.supported);
        Ok(())
    }

    pub fn remove_item_override(
        &self,
        item: &MenuItemId,
        diet_tag: &DietTagId,
    ) -> Result<(), RepositoryError> {
        self.lock()?
            .item_overrides
            .remove(&(item.clone(), diet_tag.clone()));
        Ok(())
    }

    pub fn put_manual_override(&self, entry: DietManualOverride) -> Result<(), RepositoryError> {
        self.lock()?.manual_overrides.insert(
            (entry.restaurant_id.clone(), entry.diet_tag_id.clone()),
            entry,
        );
        Ok(())
    }

    pub fn remove_manual_override(
        &self,
        restaurant: &RestaurantId,
        diet_tag: &DietTagId,
    ) -> Result<(), RepositoryError> {
        self.lock()?
            .manual_overrides
            .remove(&(restaurant.clone(), diet_tag.clone()));
        Ok(())
    }

    /// Write a row directly, bypassing the service. Replaces an existing row for the triple.
    pub fn put_inference(&self, record: DietInferenceRecord) -> Result<(), RepositoryError> {
        let key = (record.diet_tag_id().clone(), record.engine_version.clone());
        self.lock()?
            .inferences
            .entry(record.restaurant_id.clone())
            .or_default()
            .insert(key, record);
        Ok(())
    }

    /// Every stored row for the restaurant, across engine versions.
    pub fn stored_inferences(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<DietInferenceRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .inferences
            .get(restaurant)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }
}

impl DietTagRepository for MemoryDietStore {
    fn diet_tags(&self) -> Result<Vec<DietTag>, RepositoryError> {
        Ok(self.lock()?.tags.values().cloned().collect())
    }
}

impl MenuItemRepository for MemoryDietStore {
    fn active_menu_items(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        Ok(self
            .lock()?
            .menus
            .get(restaurant)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.is_available())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl ItemOverrideRepository for MemoryDietStore {
    fn item_overrides(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<MenuItemDietOverride>, RepositoryError> {
        let state = self.lock()?;
        let Some(items) = state.menus.get(restaurant) else {
            return Ok(Vec::new());
        };

        Ok(state
            .item_overrides
            .iter()
            .filter(|((item_id, _), _)| items.iter().any(|item| &item.id == item_id))
            .map(|((item_id, diet_tag_id), supported)| MenuItemDietOverride {
                item_id: item_id.clone(),
                diet_tag_id: diet_tag_id.clone(),
                supported: *supported,
            })
            .collect())
    }
}

impl ManualOverrideRepository for MemoryDietStore {
    fn manual_overrides(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<DietManualOverride>, RepositoryError> {
        Ok(self
            .lock()?
            .manual_overrides
            .iter()
            .filter(|((owner, _), _)| owner == restaurant)
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}

impl InferenceRepository for MemoryDietStore {
    fn inference_results(
        &self,
        restaurant: &RestaurantId,
        engine_version: &str,
    ) -> Result<Vec<DietInferenceRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .inferences
            .get(restaurant)
            .map(|rows| {
                rows.values()
                    .filter(|record| record.engine_version == engine_version)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn within_transaction<T, F>(
        &self,
        restaurant: &RestaurantId,
        work: F,
    ) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut dyn InferenceTransaction) -> Result<T, RepositoryError>,
    {
        let mut state = self.lock()?;
        let mut transaction = MemoryTransaction {
            restaurant,
            rows: state.inferences.get(restaurant).cloned().unwrap_or_default(),
        };

        let output = work(&mut transaction)?;
        state
            .inferences
            .insert(restaurant.clone(), transaction.rows);
        Ok(output)
    }
}

/// Working copy of one restaurant's rows; swapped into the store on commit.
struct MemoryTransaction<'a> {
    restaurant: &'a RestaurantId,
    rows: BTreeMap<InferenceKey, DietInferenceRecord>,
}

impl MemoryTransaction<'_> {
    fn key_for(&self, record: &DietInferenceRecord) -> Result<InferenceKey, RepositoryError> {
        if &record.restaurant_id != self.restaurant {
            return Err(RepositoryError::Unavailable(format!(
                "transaction for restaurant {} cannot write rows of {}",
                self.restaurant.0, record.restaurant_id.0
            )));
        }
        Ok((record.diet_tag_id().clone(), record.engine_version.clone()))
    }
}

impl InferenceTransaction for MemoryTransaction<'_> {
    fn find(
        &self,
        diet_tag_id: &DietTagId,
        engine_version: &str,
    ) -> Result<Option<DietInferenceRecord>, RepositoryError> {
        Ok(self
            .rows
            .get(&(diet_tag_id.clone(), engine_version.to_string()))
            .cloned())
    }

    fn insert(&mut self, record: DietInferenceRecord) -> Result<(), RepositoryError> {
        let key = self.key_for(&record)?;
        if self.rows.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        self.rows.insert(key, record);
        Ok(())
    }

    fn update(&mut self, record: DietInferenceRecord) -> Result<(), RepositoryError> {
        let key = self.key_for(&record)?;
        match self.rows.get_mut(&key) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}
