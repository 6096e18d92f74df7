use super::domain::{
    DietInferenceRecord, DietManualOverride, DietTag, DietTagId, MenuItem, MenuItemDietOverride,
    RestaurantId,
};

/// Provider of every diet tag with its stored rule lists.
pub trait DietTagRepository: Send + Sync {
    fn diet_tags(&self) -> Result<Vec<DietTag>, RepositoryError>;
}

/// Provider of a restaurant's menu. Implementations return only active items of active
/// categories; the scorer filters again regardless.
pub trait MenuItemRepository: Send + Sync {
    fn active_menu_items(&self, restaurant: &RestaurantId)
        -> Result<Vec<MenuItem>, RepositoryError>;
}

/// Item-level overrides for the items of one restaurant, across all tags.
pub trait ItemOverrideRepository: Send + Sync {
    fn item_overrides(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<MenuItemDietOverride>, RepositoryError>;
}

/// Restaurant-level overrides, at most one per tag.
pub trait ManualOverrideRepository: Send + Sync {
    fn manual_overrides(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<DietManualOverride>, RepositoryError>;
}

/// Storage for inference rows, unique per (restaurant, tag, engine version).
pub trait InferenceRepository: Send + Sync {
    /// Every stored row for the restaurant at `engine_version`.
    fn inference_results(
        &self,
        restaurant: &RestaurantId,
        engine_version: &str,
    ) -> Result<Vec<DietInferenceRecord>, RepositoryError>;

    /// Run `work` as one atomic unit for the restaurant. Writes become visible only when
    /// `work` returns `Ok`; an error discards all of them.
    fn within_transaction<T, F>(
        &self,
        restaurant: &RestaurantId,
        work: F,
    ) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut dyn InferenceTransaction) -> Result<T, RepositoryError>;
}

/// Row operations available inside an atomic unit.
pub trait InferenceTransaction {
    fn find(
        &self,
        diet_tag_id: &DietTagId,
        engine_version: &str,
    ) -> Result<Option<DietInferenceRecord>, RepositoryError>;

    /// Fails with `Conflict` when a row for the same triple already exists.
    fn insert(&mut self, record: DietInferenceRecord) -> Result<(), RepositoryError>;

    /// Fails with `NotFound` when no row for the triple exists.
    fn update(&mut self, record: DietInferenceRecord) -> Result<(), RepositoryError>;
}

/// Everything the suitability service reads from or writes to.
pub trait DietStore:
    DietTagRepository
    + MenuItemRepository
    + ItemOverrideRepository
    + ManualOverrideRepository
    + InferenceRepository
{
}

impl<T> DietStore for T where
    T: DietTagRepository
        + MenuItemRepository
        + ItemOverrideRepository
        + ManualOverrideRepository
        + InferenceRepository
{
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
