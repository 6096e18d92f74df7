//! Diet suitability inference: per-tag evidence scoring over a restaurant's menu, subdiet
//! inheritance, and resolution of stored results against manual overrides.

pub mod domain;
pub mod evidence;
pub mod import;
mod inheritance;
pub mod memory;
pub mod repository;
pub mod rules;
pub mod service;
pub mod suitability;
pub mod text;

#[cfg(test)]
mod tests;

pub use domain::{
    ConfidenceLevel, DietInference, DietInferenceRecord, DietManualOverride, DietTag, DietTagId,
    Evidence, ExcludedItem, MatchKind, MatchedItem, MenuItem, MenuItemDietOverride, MenuItemId,
    RestaurantId, ScoreBreakdown,
};
pub use evidence::{EvidenceScorer, ENGINE_VERSION};
pub use import::{MenuCsvImporter, MenuImportError};
pub use inheritance::apply_subdiet_inheritance;
pub use memory::MemoryDietStore;
pub use repository::{
    DietStore, DietTagRepository, InferenceRepository, InferenceTransaction,
    ItemOverrideRepository, ManualOverrideRepository, MenuItemRepository, RepositoryError,
};
pub use rules::{DietRuleSet, RuleRegistry, SharedVocabulary};
pub use service::{DietSuitabilityService, SuitabilityServiceError};
pub use suitability::{
    resolve_suitability, EffectiveSuitability, InferenceSummary, SuitabilitySource,
};
