mod item;
pub(crate) mod scoring;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::domain::{
    DietInference, DietTag, DietTagId, Evidence, MenuItem, MenuItemDietOverride, MenuItemId,
};
use super::inheritance::apply_subdiet_inheritance;
use super::rules::RuleRegistry;
use item::{evaluate_item, ItemVerdict};
use scoring::Tally;

/// Version of the rule tables, weights, and formula. Stored results are partitioned by it.
pub const ENGINE_VERSION: &str = "4.0.0";

/// Stateless scorer applying the rule registry to a restaurant's menu.
#[derive(Debug, Clone)]
pub struct EvidenceScorer {
    registry: Arc<RuleRegistry>,
}

impl EvidenceScorer {
    pub fn new(registry: RuleRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn with_shared_registry(registry: Arc<RuleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Score one tag against the available items. Never fails: unknown keys and unreadable
    /// allergen data simply produce weaker evidence.
    pub fn infer(
        &self,
        tag: &DietTag,
        items: &[MenuItem],
        item_overrides: &HashMap<MenuItemId, bool>,
    ) -> DietInference {
        let rules = self.registry.compile(tag);
        if !rules.has_positive_rules() {
            warn!(tag = %tag.key, "tag has no positive rules; it will score zero");
        }

        let available: Vec<&MenuItem> = items.iter().filter(|item| item.is_available()).collect();

        let mut matched_items = Vec::new();
        let mut excluded_items = Vec::new();
        for item in &available {
            match evaluate_item(&rules, item, item_overrides.get(&item.id).copied()) {
                ItemVerdict::Matched(entry) => matched_items.push(entry),
                ItemVerdict::Excluded(entry) => excluded_items.push(entry),
                ItemVerdict::Ignored => {}
            }
        }

        let tally = Tally::from_items(&matched_items, &excluded_items, available.len());
        let scored = scoring::score(&tally);

        DietInference {
            diet_tag_id: tag.id.clone(),
            diet_tag_key: tag.key.clone(),
            score: scored.score,
            confidence: scored.confidence,
            reasons: Evidence {
                matched_items,
                excluded_items,
                total_menu_items: available.len(),
                match_ratio: scored.match_ratio,
                score_breakdown: scored.breakdown,
            },
        }
    }

    /// Score every tag for one restaurant, then lift child tags from their parents.
    pub fn infer_restaurant(
        &self,
        tags: &[DietTag],
        items: &[MenuItem],
        item_overrides: &[MenuItemDietOverride],
        inherit_subdiets: bool,
    ) -> Vec<DietInference> {
        let mut overrides_by_tag: HashMap<&DietTagId, HashMap<MenuItemId, bool>> = HashMap::new();
        for entry in item_overrides {
            overrides_by_tag
                .entry(&entry.diet_tag_id)
                .or_default()
                .insert(entry.item_id.clone(), entry.supported);
        }

        let empty = HashMap::new();
        let mut results: Vec<DietInference> = tags
            .iter()
            .map(|tag| {
                let overrides = overrides_by_tag.get(&tag.id).unwrap_or(&empty);
                self.infer(tag, items, overrides)
            })
            .collect();

        if inherit_subdiets {
            apply_subdiet_inheritance(&mut results, self.registry.subdiets());
        }

        results
    }
}

impl Default for EvidenceScorer {
    fn default() -> Self {
        Self::new(RuleRegistry::builtin())
    }
}
