use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Identifier wrapper for restaurants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RestaurantId(pub String);

/// Identifier wrapper for diet tags.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DietTagId(pub String);

/// Identifier wrapper for menu items.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MenuItemId(pub String);

/// A named dietary category plus the admin-maintained rule lists layered on top of the
/// built-in rules for its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietTag {
    pub id: DietTagId,
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub keyword_whitelist: Vec<String>,
    #[serde(default)]
    pub dish_whitelist: Vec<String>,
    #[serde(default)]
    pub allergen_exclusions: Vec<String>,
}

impl DietTag {
    pub fn new(id: impl Into<String>, key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: DietTagId(id.into()),
            key: key.into(),
            label: label.into(),
            keyword_whitelist: Vec::new(),
            dish_whitelist: Vec::new(),
            allergen_exclusions: Vec::new(),
        }
    }

    /// Decode a stored rule list. Storage layers hand these over either as a JSON array or as
    /// a comma/newline separated string; anything unreadable degrades to an empty list.
    pub fn parse_rule_list(raw: &str) -> Vec<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        if trimmed.starts_with('[') {
            return match serde_json::from_str::<Vec<String>>(trimmed) {
                Ok(entries) => entries
                    .into_iter()
                    .map(|entry| entry.trim().to_string())
                    .filter(|entry| !entry.is_empty())
                    .collect(),
                Err(err) => {
                    warn!(error = %err, "discarding malformed rule list");
                    Vec::new()
                }
            };
        }

        trimmed
            .split([',', '\n'])
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn default_true() -> bool {
    true
}

/// Read-only projection of a menu item as consumed by the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub diet_context: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    /// Raw provider allergen list, separated by `,`, `;` or `|`.
    #[serde(default)]
    pub allergens: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_true")]
    pub category_active: bool,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: MenuItemId(id.into()),
            name: name.into(),
            description: None,
            diet_context: None,
            category_name: None,
            allergens: None,
            active: true,
            category_active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_diet_context(mut self, context: impl Into<String>) -> Self {
        self.diet_context = Some(context.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category_name = Some(category.into());
        self
    }

    pub fn with_allergens(mut self, allergens: impl Into<String>) -> Self {
        self.allergens = Some(allergens.into());
        self
    }

    /// Only active items of active categories take part in inference.
    pub fn is_available(&self) -> bool {
        self.active && self.category_active
    }
}

/// Item-level human verdict; the strongest signal the scorer knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemDietOverride {
    pub item_id: MenuItemId,
    pub diet_tag_id: DietTagId,
    pub supported: bool,
}

/// Restaurant-level human verdict. Always wins over inference for its pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietManualOverride {
    pub restaurant_id: RestaurantId,
    pub diet_tag_id: DietTagId,
    pub supported: bool,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "LOW",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::High => "HIGH",
        }
    }

    pub const fn multiplier(self) -> f64 {
        match self {
            ConfidenceLevel::High => 1.0,
            ConfidenceLevel::Medium => 0.92,
            ConfidenceLevel::Low => 0.82,
        }
    }
}

/// How a matched item earned its positive weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    ManualOverride,
    Dish,
    Keyword,
    CrossContamination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedItem {
    pub item_id: MenuItemId,
    pub name: String,
    pub kind: MatchKind,
    pub weight: f64,
    pub strong_signal: bool,
    pub signals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedItem {
    pub item_id: MenuItemId,
    pub name: String,
    pub strong_signal: bool,
    pub reasons: Vec<String>,
}

/// Intermediate terms of the scoring formula, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub positive_evidence: f64,
    pub negative_evidence: f64,
    pub strong_signals: usize,
    pub manual_overrides: usize,
    pub ratio_score: i64,
    pub evidence_boost: i64,
    pub evidence_penalty: i64,
    pub confidence_multiplier: f64,
}

/// Evidence trail backing one tag's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub matched_items: Vec<MatchedItem>,
    pub excluded_items: Vec<ExcludedItem>,
    pub total_menu_items: usize,
    pub match_ratio: f64,
    pub score_breakdown: ScoreBreakdown,
}

/// Scorer output for one tag. Pure data, no timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietInference {
    pub diet_tag_id: DietTagId,
    pub diet_tag_key: String,
    pub score: u8,
    pub confidence: ConfidenceLevel,
    pub reasons: Evidence,
}

impl DietInference {
    pub fn matched_item_count(&self) -> usize {
        self.reasons.matched_items.len()
    }

    pub fn excluded_item_count(&self) -> usize {
        self.reasons.excluded_items.len()
    }
}

/// Persisted inference row. Unique per (restaurant, tag, engine version).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietInferenceRecord {
    pub restaurant_id: RestaurantId,
    pub engine_version: String,
    pub computed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub inference: DietInference,
}

impl DietInferenceRecord {
    pub fn diet_tag_id(&self) -> &DietTagId {
        &self.inference.diet_tag_id
    }
}
