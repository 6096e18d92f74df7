use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ConfidenceLevel, DietInferenceRecord, DietManualOverride, DietTag, DietTagId};

/// Where an effective verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuitabilitySource {
    Override,
    Inference,
    None,
}

impl SuitabilitySource {
    pub const fn label(self) -> &'static str {
        match self {
            SuitabilitySource::Override => "override",
            SuitabilitySource::Inference => "inference",
            SuitabilitySource::None => "none",
        }
    }
}

/// Compact view of a stored inference row, attached to every resolved verdict it informed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceSummary {
    pub diet_tag_key: String,
    pub score: u8,
    pub confidence: ConfidenceLevel,
    pub match_ratio: f64,
    pub matched_item_count: usize,
    pub excluded_item_count: usize,
    pub total_menu_items: usize,
    pub engine_version: String,
    pub computed_at: DateTime<Utc>,
}

impl From<&DietInferenceRecord> for InferenceSummary {
    fn from(record: &DietInferenceRecord) -> Self {
        let inference = &record.inference;
        Self {
            diet_tag_key: inference.diet_tag_key.clone(),
            score: inference.score,
            confidence: inference.confidence,
            match_ratio: inference.reasons.match_ratio,
            matched_item_count: inference.matched_item_count(),
            excluded_item_count: inference.excluded_item_count(),
            total_menu_items: inference.reasons.total_menu_items,
            engine_version: record.engine_version.clone(),
            computed_at: record.computed_at,
        }
    }
}

/// Derived per (restaurant, tag) verdict. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveSuitability {
    pub diet_tag_id: DietTagId,
    pub diet_tag_key: String,
    pub diet_tag_label: String,
    /// `None` when neither an override nor an inference exists.
    pub supported: Option<bool>,
    pub source: SuitabilitySource,
    #[serde(rename = "override")]
    pub manual_override: Option<DietManualOverride>,
    pub inference: Option<InferenceSummary>,
}

impl EffectiveSuitability {
    /// One-line rendering for operator output, e.g. `VEGAN: supported (inference, score 72 HIGH)`.
    pub fn summary(&self) -> String {
        let verdict = match self.supported {
            Some(true) => "supported",
            Some(false) => "not supported",
            None => "unknown",
        };

        let mut details = vec![self.source.label().to_string()];
        if let Some(entry) = &self.manual_override {
            details.push(format!("by {}", entry.author));
        }
        if let Some(inference) = &self.inference {
            details.push(format!(
                "score {} {}",
                inference.score,
                inference.confidence.label()
            ));
        }

        format!("{}: {} ({})", self.diet_tag_key, verdict, details.join(", "))
    }
}

/// Merge manual overrides with stored inference rows into one verdict per tag, ordered by
/// tag key. Rows from other engine versions are ignored; among rows for the same tag the
/// latest `computed_at` wins. Overrides for tags missing from `tags` are dropped.
pub fn resolve_suitability(
    tags: &[DietTag],
    overrides: &[DietManualOverride],
    records: &[DietInferenceRecord],
    engine_version: &str,
) -> Vec<EffectiveSuitability> {
    let overrides_by_tag: HashMap<&DietTagId, &DietManualOverride> = overrides
        .iter()
        .map(|entry| (&entry.diet_tag_id, entry))
        .collect();

    let mut latest: HashMap<&DietTagId, &DietInferenceRecord> = HashMap::new();
    for record in records
        .iter()
        .filter(|record| record.engine_version == engine_version)
    {
        latest
            .entry(record.diet_tag_id())
            .and_modify(|current| {
                if record.computed_at > current.computed_at {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    let mut ordered: Vec<&DietTag> = tags.iter().collect();
    ordered.sort_by(|left, right| left.key.cmp(&right.key).then(left.id.cmp(&right.id)));

    ordered
        .into_iter()
        .map(|tag| {
            let manual_override = overrides_by_tag.get(&tag.id).map(|entry| (*entry).clone());
            let inference = latest.get(&tag.id).copied();

            let (supported, source) = match (&manual_override, inference) {
                (Some(entry), _) => (Some(entry.supported), SuitabilitySource::Override),
                (None, Some(record)) => (
                    Some(record.inference.score > 0 || record.inference.matched_item_count() > 0),
                    SuitabilitySource::Inference,
                ),
                (None, None) => (None, SuitabilitySource::None),
            };

            EffectiveSuitability {
                diet_tag_id: tag.id.clone(),
                diet_tag_key: tag.key.clone(),
                diet_tag_label: tag.label.clone(),
                supported,
                source,
                manual_override,
                inference: inference.map(InferenceSummary::from),
            }
        })
        .collect()
}
