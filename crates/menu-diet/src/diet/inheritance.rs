use std::collections::HashSet;

use tracing::debug;

use super::domain::{DietInference, MatchedItem, MenuItemId};
use super::evidence::scoring::{self, Tally};

/// Lift child tags with their parent's positive evidence (everything vegan is vegetarian).
///
/// Pairs are applied in declaration order, so chains work when parents are declared first.
/// A child never loses score or confidence through inheritance. Items the child itself
/// excluded are not re-added from the parent.
pub fn apply_subdiet_inheritance(results: &mut [DietInference], subdiets: &[(String, String)]) {
    for (parent_key, child_key) in subdiets {
        let Some(parent) = position_of(results, parent_key) else {
            continue;
        };
        let Some(child) = position_of(results, child_key) else {
            continue;
        };
        if parent == child {
            continue;
        }

        let inherited = results[parent].reasons.matched_items.clone();
        inherit_into(&mut results[child], inherited, parent_key);
    }
}

fn position_of(results: &[DietInference], key: &str) -> Option<usize> {
    results
        .iter()
        .position(|result| result.diet_tag_key.trim().eq_ignore_ascii_case(key))
}

fn inherit_into(child: &mut DietInference, parent_matches: Vec<MatchedItem>, parent_key: &str) {
    let known: HashSet<MenuItemId> = child
        .reasons
        .matched_items
        .iter()
        .map(|item| item.item_id.clone())
        .chain(
            child
                .reasons
                .excluded_items
                .iter()
                .map(|item| item.item_id.clone()),
        )
        .collect();

    let additions: Vec<MatchedItem> = parent_matches
        .into_iter()
        .filter(|item| !known.contains(&item.item_id))
        .map(|mut item| {
            item.inherited_from = Some(parent_key.to_string());
            item
        })
        .collect();
    if additions.is_empty() {
        return;
    }

    let mut merged = child.reasons.matched_items.clone();
    merged.extend(additions);

    let tally = Tally::from_items(
        &merged,
        &child.reasons.excluded_items,
        child.reasons.total_menu_items,
    );
    let lifted = scoring::score(&tally);

    debug!(
        child = %child.diet_tag_key,
        parent = parent_key,
        original_score = child.score,
        inherited_score = lifted.score,
        "applied subdiet inheritance"
    );

    if lifted.score >= child.score {
        child.reasons.score_breakdown = lifted.breakdown;
    }
    child.score = child.score.max(lifted.score);
    child.confidence = child.confidence.max(lifted.confidence);
    child.reasons.match_ratio = child.reasons.match_ratio.max(lifted.match_ratio);
    child.reasons.matched_items = merged;
}
