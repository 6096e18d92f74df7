use crate::diet::domain::{ExcludedItem, MatchKind, MatchedItem, MenuItem};
use crate::diet::rules::CompiledRules;
use crate::diet::text::{
    allergen_tokens, clause_before, normalize_text, words_after, words_before, TermMatcher,
};

pub(crate) const DISH_WEIGHT: f64 = 1.2;
pub(crate) const KEYWORD_WEIGHT: f64 = 1.0;
pub(crate) const CONTAMINATED_WEIGHT: f64 = 0.5;
pub(crate) const STRONG_EXCLUSION_WEIGHT: f64 = 1.2;
pub(crate) const EXCLUSION_WEIGHT: f64 = 1.0;

pub(crate) const MANUAL_OVERRIDE_FALSE: &str = "manual-override:false";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ItemVerdict {
    Ignored,
    Matched(MatchedItem),
    Excluded(ExcludedItem),
}

/// Normalized views of one item's text.
struct ItemText {
    name: String,
    context: String,
    full: String,
}

impl ItemText {
    fn from_item(item: &MenuItem) -> Self {
        let name = normalize_text(&item.name);
        let context = [
            item.category_name.as_deref(),
            item.description.as_deref(),
            item.diet_context.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(normalize_text)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ; ");
        let full = if context.is_empty() {
            name.clone()
        } else {
            format!("{name} ; {context}")
        };

        Self {
            name,
            context,
            full,
        }
    }

    fn mentions(&self, matcher: &TermMatcher) -> bool {
        matcher.is_match(&self.name) || matcher.is_match(&self.context)
    }
}

/// Run the per-item pipeline for one tag.
pub(crate) fn evaluate_item(
    rules: &CompiledRules,
    item: &MenuItem,
    manual: Option<bool>,
) -> ItemVerdict {
    match manual {
        Some(true) => {
            return ItemVerdict::Matched(MatchedItem {
                item_id: item.id.clone(),
                name: item.name.clone(),
                kind: MatchKind::ManualOverride,
                weight: KEYWORD_WEIGHT,
                strong_signal: true,
                signals: vec!["manual-override:true".to_string()],
                inherited_from: None,
            })
        }
        Some(false) => {
            return ItemVerdict::Excluded(ExcludedItem {
                item_id: item.id.clone(),
                name: item.name.clone(),
                strong_signal: false,
                reasons: vec![MANUAL_OVERRIDE_FALSE.to_string()],
            })
        }
        None => {}
    }

    let text = ItemText::from_item(item);

    let keyword_hits: Vec<&str> = rules
        .keywords
        .iter()
        .filter(|matcher| text.mentions(matcher))
        .map(|matcher| matcher.term())
        .collect();
    let dish_hits: Vec<&str> = rules
        .dishes
        .iter()
        .filter(|matcher| text.mentions(matcher))
        .map(|matcher| matcher.term())
        .collect();

    if keyword_hits.is_empty() && dish_hits.is_empty() {
        return ItemVerdict::Ignored;
    }

    let name_qualified = rules
        .qualifiers
        .iter()
        .any(|matcher| matcher.is_match(&text.name));
    let explicit_claim = rules.claims.iter().any(|claim| claim.is_match(&text.full));
    let strong_signal = name_qualified || explicit_claim || !dish_hits.is_empty();

    let lactose_free_phrase = rules
        .lactose_free_phrases
        .iter()
        .any(|matcher| matcher.is_match(&text.full));

    let mut penalties = Vec::new();

    for matcher in &rules.negative_keywords {
        let term = matcher.term();
        if name_qualified && rules.qualified_negatives.iter().any(|allowed| allowed == term) {
            continue;
        }
        if lactose_free_phrase && rules.milk_terms.iter().any(|milk| milk == term) {
            continue;
        }
        if explicit_claim && rules.meat_terms.iter().any(|meat| meat == term) {
            continue;
        }

        let unsuppressed = matcher
            .occurrences(&text.full)
            .into_iter()
            .any(|(start, end)| !occurrence_suppressed(rules, &text.full, start, end));
        if unsuppressed {
            penalties.push(format!("negative-keyword:{term}"));
        }
    }

    for contradiction in &rules.contradictions {
        let stated = contradiction
            .find_iter(&text.full)
            .find(|found| !in_trace_warning(rules, &text.full, found.end()));
        if let Some(found) = stated {
            penalties.push(format!("contradiction:{}", found.as_str()));
        }
    }

    if side_mention_only(rules, &text.full) {
        penalties.push("context-false-positive".to_string());
    }

    let tokens = allergen_tokens(item.allergens.as_deref());
    for token in &tokens {
        if rules
            .allergen_exclusions
            .iter()
            .any(|matcher| matcher.is_match(token))
        {
            penalties.push(format!("allergen:{token}"));
        }
    }

    if !penalties.is_empty() {
        return ItemVerdict::Excluded(ExcludedItem {
            item_id: item.id.clone(),
            name: item.name.clone(),
            strong_signal,
            reasons: penalties,
        });
    }

    let contaminated = rules
        .cross_contamination
        .iter()
        .any(|pattern| pattern.is_match(&text.full));

    let mut signals: Vec<String> = dish_hits
        .iter()
        .map(|dish| format!("dish:{dish}"))
        .chain(keyword_hits.iter().map(|keyword| format!("keyword:{keyword}")))
        .collect();
    if name_qualified {
        signals.push("name-qualifier".to_string());
    }
    if explicit_claim {
        signals.push("explicit-claim".to_string());
    }

    let (kind, weight) = if contaminated {
        signals.push("cross-contamination".to_string());
        (MatchKind::CrossContamination, CONTAMINATED_WEIGHT)
    } else if !dish_hits.is_empty() {
        (MatchKind::Dish, DISH_WEIGHT)
    } else {
        (MatchKind::Keyword, KEYWORD_WEIGHT)
    };

    ItemVerdict::Matched(MatchedItem {
        item_id: item.id.clone(),
        name: item.name.clone(),
        kind,
        weight,
        strong_signal,
        signals,
        inherited_from: None,
    })
}

/// A single negative hit is ignored when it is negated ("ohne Milch", "milk-free",
/// "dairy-free milk"), qualified by the diet itself ("vegan mayo"), or part of a trace warning.
fn occurrence_suppressed(rules: &CompiledRules, text: &str, start: usize, end: usize) -> bool {
    let following = words_after(text, end, 1);
    if let Some(next) = following.first() {
        if is_free_word(next) {
            return true;
        }
    }

    let preceding = words_before(text, start, 2);
    if let Some(previous) = preceding.first() {
        let previous = previous.trim_matches('-');
        if rules.negators.iter().any(|negator| negator == previous)
            || previous.ends_with("-free")
            || previous.ends_with("frei")
            || rules.is_qualifier_word(previous)
        {
            return true;
        }
        if let Some(before_previous) = preceding.get(1) {
            if matches!(
                (*before_previous, previous),
                ("free", "from") | ("free", "of") | ("frei", "von")
            ) {
                return true;
            }
            if rules.negators.iter().any(|negator| negator == before_previous)
                && matches!(previous, "any" | "added" | "real" | "echte" | "echten")
            {
                return true;
            }
        }
    }

    in_trace_warning(rules, text, start)
}

/// True when the clause running up to `end` is a trace warning ("may contain milk").
fn in_trace_warning(rules: &CompiledRules, text: &str, end: usize) -> bool {
    let clause = clause_before(text, end);
    rules
        .cross_contamination
        .iter()
        .any(|pattern| pattern.is_match(clause))
}

fn is_free_word(word: &str) -> bool {
    matches!(
        word,
        "free" | "frei" | "freie" | "freier" | "freies" | "freien"
    )
}

/// True when every positive keyword occurrence only qualifies a side or condiment while the
/// text names a disqualifying protein ("Chicken wings with vegan dip").
fn side_mention_only(rules: &CompiledRules, text: &str) -> bool {
    let occurrences: Vec<(usize, usize)> = rules
        .keywords
        .iter()
        .flat_map(|matcher| matcher.occurrences(text))
        .collect();
    if occurrences.is_empty() {
        return false;
    }

    let all_sides = occurrences.iter().all(|&(_, end)| {
        words_after(text, end, 2)
            .iter()
            .any(|word| rules.side_terms.iter().any(|side| side == word))
    });
    if !all_sides {
        return false;
    }

    rules.negative_keywords.iter().any(|matcher| {
        rules.meat_terms.iter().any(|meat| meat == matcher.term()) && matcher.is_match(text)
    })
}
