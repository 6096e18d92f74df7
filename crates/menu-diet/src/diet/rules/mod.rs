mod builtin;

use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;

use super::domain::DietTag;
use super::text::{compile_patterns, compile_terms, normalize_list, TermMatcher};

/// Rules for one diet tag key. All term lists hold normalized text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DietRuleSet {
    pub keywords: Vec<String>,
    pub dishes: Vec<String>,
    pub allergen_exclusions: Vec<String>,
    pub negative_keywords: Vec<String>,
    /// Terms that name the diet itself ("vegan", "glutenfrei").
    pub qualifiers: Vec<String>,
    /// Negative keywords tolerated when the item name carries a qualifier ("Vegan Chicken").
    pub qualified_negatives: Vec<String>,
    /// Regular expressions over normalized text that contradict the diet outright.
    pub contradictions: Vec<String>,
}

/// Returned for unknown tag keys.
static EMPTY_RULES: DietRuleSet = DietRuleSet {
    keywords: Vec::new(),
    dishes: Vec::new(),
    allergen_exclusions: Vec::new(),
    negative_keywords: Vec::new(),
    qualifiers: Vec::new(),
    qualified_negatives: Vec::new(),
    contradictions: Vec::new(),
};

impl DietRuleSet {
    pub fn empty() -> &'static DietRuleSet {
        &EMPTY_RULES
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.dishes.is_empty() && self.allergen_exclusions.is_empty()
    }
}

/// Vocabulary shared by every tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SharedVocabulary {
    pub meat_terms: Vec<String>,
    pub milk_terms: Vec<String>,
    pub lactose_free_phrases: Vec<String>,
    pub side_terms: Vec<String>,
    pub negators: Vec<String>,
    pub claim_prefixes: Vec<String>,
    pub cross_contamination: Vec<String>,
}

/// Injectable registry mapping tag keys to rule sets, plus the declared parent→child
/// subdiet pairs.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: BTreeMap<String, DietRuleSet>,
    subdiets: Vec<(String, String)>,
    shared: SharedVocabulary,
}

impl RuleRegistry {
    /// A registry with no tag rules; every key resolves to the empty rule set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The rule tables shipped with the current engine version.
    pub fn builtin() -> Self {
        let mut registry = Self {
            rules: BTreeMap::new(),
            subdiets: builtin::SUBDIETS
                .iter()
                .map(|(parent, child)| (parent.to_string(), child.to_string()))
                .collect(),
            shared: SharedVocabulary {
                meat_terms: normalize_list(
                    builtin::MEAT_TERMS
                        .iter()
                        .chain(builtin::FISH_TERMS)
                        .copied(),
                ),
                milk_terms: normalize_list(builtin::MILK_TERMS.iter().copied()),
                lactose_free_phrases: normalize_list(
                    builtin::LACTOSE_FREE_PHRASES.iter().copied(),
                ),
                side_terms: normalize_list(builtin::SIDE_TERMS.iter().copied()),
                negators: normalize_list(builtin::NEGATORS.iter().copied()),
                claim_prefixes: normalize_list(builtin::CLAIM_PREFIXES.iter().copied()),
                cross_contamination: builtin::CROSS_CONTAMINATION
                    .iter()
                    .map(|pattern| pattern.to_string())
                    .collect(),
            },
        };

        for tag in builtin::TAGS {
            registry.insert(
                tag.key,
                DietRuleSet {
                    keywords: normalize_list(tag.keywords.iter().copied()),
                    dishes: normalize_list(tag.dishes.iter().copied()),
                    allergen_exclusions: normalize_list(tag.allergen_exclusions.iter().copied()),
                    negative_keywords: normalize_list(
                        tag.negative_keywords.iter().flat_map(|list| list.iter().copied()),
                    ),
                    qualifiers: normalize_list(tag.qualifiers.iter().copied()),
                    qualified_negatives: normalize_list(tag.qualified_negatives.iter().copied()),
                    contradictions: tag
                        .contradictions
                        .iter()
                        .map(|pattern| pattern.to_string())
                        .collect(),
                },
            );
        }

        registry
    }

    /// Register or replace the rules for a key.
    pub fn insert(&mut self, key: &str, rules: DietRuleSet) {
        self.rules.insert(canonical_key(key), rules);
    }

    pub fn with_subdiet(mut self, parent: &str, child: &str) -> Self {
        let pair = (canonical_key(parent), canonical_key(child));
        if !self.subdiets.contains(&pair) {
            self.subdiets.push(pair);
        }
        self
    }

    pub fn with_shared(mut self, shared: SharedVocabulary) -> Self {
        self.shared = shared;
        self
    }

    /// Rules for `key`, or the empty sentinel when the key is unknown.
    pub fn rules_for(&self, key: &str) -> &DietRuleSet {
        self.rules
            .get(&canonical_key(key))
            .unwrap_or_else(|| DietRuleSet::empty())
    }

    pub fn is_known(&self, key: &str) -> bool {
        self.rules.contains_key(&canonical_key(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Declared (parent, child) pairs in declaration order.
    pub fn subdiets(&self) -> &[(String, String)] {
        &self.subdiets
    }

    pub fn shared(&self) -> &SharedVocabulary {
        &self.shared
    }

    /// Built-in rules for the tag's key unioned with the tag's stored lists.
    pub fn merged_rules(&self, tag: &DietTag) -> DietRuleSet {
        let base = self.rules_for(&tag.key);
        DietRuleSet {
            keywords: union(&base.keywords, &tag.keyword_whitelist),
            dishes: union(&base.dishes, &tag.dish_whitelist),
            allergen_exclusions: union(&base.allergen_exclusions, &tag.allergen_exclusions),
            ..base.clone()
        }
    }

    /// Merge and compile the rules for one tag, ready for scoring.
    pub fn compile(&self, tag: &DietTag) -> CompiledRules {
        let merged = self.merged_rules(tag);
        let claims = claim_patterns(&self.shared.claim_prefixes, &merged.qualifiers);

        CompiledRules {
            tag_key: canonical_key(&tag.key),
            keywords: compile_terms(&merged.keywords),
            dishes: compile_terms(&merged.dishes),
            allergen_exclusions: compile_terms(&merged.allergen_exclusions),
            negative_keywords: compile_terms(&merged.negative_keywords),
            qualifiers: compile_terms(&merged.qualifiers),
            qualified_negatives: merged.qualified_negatives,
            contradictions: compile_patterns(&merged.contradictions),
            claims: compile_patterns(&claims),
            meat_terms: self.shared.meat_terms.clone(),
            milk_terms: self.shared.milk_terms.clone(),
            lactose_free_phrases: compile_terms(&self.shared.lactose_free_phrases),
            side_terms: self.shared.side_terms.clone(),
            negators: self.shared.negators.clone(),
            cross_contamination: compile_patterns(&self.shared.cross_contamination),
        }
    }
}

fn canonical_key(key: &str) -> String {
    key.trim().to_ascii_uppercase()
}

fn union(base: &[String], custom: &[String]) -> Vec<String> {
    normalize_list(base.iter().chain(custom).map(String::as_str))
}

/// "is vegan", "100% vegetarian", "halal certified".
fn claim_patterns(prefixes: &[String], qualifiers: &[String]) -> Vec<String> {
    if qualifiers.is_empty() {
        return Vec::new();
    }

    let qualifier_group = qualifiers
        .iter()
        .map(|qualifier| {
            qualifier
                .split(|ch: char| ch.is_whitespace() || ch == '-')
                .filter(|word| !word.is_empty())
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"[\s\-]*")
        })
        .collect::<Vec<_>>()
        .join("|");

    let mut patterns = Vec::new();
    if !prefixes.is_empty() {
        let prefix_group = prefixes
            .iter()
            .map(|prefix| regex::escape(prefix))
            .collect::<Vec<_>>()
            .join("|");
        patterns.push(format!(r"(?:^|\s)(?:{prefix_group})\s*(?:{qualifier_group})\b"));
    }
    patterns.push(format!(r"\b(?:{qualifier_group})\s+(?:certified|zertifiziert)\b"));
    patterns
}

/// One tag's rules with every term compiled. Built once per scoring run.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub(crate) tag_key: String,
    pub(crate) keywords: Vec<TermMatcher>,
    pub(crate) dishes: Vec<TermMatcher>,
    pub(crate) allergen_exclusions: Vec<TermMatcher>,
    pub(crate) negative_keywords: Vec<TermMatcher>,
    pub(crate) qualifiers: Vec<TermMatcher>,
    pub(crate) qualified_negatives: Vec<String>,
    pub(crate) contradictions: Vec<Regex>,
    pub(crate) claims: Vec<Regex>,
    pub(crate) meat_terms: Vec<String>,
    pub(crate) milk_terms: Vec<String>,
    pub(crate) lactose_free_phrases: Vec<TermMatcher>,
    pub(crate) side_terms: Vec<String>,
    pub(crate) negators: Vec<String>,
    pub(crate) cross_contamination: Vec<Regex>,
}

impl CompiledRules {
    pub fn tag_key(&self) -> &str {
        &self.tag_key
    }

    /// True when no positive evidence can ever be found with these rules.
    pub fn has_positive_rules(&self) -> bool {
        !self.keywords.is_empty() || !self.dishes.is_empty()
    }

    pub(crate) fn is_qualifier_word(&self, word: &str) -> bool {
        self.qualifiers.iter().any(|matcher| matcher.is_match(word))
    }
}
