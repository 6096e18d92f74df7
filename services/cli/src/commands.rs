use crate::snapshot::RestaurantSnapshot;
use clap::Args;
use menu_diet::config::{AppConfig, EngineSettings};
use menu_diet::diet::{ConfidenceLevel, DietInference, DietTag, MenuItemRepository};
use menu_diet::error::AppError;
use menu_diet::{DietSuitabilityService, EvidenceScorer, RuleRegistry, ENGINE_VERSION};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Restaurant snapshot (JSON) with tags, menu items, and overrides
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Optional menu CSV export replacing the snapshot's menu items
    #[arg(long)]
    pub(crate) menu_csv: Option<PathBuf>,
    /// Only print results for this tag key
    #[arg(long)]
    pub(crate) tag: Option<String>,
    /// Skip the subdiet inheritance pass regardless of configuration
    #[arg(long)]
    pub(crate) no_inherit: bool,
    /// Print compact summaries instead of full evidence trails
    #[arg(long)]
    pub(crate) summary: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SuitabilityArgs {
    /// Restaurant snapshot (JSON) with tags, menu items, and overrides
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Optional menu CSV export replacing the snapshot's menu items
    #[arg(long)]
    pub(crate) menu_csv: Option<PathBuf>,
    /// Print one line per tag instead of JSON
    #[arg(long)]
    pub(crate) lines: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RulesArgs {
    /// Diet tag key, e.g. VEGAN
    pub(crate) key: String,
    /// Extra keywords (JSON array or comma separated) layered on the built-in list
    #[arg(long)]
    pub(crate) keywords: Option<String>,
    /// Extra dish names (JSON array or comma separated)
    #[arg(long)]
    pub(crate) dishes: Option<String>,
    /// Extra allergen exclusions (JSON array or comma separated)
    #[arg(long)]
    pub(crate) allergens: Option<String>,
}

#[derive(Serialize)]
struct ScoreReport<'a, T: Serialize> {
    restaurant_id: &'a str,
    engine_version: &'static str,
    results: Vec<T>,
}

#[derive(Serialize)]
struct ScoreSummary<'a> {
    diet_tag_key: &'a str,
    score: u8,
    confidence: ConfidenceLevel,
    match_ratio: f64,
    matched_item_count: usize,
    excluded_item_count: usize,
}

impl<'a> From<&'a DietInference> for ScoreSummary<'a> {
    fn from(result: &'a DietInference) -> Self {
        Self {
            diet_tag_key: &result.diet_tag_key,
            score: result.score,
            confidence: result.confidence,
            match_ratio: result.reasons.match_ratio,
            matched_item_count: result.matched_item_count(),
            excluded_item_count: result.excluded_item_count(),
        }
    }
}

pub(crate) fn run_score(args: ScoreArgs, config: &AppConfig) -> Result<(), AppError> {
    let ScoreArgs {
        snapshot,
        menu_csv,
        tag,
        no_inherit,
        summary,
    } = args;

    let snapshot = RestaurantSnapshot::load(&snapshot, menu_csv.as_deref())?;
    let item_overrides = snapshot.item_overrides.clone();
    let tags = snapshot.tags.clone();
    let (restaurant, store) = snapshot.into_store()?;
    let items = store.active_menu_items(&restaurant)?;

    let inherit = config.engine.inherit_subdiets && !no_inherit;
    let scorer = EvidenceScorer::new(RuleRegistry::builtin());
    let results: Vec<DietInference> = scorer
        .infer_restaurant(&tags, &items, &item_overrides, inherit)
        .into_iter()
        .filter(|result| {
            tag.as_deref()
                .map_or(true, |key| result.diet_tag_key.eq_ignore_ascii_case(key))
        })
        .collect();

    info!(
        restaurant = %restaurant.0,
        tags = results.len(),
        items = items.len(),
        inherit,
        "scored restaurant menu"
    );

    let rendered = if summary {
        serde_json::to_string_pretty(&ScoreReport {
            restaurant_id: &restaurant.0,
            engine_version: ENGINE_VERSION,
            results: results.iter().map(ScoreSummary::from).collect(),
        })?
    } else {
        serde_json::to_string_pretty(&ScoreReport {
            restaurant_id: &restaurant.0,
            engine_version: ENGINE_VERSION,
            results,
        })?
    };
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_suitability(args: SuitabilityArgs, config: &AppConfig) -> Result<(), AppError> {
    let SuitabilityArgs {
        snapshot,
        menu_csv,
        lines,
    } = args;

    let snapshot = RestaurantSnapshot::load(&snapshot, menu_csv.as_deref())?;
    let (restaurant, store) = snapshot.into_store()?;
    let service = DietSuitabilityService::new(
        Arc::new(store),
        Arc::new(EvidenceScorer::new(RuleRegistry::builtin())),
        EngineSettings {
            inherit_subdiets: config.engine.inherit_subdiets,
        },
    );

    let records = service.compute_for_restaurant(&restaurant)?;
    let resolved = service.compute_effective_suitability(&restaurant)?;
    info!(
        restaurant = %restaurant.0,
        stored = records.len(),
        "resolved effective suitability"
    );

    if lines {
        println!("Diet suitability for {} (engine {})", restaurant.0, ENGINE_VERSION);
        for entry in &resolved {
            println!("- {}", entry.summary());
        }
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

pub(crate) fn run_rules(args: RulesArgs) -> Result<(), AppError> {
    let RulesArgs {
        key,
        keywords,
        dishes,
        allergens,
    } = args;

    let registry = RuleRegistry::builtin();
    let mut tag = DietTag::new("cli", key.trim(), key.trim());
    tag.keyword_whitelist = keywords.as_deref().map(DietTag::parse_rule_list).unwrap_or_default();
    tag.dish_whitelist = dishes.as_deref().map(DietTag::parse_rule_list).unwrap_or_default();
    tag.allergen_exclusions = allergens
        .as_deref()
        .map(DietTag::parse_rule_list)
        .unwrap_or_default();

    if !registry.is_known(&tag.key) {
        info!(key = %tag.key, "no built-in rules for key; showing stored lists only");
    }

    let merged = registry.merged_rules(&tag);
    println!("{}", serde_json::to_string_pretty(&merged)?);
    Ok(())
}
