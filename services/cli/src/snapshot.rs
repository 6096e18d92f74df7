use menu_diet::diet::{
    DietManualOverride, DietTag, MenuCsvImporter, MenuItem, MenuItemDietOverride, RestaurantId,
};
use menu_diet::error::AppError;
use menu_diet::{MemoryDietStore, RuleRegistry};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Everything known about one restaurant, as exported by the menu backend.
#[derive(Debug, Deserialize)]
pub(crate) struct RestaurantSnapshot {
    pub(crate) restaurant_id: RestaurantId,
    #[serde(default)]
    pub(crate) tags: Vec<DietTag>,
    #[serde(default)]
    pub(crate) menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub(crate) item_overrides: Vec<MenuItemDietOverride>,
    #[serde(default)]
    pub(crate) manual_overrides: Vec<DietManualOverride>,
}

impl RestaurantSnapshot {
    /// Load a JSON snapshot. A menu CSV, when given, replaces the snapshot's items; a
    /// snapshot without tags falls back to one tag per built-in rule key.
    pub(crate) fn load(path: &Path, menu_csv: Option<&Path>) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path)?;
        let mut snapshot: RestaurantSnapshot = serde_json::from_str(&raw)?;

        if let Some(csv_path) = menu_csv {
            snapshot.menu_items = MenuCsvImporter::new().import_path(csv_path)?;
        }
        if snapshot.tags.is_empty() {
            snapshot.tags = builtin_tags(&RuleRegistry::builtin());
        }

        debug!(
            restaurant = %snapshot.restaurant_id.0,
            tags = snapshot.tags.len(),
            items = snapshot.menu_items.len(),
            "loaded restaurant snapshot"
        );
        Ok(snapshot)
    }

    pub(crate) fn into_store(self) -> Result<(RestaurantId, MemoryDietStore), AppError> {
        let store = MemoryDietStore::new();
        for tag in self.tags {
            store.put_tag(tag)?;
        }
        store.put_menu(&self.restaurant_id, self.menu_items)?;
        for entry in self.item_overrides {
            store.put_item_override(entry)?;
        }
        for entry in self.manual_overrides {
            store.put_manual_override(entry)?;
        }
        Ok((self.restaurant_id, store))
    }
}

fn builtin_tags(registry: &RuleRegistry) -> Vec<DietTag> {
    registry
        .keys()
        .map(|key| {
            DietTag::new(
                format!("builtin-{}", key.to_ascii_lowercase()),
                key,
                key.replace('_', " ").to_ascii_lowercase(),
            )
        })
        .collect()
}
