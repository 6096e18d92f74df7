use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use super::domain::{MenuItem, MenuItemId};

/// Reads provider menu exports into scorer inputs.
///
/// Expected header: `id,name,description,diet_context,category,allergens,active` with an
/// optional `category_active` column. Blank cells become `None`; missing activity flags
/// default to active. Rows without a name are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct MenuCsvImporter;

impl MenuCsvImporter {
    pub fn new() -> Self {
        Self
    }

    pub fn import_path(&self, path: impl AsRef<Path>) -> Result<Vec<MenuItem>, MenuImportError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| MenuImportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.import_reader(file)
    }

    pub fn import_reader<R: Read>(&self, reader: R) -> Result<Vec<MenuItem>, MenuImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let mut items = Vec::new();

        for (index, record) in csv_reader.deserialize::<MenuRow>().enumerate() {
            let row = record?;
            let Some(item) = row.into_item() else {
                warn!(row = index + 1, "skipping menu row without a name");
                continue;
            };
            items.push(item);
        }

        debug!(items = items.len(), "imported menu rows");
        Ok(items)
    }
}

#[derive(Debug, Deserialize)]
struct MenuRow {
    id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    diet_context: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    allergens: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category_active: Option<String>,
}

impl MenuRow {
    fn into_item(self) -> Option<MenuItem> {
        let name = self.name?;
        Some(MenuItem {
            id: MenuItemId(self.id),
            name,
            description: self.description,
            diet_context: self.diet_context,
            category_name: self.category,
            allergens: self.allergens,
            active: parse_active(self.active.as_deref()),
            category_active: parse_active(self.category_active.as_deref()),
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_active(value: Option<&str>) -> bool {
    match value.map(|raw| raw.trim().to_ascii_lowercase()) {
        Some(flag) => !matches!(flag.as_str(), "0" | "false" | "no" | "n" | "inactive"),
        None => true,
    }
}

/// Error raised while importing a menu export.
#[derive(Debug, thiserror::Error)]
pub enum MenuImportError {
    #[error("failed to open menu export {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse menu export: {0}")]
    Csv(#[from] csv::Error),
}
