//! # Data Store Module
//!
//! Persists the whole cookbook (recipes, meal plan, basket and basket
//! period) as one JSON document. Each collection lives under its own
//! versioned key so older files and remote backups stay readable:
//!
//! ```json
//! {
//!   "version": 1,
//!   "cookbook-recipes": [ ... ],
//!   "cookbook-mealplans": { "2024-03-18-dinner": { ... } },
//!   "cookbook-basket": [ ... ],
//!   "cookbook-basket-period": { "start": "2024-03-18", "end": "2024-03-24" }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::basket::Basket;
use crate::meal_plan::MealPlan;
use crate::recipe_book::RecipeBook;

/// Layout version written to new files
pub const DATA_VERSION: u32 = 1;

/// Everything the cookbook persists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookbookData {
    #[serde(default = "current_version")]
    pub version: u32,

    #[serde(rename = "cookbook-recipes", default)]
    pub recipes: RecipeBook,

    #[serde(rename = "cookbook-mealplans", default)]
    pub meal_plan: MealPlan,

    #[serde(flatten)]
    pub basket: Basket,
}

fn current_version() -> u32 {
    DATA_VERSION
}

impl Default for CookbookData {
    fn default() -> Self {
        Self {
            version: DATA_VERSION,
            recipes: RecipeBook::default(),
            meal_plan: MealPlan::default(),
            basket: Basket::default(),
        }
    }
}

impl CookbookData {
    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize cookbook data")
    }

    /// Parse a JSON document, tolerating missing collections
    pub fn from_json(json: &str) -> Result<Self> {
        let data: Self = serde_json::from_str(json).context("Failed to parse cookbook data")?;
        if data.version > DATA_VERSION {
            warn!(
                version = data.version,
                supported = DATA_VERSION,
                "Cookbook data was written by a newer version"
            );
        }
        Ok(data)
    }
}

/// JSON file holding the cookbook data
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the data file; a missing file is an empty cookbook
    pub fn load(&self) -> Result<CookbookData> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No data file yet, starting with an empty cookbook");
            return Ok(CookbookData::default());
        }

        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read data file {}", self.path.display()))?;
        let data = CookbookData::from_json(&json)
            .with_context(|| format!("Data file {} is not valid", self.path.display()))?;

        debug!(
            path = %self.path.display(),
            recipes = data.recipes.len(),
            planned_meals = data.meal_plan.len(),
            basket_items = data.basket.items.len(),
            "Loaded cookbook data"
        );
        Ok(data)
    }

    /// Write the data file through a temporary file so a crash never leaves it half written
    pub fn save(&self, data: &CookbookData) -> Result<()> {
        let json = data.to_json()?;

        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&directory)
            .with_context(|| format!("Failed to create directory {}", directory.display()))?;

        let mut temp_file = NamedTempFile::new_in(&directory)
            .context("Failed to create temporary data file")?;
        temp_file
            .write_all(json.as_bytes())
            .context("Failed to write temporary data file")?;
        temp_file
            .persist(&self.path)
            .with_context(|| format!("Failed to replace data file {}", self.path.display()))?;

        info!(
            path = %self.path.display(),
            recipes = data.recipes.len(),
            "Saved cookbook data"
        );
        Ok(())
    }
}
