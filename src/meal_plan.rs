//! # Meal Plan Module
//!
//! Maps calendar slots (a date plus breakfast, lunch or dinner) to planned
//! recipes. Entries only reference recipes by id; a recipe deleted after it
//! was planned leaves a dangling entry that consumers are expected to skip.
//!
//! In the data file the plan is a JSON object keyed by `"<ISO-date>-<meal>"`,
//! e.g. `"2024-03-18-dinner"`. In memory the key is the typed [`MealSlot`],
//! so a hyphen inside the date can never be mistaken for the separator.

use chrono::{Datelike, Days, NaiveDate};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{CookbookError, Result};
use crate::recipe_model::{string_or_number, Recipe};

/// Number of days shown by the planning calendar
pub const CALENDAR_DAYS: usize = 14;

/// The three meals of a day, in the order they are served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    /// All meals in serving order
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    /// Storage name ("breakfast", "lunch", "dinner")
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }

    /// Capitalized name for display
    pub fn label(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MealType {
    type Err = CookbookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            other => Err(CookbookError::InvalidMealType(other.to_string())),
        }
    }
}

/// A calendar slot: one meal on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MealSlot {
    pub date: NaiveDate,
    pub meal: MealType,
}

impl MealSlot {
    pub fn new(date: NaiveDate, meal: MealType) -> Self {
        Self { date, meal }
    }

    /// Key used in the data file, e.g. "2024-03-18-dinner"
    pub fn storage_key(&self) -> String {
        format!("{}-{}", self.date.format("%Y-%m-%d"), self.meal.as_str())
    }

    /// Decode a data file key; the meal is everything after the last '-'
    pub fn from_storage_key(key: &str) -> Result<Self> {
        let (date, meal) = key
            .rsplit_once('-')
            .ok_or_else(|| CookbookError::InvalidMealPlanKey(key.to_string()))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| CookbookError::InvalidMealPlanKey(key.to_string()))?;
        let meal = meal
            .parse()
            .map_err(|_| CookbookError::InvalidMealPlanKey(key.to_string()))?;
        Ok(Self { date, meal })
    }
}

/// A planned meal, pointing at a recipe by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanEntry {
    #[serde(default, deserialize_with = "string_or_number")]
    pub recipe_id: String,
    /// Title at planning time, shown when the recipe is gone
    #[serde(default)]
    pub recipe_name: String,
}

impl MealPlanEntry {
    pub fn for_recipe(recipe: &Recipe) -> Self {
        Self {
            recipe_id: recipe.id.clone(),
            recipe_name: recipe.title.clone(),
        }
    }
}

/// All planned meals, ordered by date then meal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, MealPlanEntry>",
    into = "BTreeMap<String, MealPlanEntry>"
)]
pub struct MealPlan {
    entries: BTreeMap<MealSlot, MealPlanEntry>,
}

impl From<BTreeMap<String, MealPlanEntry>> for MealPlan {
    fn from(stored: BTreeMap<String, MealPlanEntry>) -> Self {
        let mut entries = BTreeMap::new();
        for (key, entry) in stored {
            match MealSlot::from_storage_key(&key) {
                Ok(slot) => {
                    entries.insert(slot, entry);
                }
                Err(e) => warn!("Dropping meal plan entry: {}", e),
            }
        }
        Self { entries }
    }
}

impl From<MealPlan> for BTreeMap<String, MealPlanEntry> {
    fn from(plan: MealPlan) -> Self {
        plan.entries
            .into_iter()
            .map(|(slot, entry)| (slot.storage_key(), entry))
            .collect()
    }
}

impl MealPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan a recipe for a slot, returning whatever was planned there before
    pub fn assign(&mut self, date: NaiveDate, meal: MealType, recipe: &Recipe) -> Option<MealPlanEntry> {
        debug!("Planning recipe {} for {} {}", recipe.id, date, meal);
        self.entries
            .insert(MealSlot::new(date, meal), MealPlanEntry::for_recipe(recipe))
    }

    /// Clear a slot
    pub fn remove(&mut self, date: NaiveDate, meal: MealType) -> Option<MealPlanEntry> {
        self.entries.remove(&MealSlot::new(date, meal))
    }

    pub fn get(&self, date: NaiveDate, meal: MealType) -> Option<&MealPlanEntry> {
        self.entries.get(&MealSlot::new(date, meal))
    }

    /// Planned meals between two dates, both inclusive, in calendar order
    pub fn entries_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = (&MealSlot, &MealPlanEntry)> {
        let (from, to) = if start <= end { (start, end) } else { (end, start) };
        self.entries
            .range(MealSlot::new(from, MealType::Breakfast)..=MealSlot::new(to, MealType::Dinner))
    }

    /// Keep the stored title in step after a recipe is renamed
    pub fn rename_recipe(&mut self, recipe: &Recipe) -> usize {
        let mut renamed = 0;
        for entry in self.entries.values_mut() {
            if entry.recipe_id == recipe.id && entry.recipe_name != recipe.title {
                entry.recipe_name = recipe.title.clone();
                renamed += 1;
            }
        }
        renamed
    }

    /// Drop every entry dated before `date`
    pub fn prune_before(&mut self, date: NaiveDate) -> usize {
        let before = self.entries.len();
        self.entries.retain(|slot, _| slot.date >= date);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The days shown by the planning calendar: two weeks from the Monday of
/// the anchor's week
pub fn calendar_window(anchor: NaiveDate) -> Vec<NaiveDate> {
    let offset = u64::from(anchor.weekday().num_days_from_monday());
    let monday = anchor.checked_sub_days(Days::new(offset)).unwrap_or(anchor);
    monday.iter_days().take(CALENDAR_DAYS).collect()
}
