//! # Recipe Data Model
//!
//! Data structures for recipes as they are stored in the data file and in
//! remote backups. Field names follow the persisted camelCase JSON layout.
//!
//! ## Core Concepts
//!
//! - **Ingredient**: a name plus a free-text quantity and unit, kept exactly as authored
//! - **Recipe**: title, ingredients, steps, categories and a serving baseline for scaling
//! - **CookingTime**: hours and minutes, rendered as "1 hour 30 minutes"
//!
//! Stored data may come from older versions of the file or from hand edits,
//! so every field tolerates being missing or `null`.
//!
//! ## Usage
//!
//! ```rust
//! use cookbook::recipe_model::{Ingredient, Recipe};
//!
//! let pancakes = Recipe::new("1700000000000", "Pancakes")
//!     .with_servings(4)
//!     .with_ingredient(Ingredient::new("Flour").with_quantity("1 1/2").with_unit("cup"))
//!     .with_category("Breakfast");
//!
//! assert_eq!(pancakes.ingredients[0].to_string(), "1 1/2 cup Flour");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Serving count used when a stored recipe has none
pub const DEFAULT_SERVINGS: u32 = 1;

/// A single ingredient line of a recipe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// The name of the ingredient (e.g., "Flour", "Olive oil")
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Quantity as typed by the user ("1 1/2", "0.25", "a pinch")
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: String,

    /// Unit as typed by the user ("cup", "g", "")
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: String,
}

/// Preparation time of a recipe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookingTime {
    #[serde(deserialize_with = "null_as_default")]
    pub hours: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub minutes: u32,
}

/// A recipe as kept in the recipe book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Unique, time-based identifier (milliseconds since the epoch)
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,

    /// Display title, also used in shopping list provenance
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Number of servings the ingredient quantities are written for
    #[serde(default = "default_servings", deserialize_with = "null_as_default_servings")]
    pub servings: u32,

    /// Ordered ingredient lines
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<Ingredient>,

    /// Ordered preparation steps
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<String>,

    /// Free-form categories ("Pasta", "Quick Meals")
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub cooking_time: CookingTime,

    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: String,

    /// Encoded image blobs (data URLs); never decoded by the crate
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,

    #[serde(default = "Utc::now", deserialize_with = "null_as_now")]
    pub date_created: DateTime<Utc>,
}

fn default_servings() -> u32 {
    DEFAULT_SERVINGS
}

/// Treat an explicit JSON `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default_servings<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(DEFAULT_SERVINGS))
}

fn null_as_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DateTime<Utc>>::deserialize(deserializer)?.unwrap_or_else(Utc::now))
}

/// Ids written as JSON numbers by older files are read back as strings
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
        Missing(()),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
        RawId::Missing(()) => String::new(),
    })
}

impl Ingredient {
    /// Create a new ingredient with just a name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            quantity: String::new(),
            unit: String::new(),
        }
    }

    /// Set the quantity text
    pub fn with_quantity(mut self, quantity: &str) -> Self {
        self.quantity = quantity.to_string();
        self
    }

    /// Set the unit text
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    /// Ingredients without a name are dropped before saving
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Copy with surrounding whitespace removed from every field
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            quantity: self.quantity.trim().to_string(),
            unit: self.unit.trim().to_string(),
        }
    }
}

impl CookingTime {
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self { hours, minutes }
    }
}

impl Recipe {
    /// Create a recipe with a title and defaults everywhere else
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            servings: DEFAULT_SERVINGS,
            ingredients: Vec::new(),
            steps: Vec::new(),
            categories: Vec::new(),
            cooking_time: CookingTime::default(),
            comments: String::new(),
            images: Vec::new(),
            date_created: Utc::now(),
        }
    }

    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = servings;
        self
    }

    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    pub fn with_step(mut self, step: &str) -> Self {
        self.steps.push(step.to_string());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.categories.push(category.to_string());
        self
    }

    pub fn with_cooking_time(mut self, cooking_time: CookingTime) -> Self {
        self.cooking_time = cooking_time;
        self
    }

    /// Serving count used as the scaling baseline, never zero
    pub fn baseline_servings(&self) -> u32 {
        self.servings.max(DEFAULT_SERVINGS)
    }

    /// Case-insensitive category membership
    pub fn has_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.to_lowercase() == category.to_lowercase())
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [self.quantity.as_str(), self.unit.as_str(), self.name.as_str()]
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

fn plural_hours(hours: u32) -> &'static str {
    if hours > 1 {
        "hours"
    } else {
        "hour"
    }
}

impl fmt::Display for CookingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours == 0 {
            write!(f, "{} minutes", self.minutes)
        } else if self.minutes == 0 {
            write!(f, "{} {}", self.hours, plural_hours(self.hours))
        } else {
            write!(
                f,
                "{} {} {} minutes",
                self.hours,
                plural_hours(self.hours),
                self.minutes
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_creation() {
        let ingredient = Ingredient::new("Flour").with_quantity("2").with_unit("cups");

        assert_eq!(ingredient.name, "Flour");
        assert_eq!(ingredient.quantity, "2");
        assert_eq!(ingredient.unit, "cups");
        assert!(ingredient.has_name());
        assert!(!Ingredient::new("   ").has_name());
    }

    #[test]
    fn test_ingredient_display_skips_blank_parts() {
        assert_eq!(
            Ingredient::new("Flour").with_quantity("2").with_unit("cups").to_string(),
            "2 cups Flour"
        );
        assert_eq!(Ingredient::new("Eggs").with_quantity("3").to_string(), "3 Eggs");
        assert_eq!(Ingredient::new("Salt").to_string(), "Salt");
    }

    #[test]
    fn test_cooking_time_display() {
        assert_eq!(CookingTime::new(0, 45).to_string(), "45 minutes");
        assert_eq!(CookingTime::new(1, 0).to_string(), "1 hour");
        assert_eq!(CookingTime::new(2, 0).to_string(), "2 hours");
        assert_eq!(CookingTime::new(1, 30).to_string(), "1 hour 30 minutes");
        assert_eq!(CookingTime::new(3, 5).to_string(), "3 hours 5 minutes");
    }

    #[test]
    fn test_recipe_deserializes_sparse_json() {
        let json = r#"{"id": "42", "title": "Toast", "ingredients": null}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();

        assert_eq!(recipe.id, "42");
        assert_eq!(recipe.title, "Toast");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.categories.is_empty());
        assert_eq!(recipe.servings, DEFAULT_SERVINGS);
        assert_eq!(recipe.cooking_time, CookingTime::default());

        let json = r#"{"title": "Porridge", "servings": null, "cookingTime": null, "dateCreated": null}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();

        assert_eq!(recipe.id, "");
        assert_eq!(recipe.title, "Porridge");
        assert_eq!(recipe.servings, DEFAULT_SERVINGS);
        assert_eq!(recipe.cooking_time, CookingTime::default());
    }

    #[test]
    fn test_recipe_uses_camel_case_keys() {
        let recipe = Recipe::new("1", "Soup").with_cooking_time(CookingTime::new(0, 20));
        let json = serde_json::to_value(&recipe).unwrap();

        assert!(json.get("cookingTime").is_some());
        assert!(json.get("dateCreated").is_some());
        assert_eq!(json["cookingTime"]["minutes"], 20);
    }

    #[test]
    fn test_ingredient_missing_fields_are_empty() {
        let ingredient: Ingredient = serde_json::from_str(r#"{"name": "Basil"}"#).unwrap();
        assert_eq!(ingredient.quantity, "");
        assert_eq!(ingredient.unit, "");
    }

    #[test]
    fn test_numeric_id_is_read_as_text() {
        let recipe: Recipe = serde_json::from_str(r#"{"id": 1710000000000, "title": "Tea"}"#).unwrap();
        assert_eq!(recipe.id, "1710000000000");
    }

    #[test]
    fn test_baseline_servings_never_zero() {
        assert_eq!(Recipe::new("1", "Stew").with_servings(0).baseline_servings(), 1);
        assert_eq!(Recipe::new("1", "Stew").with_servings(6).baseline_servings(), 6);
    }

    #[test]
    fn test_has_category_ignores_case() {
        let recipe = Recipe::new("1", "Carbonara").with_category("Pasta");
        assert!(recipe.has_category("pasta"));
        assert!(recipe.has_category("PASTA"));
        assert!(!recipe.has_category("Rice"));
    }
}
