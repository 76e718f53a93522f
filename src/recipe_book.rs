//! # Recipe Book Module
//!
//! Create, edit, delete and browse recipes. Recipes are kept in insertion
//! order; ids are the creation time in milliseconds, bumped when two
//! recipes are created within the same millisecond.
//!
//! Browsing follows the home page of the cookbook: the most used
//! categories (or a default set for an empty book), a sorted list of every
//! category for filtering, and case-insensitive filtering by category.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{CookbookError, Result};
use crate::quantity::scale_ingredients;
use crate::recipe_model::{CookingTime, Ingredient, Recipe, DEFAULT_SERVINGS};

/// Categories suggested while the book is empty
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Pasta",
    "Rice",
    "Potatoes",
    "High-Protein",
    "Quick Meals",
    "Desserts",
];

/// Number of categories shown on the home page
pub const TOP_CATEGORY_LIMIT: usize = 6;

/// Longest accepted recipe title, in bytes
pub const MAX_TITLE_LENGTH: usize = 255;

/// Images kept per recipe
pub const MAX_IMAGES: usize = 5;

/// Filter value that matches every recipe
pub const ALL_CATEGORIES: &str = "all";

/// User input for creating or editing a recipe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeDraft {
    pub title: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    /// Comma-separated categories, as typed
    pub categories: String,
    pub cooking_time: CookingTime,
    pub servings: u32,
    pub comments: String,
    pub images: Vec<String>,
}

/// A category with the number of recipes using it; suggestions have no count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: Option<usize>,
}

/// All recipes of the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

/// Validate a recipe title, returning it trimmed
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err(CookbookError::InvalidTitle("empty"));
    }

    if trimmed.len() > MAX_TITLE_LENGTH {
        return Err(CookbookError::InvalidTitle("too long"));
    }

    Ok(trimmed.to_string())
}

/// Split "Pasta, Quick Meals,," into ["Pasta", "Quick Meals"]
pub fn split_categories(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|category| !category.is_empty())
        .map(str::to_string)
        .collect()
}

/// "1 hour 30 minutes", "45 minutes", "2 hours"
pub fn format_cooking_time(time: &CookingTime) -> String {
    time.to_string()
}

impl RecipeDraft {
    /// Start an edit from the stored recipe
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.clone(),
            steps: recipe.steps.clone(),
            categories: recipe.categories.join(", "),
            cooking_time: recipe.cooking_time,
            servings: recipe.servings,
            comments: recipe.comments.clone(),
            images: recipe.images.clone(),
        }
    }

    /// Turn the draft into a recipe, dropping blank ingredients and steps
    fn into_recipe(self, id: String, date_created: DateTime<Utc>) -> Result<Recipe> {
        let title = validate_title(&self.title)?;

        let ingredients: Vec<Ingredient> = self
            .ingredients
            .iter()
            .filter(|ingredient| ingredient.has_name())
            .map(Ingredient::trimmed)
            .collect();

        let steps: Vec<String> = self
            .steps
            .iter()
            .map(|step| step.trim())
            .filter(|step| !step.is_empty())
            .map(str::to_string)
            .collect();

        let mut images = self.images;
        images.truncate(MAX_IMAGES);

        Ok(Recipe {
            id,
            title,
            servings: self.servings.max(DEFAULT_SERVINGS),
            ingredients,
            steps,
            categories: split_categories(&self.categories),
            cooking_time: self.cooking_time,
            comments: self.comments.trim().to_string(),
            images,
            date_created,
        })
    }
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    /// Save a new recipe
    pub fn add(&mut self, draft: RecipeDraft) -> Result<&Recipe> {
        self.add_at(draft, Utc::now())
    }

    /// Save a new recipe as if created at `now`
    pub fn add_at(&mut self, draft: RecipeDraft, now: DateTime<Utc>) -> Result<&Recipe> {
        let id = self.next_id(now.timestamp_millis());
        let recipe = draft.into_recipe(id, now)?;
        info!(
            "Adding recipe '{}' ({}) with {} ingredients",
            recipe.title,
            recipe.id,
            recipe.ingredients.len()
        );
        self.recipes.push(recipe);
        Ok(&self.recipes[self.recipes.len() - 1])
    }

    /// Replace the content of a recipe, keeping its id and creation date
    pub fn update(&mut self, id: &str, draft: RecipeDraft) -> Result<&Recipe> {
        let position = self
            .recipes
            .iter()
            .position(|recipe| recipe.id == id)
            .ok_or_else(|| CookbookError::RecipeNotFound(id.to_string()))?;

        let date_created = self.recipes[position].date_created;
        let recipe = draft.into_recipe(id.to_string(), date_created)?;
        info!("Updating recipe '{}' ({})", recipe.title, recipe.id);
        self.recipes[position] = recipe;
        Ok(&self.recipes[position])
    }

    /// Delete a recipe. Planned meals pointing at it are left in place.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.recipes.len();
        self.recipes.retain(|recipe| recipe.id != id);
        let deleted = self.recipes.len() != before;
        if deleted {
            info!("Deleted recipe {}", id);
        }
        deleted
    }

    /// Most used categories, most popular first. Ties keep first-seen order.
    /// An empty book suggests [`DEFAULT_CATEGORIES`] without counts.
    pub fn top_categories(&self, limit: usize) -> Vec<CategoryCount> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for category in self.recipes.iter().flat_map(|recipe| recipe.categories.iter()) {
            match counts.iter_mut().find(|(name, _)| name == category) {
                Some((_, count)) => *count += 1,
                None => counts.push((category.clone(), 1)),
            }
        }

        if counts.is_empty() {
            return DEFAULT_CATEGORIES
                .iter()
                .take(limit)
                .map(|name| CategoryCount {
                    name: name.to_string(),
                    count: None,
                })
                .collect();
        }

        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .take(limit)
            .map(|(name, count)| CategoryCount {
                name,
                count: Some(count),
            })
            .collect()
    }

    /// Every category in use, sorted and without duplicates
    pub fn category_filters(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .recipes
            .iter()
            .flat_map(|recipe| recipe.categories.iter().cloned())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Recipes in a category (case-insensitive); "all" returns every recipe
    pub fn filter_by_category(&self, category: &str) -> Vec<&Recipe> {
        if category.eq_ignore_ascii_case(ALL_CATEGORIES) {
            return self.recipes.iter().collect();
        }
        let matches: Vec<&Recipe> = self
            .recipes
            .iter()
            .filter(|recipe| recipe.has_category(category))
            .collect();
        debug!("Category '{}' matches {} recipes", category, matches.len());
        matches
    }

    /// Ingredients of a recipe rescaled for `servings`
    pub fn scaled_ingredients(&self, id: &str, servings: u32) -> Result<Vec<Ingredient>> {
        let recipe = self
            .get(id)
            .ok_or_else(|| CookbookError::RecipeNotFound(id.to_string()))?;
        scale_ingredients(&recipe.ingredients, recipe.baseline_servings(), servings)
    }

    fn next_id(&self, millis: i64) -> String {
        let mut candidate = millis;
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft(title: &str, categories: &str) -> RecipeDraft {
        RecipeDraft {
            title: title.to_string(),
            categories: categories.to_string(),
            servings: 2,
            ..Default::default()
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_title_validation() {
        assert!(validate_title("Chocolate Chip Cookies").is_ok());
        assert_eq!(validate_title("  Mom's Lasagna  ").unwrap(), "Mom's Lasagna");
        assert_eq!(validate_title("   "), Err(CookbookError::InvalidTitle("empty")));
        assert_eq!(
            validate_title(&"a".repeat(256)),
            Err(CookbookError::InvalidTitle("too long"))
        );
    }

    #[test]
    fn test_split_categories() {
        assert_eq!(split_categories("Pasta, Quick Meals,, "), vec!["Pasta", "Quick Meals"]);
        assert!(split_categories("").is_empty());
    }

    #[test]
    fn test_add_cleans_up_draft() {
        let mut book = RecipeBook::new();
        let recipe = book
            .add_at(
                RecipeDraft {
                    title: " Omelette ".to_string(),
                    ingredients: vec![
                        Ingredient::new(" Eggs ").with_quantity(" 3 "),
                        Ingredient::new("  ").with_quantity("1"),
                    ],
                    steps: vec!["Whisk".to_string(), "   ".to_string(), " Cook ".to_string()],
                    categories: "Breakfast, Quick Meals".to_string(),
                    servings: 0,
                    images: (0..8).map(|i| format!("data:image/png;base64,{i}")).collect(),
                    ..Default::default()
                },
                noon(),
            )
            .unwrap();

        assert_eq!(recipe.id, noon().timestamp_millis().to_string());
        assert_eq!(recipe.title, "Omelette");
        assert_eq!(recipe.ingredients, vec![Ingredient::new("Eggs").with_quantity("3")]);
        assert_eq!(recipe.steps, vec!["Whisk", "Cook"]);
        assert_eq!(recipe.categories, vec!["Breakfast", "Quick Meals"]);
        assert_eq!(recipe.servings, 1);
        assert_eq!(recipe.images.len(), MAX_IMAGES);
    }

    #[test]
    fn test_ids_are_unique_within_a_millisecond() {
        let mut book = RecipeBook::new();
        let first = book.add_at(draft("A", ""), noon()).unwrap().id.clone();
        let second = book.add_at(draft("B", ""), noon()).unwrap().id.clone();
        assert_ne!(first, second);
    }

    #[test]
    fn test_add_rejects_empty_title() {
        let mut book = RecipeBook::new();
        assert!(book.add(draft("  ", "Pasta")).is_err());
        assert!(book.is_empty());
    }

    #[test]
    fn test_update_keeps_identity() {
        let mut book = RecipeBook::new();
        let id = book.add_at(draft("Soup", "Starters"), noon()).unwrap().id.clone();

        let mut edit = RecipeDraft::from_recipe(book.get(&id).unwrap());
        edit.title = "Tomato Soup".to_string();
        let updated = book.update(&id, edit).unwrap();

        assert_eq!(updated.id, id);
        assert_eq!(updated.title, "Tomato Soup");
        assert_eq!(updated.date_created, noon());
        assert_eq!(updated.categories, vec!["Starters"]);

        assert_eq!(
            book.update("missing", draft("X", "")).unwrap_err(),
            CookbookError::RecipeNotFound("missing".to_string())
        );
    }

    #[test]
    fn test_delete() {
        let mut book = RecipeBook::new();
        let id = book.add(draft("Soup", "")).unwrap().id.clone();
        assert!(book.delete(&id));
        assert!(!book.delete(&id));
    }

    #[test]
    fn test_top_categories_ranked_by_count() {
        let mut book = RecipeBook::new();
        book.add(draft("Carbonara", "Pasta, Quick Meals")).unwrap();
        book.add(draft("Risotto", "Rice")).unwrap();
        book.add(draft("Pesto", "Pasta")).unwrap();

        let top = book.top_categories(TOP_CATEGORY_LIMIT);
        assert_eq!(
            top[0],
            CategoryCount {
                name: "Pasta".to_string(),
                count: Some(2)
            }
        );
        assert_eq!(top[1].name, "Quick Meals");
        assert_eq!(top[2].name, "Rice");

        assert_eq!(book.top_categories(1).len(), 1);
    }

    #[test]
    fn test_top_categories_defaults_for_empty_book() {
        let top = RecipeBook::new().top_categories(TOP_CATEGORY_LIMIT);
        let names: Vec<&str> = top.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, DEFAULT_CATEGORIES.to_vec());
        assert!(top.iter().all(|c| c.count.is_none()));
    }

    #[test]
    fn test_category_filters_sorted_unique() {
        let mut book = RecipeBook::new();
        book.add(draft("A", "Rice, Pasta")).unwrap();
        book.add(draft("B", "Pasta")).unwrap();
        assert_eq!(book.category_filters(), vec!["Pasta", "Rice"]);
    }

    #[test]
    fn test_filter_by_category() {
        let mut book = RecipeBook::new();
        book.add(draft("Carbonara", "Pasta")).unwrap();
        book.add(draft("Risotto", "Rice")).unwrap();

        assert_eq!(book.filter_by_category("all").len(), 2);
        let pasta = book.filter_by_category("pasta");
        assert_eq!(pasta.len(), 1);
        assert_eq!(pasta[0].title, "Carbonara");
        assert!(book.filter_by_category("Desserts").is_empty());
    }

    #[test]
    fn test_scaled_ingredients() {
        let mut book = RecipeBook::new();
        let id = book
            .add(RecipeDraft {
                title: "Bread".to_string(),
                ingredients: vec![Ingredient::new("Flour").with_quantity("1").with_unit("cup")],
                servings: 4,
                ..Default::default()
            })
            .unwrap()
            .id
            .clone();

        let scaled = book.scaled_ingredients(&id, 8).unwrap();
        assert_eq!(scaled[0].quantity, "2");
        assert!(book.scaled_ingredients(&id, 0).is_err());
        assert!(book.scaled_ingredients("missing", 2).is_err());
    }

    #[test]
    fn test_format_cooking_time() {
        assert_eq!(format_cooking_time(&CookingTime::new(1, 15)), "1 hour 15 minutes");
    }
}
