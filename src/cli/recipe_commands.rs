//! Recipe commands: add, edit, list, show, delete and category browsing

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::ui_builder::{format_categories, format_recipe_detail, format_recipe_list};
use super::{RecipeCommand, RecipeFields, Session};
use crate::error::CookbookError;
use crate::recipe_book::{RecipeDraft, ALL_CATEGORIES, MAX_IMAGES, TOP_CATEGORY_LIMIT};
use crate::recipe_model::{CookingTime, Ingredient};

/// Largest image file attached to a recipe
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

pub fn run(command: RecipeCommand, session: &mut Session<'_>) -> Result<String> {
    match command {
        RecipeCommand::Add(fields) => add(session, fields),
        RecipeCommand::Edit { id, fields } => edit(session, &id, fields),
        RecipeCommand::List { category } => Ok(list(session, &category)),
        RecipeCommand::Show { id, servings } => show(session, &id, servings),
        RecipeCommand::Delete { id } => delete(session, &id),
        RecipeCommand::Categories => Ok(categories(session)),
    }
}

/// Parse "name|quantity|unit"; quantity and unit may be left out
pub fn parse_ingredient_arg(text: &str) -> Ingredient {
    let mut parts = text.splitn(3, '|').map(str::trim);
    let name = parts.next().unwrap_or_default();
    let quantity = parts.next().unwrap_or_default();
    let unit = parts.next().unwrap_or_default();
    Ingredient::new(name).with_quantity(quantity).with_unit(unit)
}

fn image_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "image/jpeg",
    }
}

/// Read an image file into a data URL
pub fn image_data_url(path: &Path) -> Result<String> {
    let size = fs::metadata(path)
        .with_context(|| format!("Cannot access image {}", path.display()))?
        .len();
    if size > MAX_IMAGE_BYTES {
        anyhow::bail!(
            "Image {} is too large ({} bytes, limit {})",
            path.display(),
            size,
            MAX_IMAGE_BYTES
        );
    }

    let bytes = fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(format!("data:{};base64,{}", image_mime_type(path), STANDARD.encode(bytes)))
}

/// Images that cannot be read are skipped so the recipe is still saved
fn load_images(paths: &[std::path::PathBuf]) -> Vec<String> {
    if paths.len() > MAX_IMAGES {
        warn!(given = paths.len(), kept = MAX_IMAGES, "Too many images, keeping the first ones");
    }
    paths
        .iter()
        .take(MAX_IMAGES)
        .filter_map(|path| match image_data_url(path) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, "Skipping image");
                None
            }
        })
        .collect()
}

/// Apply the given fields on top of a draft
fn apply_fields(draft: &mut RecipeDraft, fields: RecipeFields) {
    if let Some(title) = fields.title {
        draft.title = title;
    }
    if !fields.ingredients.is_empty() {
        draft.ingredients = fields.ingredients.iter().map(|i| parse_ingredient_arg(i)).collect();
    }
    if !fields.steps.is_empty() {
        draft.steps = fields.steps;
    }
    if let Some(categories) = fields.categories {
        draft.categories = categories;
    }
    if let Some(servings) = fields.servings {
        draft.servings = servings;
    }
    if fields.hours.is_some() || fields.minutes.is_some() {
        draft.cooking_time = CookingTime::new(
            fields.hours.unwrap_or(draft.cooking_time.hours),
            fields.minutes.unwrap_or(draft.cooking_time.minutes),
        );
    }
    if let Some(comments) = fields.comments {
        draft.comments = comments;
    }
    if !fields.images.is_empty() {
        draft.images = load_images(&fields.images);
    }
}

fn add(session: &mut Session<'_>, fields: RecipeFields) -> Result<String> {
    let mut draft = RecipeDraft::default();
    apply_fields(&mut draft, fields);

    let recipe = session.data.recipes.add(draft)?;
    let (id, title) = (recipe.id.clone(), recipe.title.clone());
    session.save()?;

    Ok(session.t("recipe-saved", &[("title", &title), ("id", &id)]))
}

fn edit(session: &mut Session<'_>, id: &str, fields: RecipeFields) -> Result<String> {
    let current = session
        .data
        .recipes
        .get(id)
        .ok_or_else(|| CookbookError::RecipeNotFound(id.to_string()))?;
    let mut draft = RecipeDraft::from_recipe(current);
    apply_fields(&mut draft, fields);

    let recipe = session.data.recipes.update(id, draft)?.clone();
    let renamed = session.data.meal_plan.rename_recipe(&recipe);
    if renamed > 0 {
        info!(recipe_id = %recipe.id, renamed, "Updated planned meals with the new title");
    }
    session.save()?;

    Ok(session.t("recipe-updated", &[("title", &recipe.title)]))
}

fn list(session: &Session<'_>, category: &str) -> String {
    let recipes = session.data.recipes.filter_by_category(category);
    if recipes.is_empty() && category.eq_ignore_ascii_case(ALL_CATEGORIES) {
        return session.t("recipes-empty", &[]);
    }

    let mut result = format_recipe_list(&recipes);
    result.push_str(&session.t_count("recipes-count", recipes.len(), &[]));
    result
}

/// Show a recipe, rescaled when `servings` is given
pub fn show(session: &Session<'_>, id: &str, servings: Option<u32>) -> Result<String> {
    let recipe = session
        .data
        .recipes
        .get(id)
        .ok_or_else(|| CookbookError::RecipeNotFound(id.to_string()))?;

    match servings {
        Some(servings) => {
            let ingredients = session.data.recipes.scaled_ingredients(id, servings)?;
            let title = session.t(
                "scale-title",
                &[("title", &recipe.title), ("servings", &servings.to_string())],
            );
            let detail = format_recipe_detail(recipe, &ingredients, servings, session.messages, session.language);
            Ok(format!("{}\n\n{}", title, detail))
        }
        None => Ok(format_recipe_detail(
            recipe,
            &recipe.ingredients,
            recipe.baseline_servings(),
            session.messages,
            session.language,
        )),
    }
}

fn delete(session: &mut Session<'_>, id: &str) -> Result<String> {
    if !session.data.recipes.delete(id) {
        return Err(CookbookError::RecipeNotFound(id.to_string()).into());
    }
    session.save()?;
    Ok(session.t("recipe-deleted", &[("id", id)]))
}

fn categories(session: &Session<'_>) -> String {
    let mut result = format!("{}\n", session.t("categories-title", &[]));
    result.push_str(&format_categories(&session.data.recipes.top_categories(TOP_CATEGORY_LIMIT)));

    let filters = session.data.recipes.category_filters();
    if !filters.is_empty() {
        result.push_str(&format!("\n{}\n", session.t("categories-filters", &[])));
        for category in filters {
            result.push_str(&format!("- {}\n", category));
        }
    }
    result
}
