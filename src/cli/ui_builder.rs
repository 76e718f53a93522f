//! UI Builder module for formatting terminal output

use chrono::NaiveDate;

use crate::basket::{Basket, BasketItem};
use crate::error::CookbookError;
use crate::localization::LocalizationManager;
use crate::meal_plan::{MealPlan, MealType};
use crate::recipe_book::{format_cooking_time, CategoryCount};
use crate::recipe_model::{Ingredient, Recipe};

/// Date format of the calendar rows ("Mon 18 Mar")
const CALENDAR_DATE_FORMAT: &str = "%a %-d %b";

/// Format ingredients as a simple numbered list
pub fn format_ingredients_list(ingredients: &[Ingredient]) -> String {
    let mut result = String::new();

    for (i, ingredient) in ingredients.iter().enumerate() {
        result.push_str(&format!("{}. {}\n", i + 1, ingredient));
    }

    result
}

/// One line per recipe: id, title and categories
pub fn format_recipe_list(recipes: &[&Recipe]) -> String {
    let mut result = String::new();

    for recipe in recipes {
        result.push_str(&format!("{}  {}", recipe.id, recipe.title));
        if !recipe.categories.is_empty() {
            result.push_str(&format!("  [{}]", recipe.categories.join(", ")));
        }
        result.push('\n');
    }

    result
}

/// Full view of a recipe; `ingredients` may be rescaled copies
pub fn format_recipe_detail(
    recipe: &Recipe,
    ingredients: &[Ingredient],
    servings: u32,
    messages: &LocalizationManager,
    language: &str,
) -> String {
    let mut result = format!("{}\n", recipe.title);

    let mut summary = vec![messages.message_with_count("recipe-servings", language, servings as usize, &[])];
    if recipe.cooking_time.hours > 0 || recipe.cooking_time.minutes > 0 {
        summary.push(format_cooking_time(&recipe.cooking_time));
    }
    if !recipe.categories.is_empty() {
        summary.push(recipe.categories.join(", "));
    }
    result.push_str(&summary.join(" · "));
    result.push('\n');

    if !ingredients.is_empty() {
        result.push_str(&format!(
            "\n{}\n",
            messages.get_message_in_language("recipe-ingredients", language, None)
        ));
        result.push_str(&format_ingredients_list(ingredients));
    }

    if !recipe.steps.is_empty() {
        result.push_str(&format!(
            "\n{}\n",
            messages.get_message_in_language("recipe-steps", language, None)
        ));
        for (i, step) in recipe.steps.iter().enumerate() {
            result.push_str(&format!("{}. {}\n", i + 1, step));
        }
    }

    if !recipe.comments.is_empty() {
        result.push_str(&format!(
            "\n{}\n{}\n",
            messages.get_message_in_language("recipe-comments", language, None),
            recipe.comments
        ));
    }

    if !recipe.images.is_empty() {
        result.push_str(&format!(
            "\n{}\n",
            messages.message_with_count("recipe-images", language, recipe.images.len(), &[])
        ));
    }

    result
}

/// Category grid: name and recipe count when known
pub fn format_categories(categories: &[CategoryCount]) -> String {
    let mut result = String::new();

    for category in categories {
        match category.count {
            Some(count) => result.push_str(&format!("- {} ({})\n", category.name, count)),
            None => result.push_str(&format!("- {}\n", category.name)),
        }
    }

    result
}

fn format_basket_item(item: &BasketItem) -> String {
    let amount: Vec<&str> = [item.quantity.as_str(), item.unit.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();

    let mut line = if amount.is_empty() {
        format!("[{}] {}", item.id, item.name)
    } else {
        format!("[{}] {} ({})", item.id, item.name, amount.join(" "))
    };
    if !item.sources.is_empty() {
        line.push_str(&format!("\n      {}", item.sources.join("; ")));
    }
    line
}

/// Basket header with its period, then one entry per item
pub fn format_basket(basket: &Basket, messages: &LocalizationManager, language: &str) -> String {
    if basket.is_empty() {
        return messages.get_message_in_language("basket-empty", language, None);
    }

    let mut result = String::new();
    if let Some(period) = basket.period {
        result.push_str(&messages.message_with_args(
            "basket-period",
            language,
            &[
                ("start", &period.start.to_string()),
                ("end", &period.end.to_string()),
            ],
        ));
        result.push('\n');
    }

    for item in &basket.items {
        result.push_str(&format_basket_item(item));
        result.push('\n');
    }

    result
}

/// One row per day, one column per meal; empty meals show a dash
pub fn format_meal_calendar(plan: &MealPlan, days: &[NaiveDate]) -> String {
    let mut result = String::new();

    for day in days {
        let meals: Vec<String> = MealType::ALL
            .iter()
            .map(|meal| match plan.get(*day, *meal) {
                Some(entry) => format!("{}: {}", meal.label(), entry.recipe_name),
                None => format!("{}: -", meal.label()),
            })
            .collect();
        result.push_str(&format!(
            "{}  {}\n",
            day.format(CALENDAR_DATE_FORMAT),
            meals.join(" | ")
        ));
    }

    result
}

/// Translate an error into a message for the user
pub fn localized_error(error: &anyhow::Error, messages: &LocalizationManager, language: &str) -> String {
    let Some(error) = error.downcast_ref::<CookbookError>() else {
        return messages.message_with_args("error-generic", language, &[("message", &format!("{:#}", error))]);
    };

    match error {
        CookbookError::InvalidPeriod { start, end } => messages.message_with_args(
            "error-invalid-period",
            language,
            &[("start", &start.to_string()), ("end", &end.to_string())],
        ),
        CookbookError::MissingPeriod => {
            messages.get_message_in_language("error-missing-period", language, None)
        }
        CookbookError::InvalidServings(_) => {
            messages.get_message_in_language("error-invalid-servings", language, None)
        }
        CookbookError::InvalidTitle(reason) => {
            messages.message_with_args("error-invalid-title", language, &[("reason", *reason)])
        }
        CookbookError::EmptyIngredientName => {
            messages.get_message_in_language("error-empty-name", language, None)
        }
        CookbookError::RecipeNotFound(id) => {
            messages.message_with_args("recipe-not-found", language, &[("id", id)])
        }
        CookbookError::BasketItemNotFound(id) => {
            messages.message_with_args("basket-item-not-found", language, &[("id", id)])
        }
        CookbookError::InvalidMealType(meal) => {
            messages.message_with_args("error-invalid-meal", language, &[("meal", meal)])
        }
        CookbookError::InvalidMealPlanKey(_) => messages.message_with_args(
            "error-generic",
            language,
            &[("message", &error.to_string())],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe_model::CookingTime;

    fn messages() -> LocalizationManager {
        LocalizationManager::new().unwrap()
    }

    #[test]
    fn test_ingredients_list_is_numbered() {
        let list = format_ingredients_list(&[
            Ingredient::new("Flour").with_quantity("2").with_unit("cups"),
            Ingredient::new("Salt"),
        ]);
        assert_eq!(list, "1. 2 cups Flour\n2. Salt\n");
    }

    #[test]
    fn test_recipe_detail() {
        let recipe = Recipe::new("1", "Pancakes")
            .with_servings(2)
            .with_ingredient(Ingredient::new("Eggs").with_quantity("2"))
            .with_step("Whisk")
            .with_category("Breakfast")
            .with_cooking_time(CookingTime::new(0, 20));

        let text = format_recipe_detail(&recipe, &recipe.ingredients, 2, &messages(), "en");
        assert!(text.starts_with("Pancakes\n"));
        assert!(text.contains("Serves 2"));
        assert!(text.contains("20 minutes"));
        assert!(text.contains("1. 2 Eggs"));
        assert!(text.contains("1. Whisk"));
    }

    #[test]
    fn test_empty_basket_message() {
        assert_eq!(format_basket(&Basket::new(), &messages(), "en"), "Your basket is empty");
    }

    #[test]
    fn test_basket_item_line() {
        let mut basket = Basket::new();
        basket.add_manual("Milk", "2", "l").unwrap();
        let id = basket.items[0].id.clone();

        let text = format_basket(&basket, &messages(), "en");
        assert!(text.contains(&format!("[{}] Milk (2 l)", id)));
        assert!(text.contains("Added manually"));
    }

    #[test]
    fn test_calendar_rows() {
        let monday = NaiveDate::from_ymd_opt(2024, 3, 18).unwrap();
        let mut plan = MealPlan::new();
        plan.assign(monday, MealType::Dinner, &Recipe::new("1", "Soup"));

        let text = format_meal_calendar(&plan, &[monday]);
        assert_eq!(text, "Mon 18 Mar  Breakfast: - | Lunch: - | Dinner: Soup\n");
    }

    #[test]
    fn test_domain_errors_are_localized() {
        let error = anyhow::Error::new(CookbookError::MissingPeriod);
        assert_eq!(
            localized_error(&error, &messages(), "en"),
            "Please choose both a start date and an end date"
        );

        let error = anyhow::anyhow!("disk full");
        assert!(localized_error(&error, &messages(), "fr").contains("disk full"));
    }
}
