//! # Shopping Basket Module
//!
//! Builds the shopping list ("basket") from the meal plan and keeps the
//! items the user adds by hand.
//!
//! ## Aggregation
//!
//! [`build_basket`] walks every day of a [`BasketPeriod`] and every meal of
//! each day in serving order. Each planned recipe contributes its
//! ingredients; ingredients sharing a case-insensitive `(name, unit)` pair
//! are merged by summing their quantities through the quantity engine, and
//! every merged item remembers which meals it came from.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use cookbook::basket::{build_basket, BasketPeriod};
//! use cookbook::meal_plan::{MealPlan, MealType};
//! use cookbook::recipe_model::{Ingredient, Recipe};
//!
//! let bread = Recipe::new("1", "Bread")
//!     .with_ingredient(Ingredient::new("Flour").with_quantity("1").with_unit("cup"));
//! let cake = Recipe::new("2", "Cake")
//!     .with_ingredient(Ingredient::new("flour").with_quantity("1/2").with_unit("Cup"));
//!
//! let monday = NaiveDate::from_ymd_opt(2024, 3, 18).unwrap();
//! let mut plan = MealPlan::new();
//! plan.assign(monday, MealType::Breakfast, &bread);
//! plan.assign(monday, MealType::Dinner, &cake);
//!
//! let period = BasketPeriod::new(monday, monday)?;
//! let items = build_basket(&plan, &[bread, cake], &period);
//!
//! assert_eq!(items.len(), 1);
//! assert_eq!(items[0].quantity, "1 1/2");
//! assert_eq!(items[0].sources.len(), 2);
//! # Ok::<(), cookbook::error::CookbookError>(())
//! ```

use chrono::{NaiveDate, Utc};
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{CookbookError, Result};
use crate::meal_plan::{MealPlan, MealPlanEntry, MealType};
use crate::quantity::add_quantities;
use crate::recipe_model::{null_as_default, string_or_number, Ingredient, Recipe};

/// Provenance recorded for items the user typed in
pub const MANUAL_SOURCE: &str = "Added manually";

/// Quantity given to manual items left blank
pub const DEFAULT_MANUAL_QUANTITY: &str = "1";

/// Date format used inside provenance strings ("Mon 18 Mar")
const PROVENANCE_DATE_FORMAT: &str = "%a %-d %b";

/// One line of the shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketItem {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: String,
    /// Why this item is on the list, e.g. "Pancakes (Mon 18 Mar Breakfast)"
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<String>,
}

/// Inclusive date range the basket was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// What happens to hand-added items when the basket is rebuilt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// The rebuilt basket replaces everything, manual items included
    #[default]
    Replace,
    /// Manual items survive and are listed after the rebuilt items
    KeepManual,
}

/// The shopping list together with the period it was built for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    #[serde(rename = "cookbook-basket", default)]
    pub items: Vec<BasketItem>,
    #[serde(rename = "cookbook-basket-period", default)]
    pub period: Option<BasketPeriod>,
}

/// Case-insensitive `(name, unit)` pair that identifies mergeable ingredients
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AggregationKey {
    name: String,
    unit: String,
}

impl AggregationKey {
    fn of(ingredient: &Ingredient) -> Self {
        Self {
            name: ingredient.name.to_lowercase(),
            unit: ingredient.unit.to_lowercase(),
        }
    }
}

/// Generates basket item ids: creation time, a sequence number and a random suffix
struct ItemIds {
    millis: i64,
    next: usize,
}

impl ItemIds {
    fn new() -> Self {
        Self {
            millis: Utc::now().timestamp_millis(),
            next: 0,
        }
    }

    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("{}-{}-{:06x}", self.millis, self.next, rand::random::<u32>() & 0xff_ffff)
    }
}

impl BasketItem {
    fn from_ingredient(id: String, ingredient: &Ingredient, source: String) -> Self {
        Self {
            id,
            name: ingredient.name.clone(),
            quantity: ingredient.quantity.clone(),
            unit: ingredient.unit.clone(),
            sources: vec![source],
        }
    }

    /// True for items added by hand rather than derived from the meal plan
    pub fn is_manual(&self) -> bool {
        self.sources.len() == 1 && self.sources[0] == MANUAL_SOURCE
    }

    fn add_source(&mut self, source: &str) {
        if !self.sources.iter().any(|s| s == source) {
            self.sources.push(source.to_string());
        }
    }
}

impl BasketPeriod {
    /// Create a period, rejecting one that ends before it starts
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(CookbookError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create a period from picker values that may not have been filled in
    pub fn from_optional(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => Err(CookbookError::MissingPeriod),
        }
    }

    /// Every day of the period, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

/// Provenance line for one planned meal
fn provenance(recipe: &Recipe, entry: &MealPlanEntry, date: NaiveDate, meal: MealType) -> String {
    let title = if recipe.title.trim().is_empty() {
        entry.recipe_name.as_str()
    } else {
        recipe.title.as_str()
    };
    format!("{} ({} {})", title, date.format(PROVENANCE_DATE_FORMAT), meal.label())
}

/// Aggregate the ingredients of every meal planned within `period`.
///
/// Items come out in the order their ingredient was first met while walking
/// the period day by day and meal by meal. The first occurrence decides the
/// displayed name and unit casing. Planned meals whose recipe no longer
/// exists are skipped, as are ingredients without a name.
pub fn build_basket(meal_plan: &MealPlan, recipes: &[Recipe], period: &BasketPeriod) -> Vec<BasketItem> {
    let recipes_by_id: HashMap<&str, &Recipe> =
        recipes.iter().map(|recipe| (recipe.id.as_str(), recipe)).collect();

    let mut ids = ItemIds::new();
    let mut positions: HashMap<AggregationKey, usize> = HashMap::new();
    let mut items: Vec<BasketItem> = Vec::new();

    for date in period.days() {
        for meal in MealType::ALL {
            let Some(entry) = meal_plan.get(date, meal) else {
                continue;
            };
            let Some(recipe) = recipes_by_id.get(entry.recipe_id.as_str()) else {
                debug!(
                    "Skipping {} {}: recipe {} no longer exists",
                    date, meal, entry.recipe_id
                );
                continue;
            };

            let source = provenance(recipe, entry, date, meal);
            trace!("Collecting {} ingredients from {}", recipe.ingredients.len(), source);

            for ingredient in recipe.ingredients.iter().filter(|i| i.has_name()) {
                let key = AggregationKey::of(ingredient);
                match positions.get(&key) {
                    Some(&position) => {
                        let item = &mut items[position];
                        item.quantity = add_quantities(&item.quantity, &ingredient.quantity);
                        item.add_source(&source);
                    }
                    None => {
                        positions.insert(key, items.len());
                        items.push(BasketItem::from_ingredient(
                            ids.next_id(),
                            ingredient,
                            source.clone(),
                        ));
                    }
                }
            }
        }
    }

    info!(
        "Built basket with {} items for {} to {}",
        items.len(),
        period.start,
        period.end
    );
    items
}

impl Basket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the basket from the meal plan for `period`.
    ///
    /// Returns the number of items derived from the meal plan.
    pub fn refresh(
        &mut self,
        meal_plan: &MealPlan,
        recipes: &[Recipe],
        period: BasketPeriod,
        policy: RefreshPolicy,
    ) -> usize {
        let mut items = build_basket(meal_plan, recipes, &period);
        let derived = items.len();

        if policy == RefreshPolicy::KeepManual {
            let manual: Vec<BasketItem> = self.items.drain(..).filter(BasketItem::is_manual).collect();
            debug!("Keeping {} manual items across refresh", manual.len());
            items.extend(manual);
        }

        self.items = items;
        self.period = Some(period);
        derived
    }

    /// Append an item typed in by the user
    pub fn add_manual(&mut self, name: &str, quantity: &str, unit: &str) -> Result<&BasketItem> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CookbookError::EmptyIngredientName);
        }
        let quantity = match quantity.trim() {
            "" => DEFAULT_MANUAL_QUANTITY,
            q => q,
        };

        let item = BasketItem {
            id: ItemIds::new().next_id(),
            name: name.to_string(),
            quantity: quantity.to_string(),
            unit: unit.trim().to_string(),
            sources: vec![MANUAL_SOURCE.to_string()],
        };
        debug!("Adding manual basket item {} ({})", item.name, item.id);
        self.items.push(item);
        Ok(&self.items[self.items.len() - 1])
    }

    /// Replace the quantity text of an item. Returns false when the id is unknown.
    pub fn edit_quantity(&mut self, id: &str, quantity: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.quantity = quantity.trim().to_string();
                true
            }
            None => false,
        }
    }

    /// Remove an item. Returns false when the id is unknown.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&BasketItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Empty the basket and forget its period
    pub fn clear(&mut self) {
        self.items.clear();
        self.period = None;
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
