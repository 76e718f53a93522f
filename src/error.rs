//! # Error Types Module
//!
//! Domain errors raised by the recipe book, meal planner and basket.
//! Quantity parsing never fails and has no error type of its own.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced to the user by cookbook operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CookbookError {
    /// The basket period ends before it starts
    #[error("Invalid period: start date {start} is after end date {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    /// One of the basket period dates was not supplied
    #[error("Both a start date and an end date are required")]
    MissingPeriod,

    /// Scaling was asked to work with zero servings
    #[error("Servings must be at least 1 (got {0})")]
    InvalidServings(u32),

    /// Recipe title failed validation
    #[error("Invalid recipe title: {0}")]
    InvalidTitle(&'static str),

    /// Basket items and ingredients need a name
    #[error("Ingredient name cannot be empty")]
    EmptyIngredientName,

    /// No recipe carries this id
    #[error("Recipe not found: {0}")]
    RecipeNotFound(String),

    /// No basket item carries this id
    #[error("Basket item not found: {0}")]
    BasketItemNotFound(String),

    /// Meal type outside breakfast/lunch/dinner
    #[error("Unknown meal type: {0}")]
    InvalidMealType(String),

    /// A stored meal-plan key could not be decoded
    #[error("Invalid meal plan key: {0}")]
    InvalidMealPlanKey(String),
}

pub type Result<T> = std::result::Result<T, CookbookError>;
