//! # Cookbook
//!
//! A personal recipe book with a meal-planning calendar and a shopping
//! basket built from the planned meals.
//!
//! The core is pure and synchronous:
//! - [`quantity`] parses, formats, adds and scales free-text quantities
//! - [`basket`] aggregates the ingredients of planned meals into a shopping list
//! - [`recipe_book`] and [`meal_plan`] hold the user's recipes and calendar
//!
//! Around it sit the JSON file [`store`], the gist backup in [`remote_sync`],
//! environment [`config`], [`localization`] and the [`cli`].

pub mod basket;
pub mod cli;
pub mod config;
pub mod error;
pub mod localization;
pub mod meal_plan;
pub mod quantity;
pub mod recipe_book;
pub mod recipe_model;
pub mod remote_sync;
pub mod store;
