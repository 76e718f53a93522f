//! Command-line interface for the cookbook
//!
//! This module is split into several submodules:
//! - `recipe_commands`: create, edit, browse and delete recipes
//! - `plan_commands`: assign recipes to calendar slots
//! - `basket_commands`: build and edit the shopping basket
//! - `sync_commands`: back up to and restore from a gist
//! - `ui_builder`: formats lists and localized messages for the terminal
//!
//! Every command loads the data file, works on it in memory and saves it
//! back when something changed.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::AppConfig;
use crate::localization::{detect_language, LocalizationManager};
use crate::meal_plan::MealType;
use crate::store::{CookbookData, FileStore};

pub mod basket_commands;
pub mod plan_commands;
pub mod recipe_commands;
pub mod sync_commands;
pub mod ui_builder;

pub use ui_builder::localized_error;

/// cookbook - recipes, meal planning and shopping lists
#[derive(Debug, Parser)]
#[command(name = "cookbook", version)]
#[command(about = "Recipe book with meal planning and a shopping basket", long_about = None)]
pub struct Cli {
    /// Data file (overrides COOKBOOK_DATA_FILE)
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Message language, "en" or "fr" (overrides COOKBOOK_LANGUAGE)
    #[arg(long, global = true)]
    pub language: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage recipes
    #[command(subcommand)]
    Recipe(RecipeCommand),
    /// Plan meals on the calendar
    #[command(subcommand)]
    Plan(PlanCommand),
    /// Build and edit the shopping basket
    #[command(subcommand)]
    Basket(BasketCommand),
    /// Show a recipe's ingredients for another number of servings
    Scale {
        recipe_id: String,
        servings: u32,
    },
    /// Upload the cookbook to the configured gist
    Backup,
    /// Replace the local cookbook with the gist backup
    Restore,
}

/// Fields shared by `recipe add` and `recipe edit`
#[derive(Debug, Clone, Default, Args)]
pub struct RecipeFields {
    #[arg(long)]
    pub title: Option<String>,
    /// Ingredient as "name|quantity|unit"; repeat for each ingredient
    #[arg(long = "ingredient")]
    pub ingredients: Vec<String>,
    /// Preparation step; repeat for each step
    #[arg(long = "step")]
    pub steps: Vec<String>,
    /// Comma-separated categories
    #[arg(long)]
    pub categories: Option<String>,
    #[arg(long)]
    pub servings: Option<u32>,
    #[arg(long)]
    pub hours: Option<u32>,
    #[arg(long)]
    pub minutes: Option<u32>,
    #[arg(long)]
    pub comments: Option<String>,
    /// Image file to attach; repeat for each image
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum RecipeCommand {
    /// Add a recipe
    Add(RecipeFields),
    /// Change a recipe; omitted fields keep their value
    Edit {
        id: String,
        #[command(flatten)]
        fields: RecipeFields,
    },
    /// List recipes, optionally filtered by category
    List {
        #[arg(long, default_value = "all")]
        category: String,
    },
    /// Show one recipe
    Show {
        id: String,
        /// Rescale ingredients for this many servings
        #[arg(long)]
        servings: Option<u32>,
    },
    /// Delete a recipe
    Delete { id: String },
    /// Show popular categories and every category filter
    Categories,
}

#[derive(Debug, Subcommand)]
pub enum PlanCommand {
    /// Plan a recipe for a meal
    Set {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        meal: MealType,
        recipe_id: String,
    },
    /// Clear a meal
    Remove {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        meal: MealType,
    },
    /// Show the two-week calendar around a date (today by default)
    Show {
        #[arg(long)]
        from: Option<NaiveDate>,
    },
    /// Forget planned meals before a date
    Prune {
        #[arg(long)]
        before: NaiveDate,
    },
}

#[derive(Debug, Subcommand)]
pub enum BasketCommand {
    /// Rebuild the basket from the meals planned between two dates
    Build {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Show the basket
    Show,
    /// Add an item by hand
    Add {
        name: String,
        #[arg(long, default_value = "")]
        quantity: String,
        #[arg(long, default_value = "")]
        unit: String,
    },
    /// Change the quantity of an item
    Edit { id: String, quantity: String },
    /// Remove an item
    Delete { id: String },
    /// Empty the basket
    Clear,
}

/// State shared by every command: configuration, data and messages
pub struct Session<'a> {
    pub config: AppConfig,
    pub store: FileStore,
    pub data: CookbookData,
    pub language: &'static str,
    pub messages: &'a LocalizationManager,
}

impl<'a> Session<'a> {
    /// Load the data file named by the configuration
    pub fn open(config: AppConfig, messages: &'a LocalizationManager) -> Result<Self> {
        let store = FileStore::new(config.data_file.clone());
        let data = store.load()?;
        let language = detect_language(Some(config.language.as_str()));
        Ok(Self {
            config,
            store,
            data,
            language,
            messages,
        })
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.data)
    }

    /// Localized message with string arguments
    pub fn t(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.messages.message_with_args(key, self.language, args)
    }

    /// Localized message with a plural `$count`
    pub fn t_count(&self, key: &str, count: usize, args: &[(&str, &str)]) -> String {
        self.messages.message_with_count(key, self.language, count, args)
    }
}

/// Run a parsed command and return the text to print
pub async fn run(command: Command, session: &mut Session<'_>) -> Result<String> {
    debug!(?command, "Running command");
    match command {
        Command::Recipe(command) => recipe_commands::run(command, session),
        Command::Plan(command) => plan_commands::run(command, session),
        Command::Basket(command) => basket_commands::run(command, session),
        Command::Scale { recipe_id, servings } => {
            recipe_commands::show(session, &recipe_id, Some(servings))
        }
        Command::Backup => sync_commands::backup(session).await,
        Command::Restore => sync_commands::restore(session).await,
    }
}
