//! # CLI Tests
//!
//! Drives the command handlers against a temporary data file, the way the
//! binary does after parsing its arguments.

use chrono::NaiveDate;
use clap::Parser;
use cookbook::cli::{
    self, BasketCommand, Cli, Command, PlanCommand, RecipeCommand, RecipeFields, Session,
};
use cookbook::config::AppConfig;
use cookbook::error::CookbookError;
use cookbook::localization::LocalizationManager;
use cookbook::meal_plan::MealType;
use cookbook::store::FileStore;
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &TempDir) -> AppConfig {
        AppConfig {
            data_file: dir.path().join("cookbook.json"),
            ..Default::default()
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 18).unwrap()
    }

    async fn run(config: &AppConfig, messages: &LocalizationManager, command: Command) -> anyhow::Result<String> {
        let mut session = Session::open(config.clone(), messages)?;
        cli::run(command, &mut session).await
    }

    async fn add_pancakes(config: &AppConfig, messages: &LocalizationManager) -> String {
        run(
            config,
            messages,
            Command::Recipe(RecipeCommand::Add(RecipeFields {
                title: Some("Pancakes".to_string()),
                ingredients: vec!["Flour|1|cup".to_string(), "Eggs|2".to_string()],
                steps: vec!["Mix".to_string(), "Fry".to_string()],
                categories: Some("Breakfast, Quick Meals".to_string()),
                servings: Some(2),
                ..Default::default()
            })),
        )
        .await
        .unwrap();

        let data = FileStore::new(config.data_file.clone()).load().unwrap();
        data.recipes.all()[0].id.clone()
    }

    #[test]
    fn test_argument_parsing() {
        let cli = Cli::try_parse_from([
            "cookbook",
            "--language",
            "fr",
            "plan",
            "set",
            "--date",
            "2024-03-18",
            "--meal",
            "dinner",
            "123",
        ])
        .unwrap();

        assert_eq!(cli.language.as_deref(), Some("fr"));
        match cli.command {
            Command::Plan(PlanCommand::Set { date, meal, recipe_id }) => {
                assert_eq!(date, monday());
                assert_eq!(meal, MealType::Dinner);
                assert_eq!(recipe_id, "123");
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["cookbook", "plan", "remove", "--date", "2024-03-18", "--meal", "brunch"]).is_err());
    }

    #[tokio::test]
    async fn test_recipe_add_and_list() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let messages = LocalizationManager::new().unwrap();

        let id = add_pancakes(&config, &messages).await;

        let listing = run(&config, &messages, Command::Recipe(RecipeCommand::List { category: "breakfast".to_string() }))
            .await
            .unwrap();
        assert!(listing.contains(&id));
        assert!(listing.contains("Pancakes"));
        assert!(listing.contains("1 recipe"));
    }

    #[tokio::test]
    async fn test_scale_command() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let messages = LocalizationManager::new().unwrap();
        let id = add_pancakes(&config, &messages).await;

        let output = run(&config, &messages, Command::Scale { recipe_id: id, servings: 4 })
            .await
            .unwrap();
        assert!(output.contains("\"Pancakes\" for 4 servings"));
        assert!(output.contains("1. 2 cup Flour"));
        assert!(output.contains("2. 4 Eggs"));
    }

    #[tokio::test]
    async fn test_plan_then_build_basket() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let messages = LocalizationManager::new().unwrap();
        let id = add_pancakes(&config, &messages).await;

        for meal in [MealType::Breakfast, MealType::Dinner] {
            run(
                &config,
                &messages,
                Command::Plan(PlanCommand::Set {
                    date: monday(),
                    meal,
                    recipe_id: id.clone(),
                }),
            )
            .await
            .unwrap();
        }

        let output = run(
            &config,
            &messages,
            Command::Basket(BasketCommand::Build {
                from: Some(monday()),
                to: Some(monday()),
            }),
        )
        .await
        .unwrap();
        assert!(output.contains("Basket built with 2 items"));
        assert!(output.contains("Flour (2 cup)"));
        assert!(output.contains("Pancakes (Mon 18 Mar Breakfast); Pancakes (Mon 18 Mar Dinner)"));
    }

    #[tokio::test]
    async fn test_manual_basket_items() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let messages = LocalizationManager::new().unwrap();

        let added = run(
            &config,
            &messages,
            Command::Basket(BasketCommand::Add {
                name: "Milk".to_string(),
                quantity: String::new(),
                unit: "l".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(added, "Added Milk to the basket");

        let id = FileStore::new(config.data_file.clone()).load().unwrap().basket.items[0].id.clone();
        run(
            &config,
            &messages,
            Command::Basket(BasketCommand::Edit {
                id: id.clone(),
                quantity: "2".to_string(),
            }),
        )
        .await
        .unwrap();

        let shown = run(&config, &messages, Command::Basket(BasketCommand::Show)).await.unwrap();
        assert!(shown.contains("Milk (2 l)"));

        run(&config, &messages, Command::Basket(BasketCommand::Delete { id: id.clone() }))
            .await
            .unwrap();
        let err = run(&config, &messages, Command::Basket(BasketCommand::Delete { id: id.clone() }))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<CookbookError>(),
            Some(&CookbookError::BasketItemNotFound(id))
        );
    }

    #[tokio::test]
    async fn test_build_needs_both_dates() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let messages = LocalizationManager::new().unwrap();

        let err = run(
            &config,
            &messages,
            Command::Basket(BasketCommand::Build {
                from: Some(monday()),
                to: None,
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(
            cli::localized_error(&err, &messages, "en"),
            "Please choose both a start date and an end date"
        );
        assert!(!config.data_file.exists());
    }

    #[tokio::test]
    async fn test_edit_renames_planned_meals() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let messages = LocalizationManager::new().unwrap();
        let id = add_pancakes(&config, &messages).await;

        run(
            &config,
            &messages,
            Command::Plan(PlanCommand::Set {
                date: monday(),
                meal: MealType::Lunch,
                recipe_id: id.clone(),
            }),
        )
        .await
        .unwrap();

        run(
            &config,
            &messages,
            Command::Recipe(RecipeCommand::Edit {
                id: id.clone(),
                fields: RecipeFields {
                    title: Some("Crêpes".to_string()),
                    ..Default::default()
                },
            }),
        )
        .await
        .unwrap();

        let data = FileStore::new(config.data_file.clone()).load().unwrap();
        assert_eq!(data.recipes.get(&id).unwrap().title, "Crêpes");
        assert_eq!(data.recipes.get(&id).unwrap().ingredients.len(), 2);
        assert_eq!(data.meal_plan.get(monday(), MealType::Lunch).unwrap().recipe_name, "Crêpes");
    }

    #[tokio::test]
    async fn test_backup_without_configuration() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let messages = LocalizationManager::new().unwrap();

        let output = run(&config, &messages, Command::Backup).await.unwrap();
        assert!(output.starts_with("Remote backup is not configured"));
    }
}
