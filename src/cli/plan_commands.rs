//! Meal plan commands

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::info;

use super::ui_builder::format_meal_calendar;
use super::{PlanCommand, Session};
use crate::error::CookbookError;
use crate::meal_plan::{calendar_window, MealType};

pub fn run(command: PlanCommand, session: &mut Session<'_>) -> Result<String> {
    match command {
        PlanCommand::Set {
            date,
            meal,
            recipe_id,
        } => set(session, date, meal, &recipe_id),
        PlanCommand::Remove { date, meal } => remove(session, date, meal),
        PlanCommand::Show { from } => Ok(show(session, from.unwrap_or_else(|| Local::now().date_naive()))),
        PlanCommand::Prune { before } => prune(session, before),
    }
}

fn set(session: &mut Session<'_>, date: NaiveDate, meal: MealType, recipe_id: &str) -> Result<String> {
    let recipe = session
        .data
        .recipes
        .get(recipe_id)
        .ok_or_else(|| CookbookError::RecipeNotFound(recipe_id.to_string()))?
        .clone();

    if let Some(previous) = session.data.meal_plan.assign(date, meal, &recipe) {
        info!(%date, %meal, replaced = %previous.recipe_name, "Replaced planned meal");
    }
    session.save()?;

    Ok(session.t(
        "plan-saved",
        &[
            ("title", recipe.title.as_str()),
            ("meal", meal.label()),
            ("date", date.to_string().as_str()),
        ],
    ))
}

fn remove(session: &mut Session<'_>, date: NaiveDate, meal: MealType) -> Result<String> {
    let date_text = date.to_string();
    let args = [("meal", meal.label()), ("date", date_text.as_str())];
    if session.data.meal_plan.remove(date, meal).is_none() {
        return Ok(session.t("plan-empty-slot", &args));
    }
    session.save()?;
    Ok(session.t("plan-removed", &args))
}

fn show(session: &Session<'_>, anchor: NaiveDate) -> String {
    let days = calendar_window(anchor);
    let (Some(first), Some(last)) = (days.first(), days.last()) else {
        return session.t("plan-empty", &[]);
    };

    let mut result = format_meal_calendar(&session.data.meal_plan, &days);
    if session.data.meal_plan.entries_between(*first, *last).next().is_none() {
        result.push_str(&session.t("plan-empty", &[]));
        result.push('\n');
    }
    result
}

fn prune(session: &mut Session<'_>, before: NaiveDate) -> Result<String> {
    let removed = session.data.meal_plan.prune_before(before);
    if removed > 0 {
        session.save()?;
    }
    info!(%before, removed, "Pruned planned meals");
    Ok(session.t_count("plan-pruned", removed, &[("date", &before.to_string())]))
}
