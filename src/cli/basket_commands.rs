//! Shopping basket commands

use anyhow::Result;
use chrono::NaiveDate;

use super::ui_builder::format_basket;
use super::{BasketCommand, Session};
use crate::basket::BasketPeriod;
use crate::error::CookbookError;

pub fn run(command: BasketCommand, session: &mut Session<'_>) -> Result<String> {
    match command {
        BasketCommand::Build { from, to } => build(session, from, to),
        BasketCommand::Show => Ok(format_basket(&session.data.basket, session.messages, session.language)),
        BasketCommand::Add {
            name,
            quantity,
            unit,
        } => add(session, &name, &quantity, &unit),
        BasketCommand::Edit { id, quantity } => edit(session, &id, &quantity),
        BasketCommand::Delete { id } => delete(session, &id),
        BasketCommand::Clear => {
            session.data.basket.clear();
            session.save()?;
            Ok(session.t("basket-cleared", &[]))
        }
    }
}

fn build(session: &mut Session<'_>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<String> {
    let period = BasketPeriod::from_optional(from, to)?;
    let policy = session.config.refresh_policy();

    let data = &mut session.data;
    let count = data
        .basket
        .refresh(&data.meal_plan, data.recipes.all(), period, policy);
    session.save()?;

    let summary = session.t_count(
        "basket-built",
        count,
        &[
            ("start", period.start.to_string().as_str()),
            ("end", period.end.to_string().as_str()),
        ],
    );
    let listing = format_basket(&session.data.basket, session.messages, session.language);
    Ok(format!("{}\n\n{}", summary, listing))
}

fn add(session: &mut Session<'_>, name: &str, quantity: &str, unit: &str) -> Result<String> {
    let name = session.data.basket.add_manual(name, quantity, unit)?.name.clone();
    session.save()?;
    Ok(session.t("basket-item-added", &[("name", name.as_str())]))
}

fn edit(session: &mut Session<'_>, id: &str, quantity: &str) -> Result<String> {
    if !session.data.basket.edit_quantity(id, quantity) {
        return Err(CookbookError::BasketItemNotFound(id.to_string()).into());
    }
    session.save()?;

    let name = session
        .data
        .basket
        .get(id)
        .map(|item| item.name.clone())
        .unwrap_or_default();
    Ok(session.t("basket-item-updated", &[("name", name.as_str())]))
}

fn delete(session: &mut Session<'_>, id: &str) -> Result<String> {
    if !session.data.basket.delete(id) {
        return Err(CookbookError::BasketItemNotFound(id.to_string()).into());
    }
    session.save()?;
    Ok(session.t("basket-item-deleted", &[("id", id)]))
}
