use anyhow::Result;
use chores_core::models::User;
use chores_core::repository::Repository;
use std::collections::HashMap;

use crate::cli::ListCommand;
use crate::parser::parse_date;
use crate::util::resolve_group;
use crate::views::print_json;
use crate::views::table::{display_tasks, UserNames};

pub async fn list_tasks(repo: &(impl Repository + Sync), actor: &User, command: ListCommand, json: bool) -> Result<()> {
    let group = resolve_group(repo, actor.id, &command.group).await?;
    let reference = parse_date(&command.date)?;

    let tasks = repo
        .find_tasks_by_period(actor.id, group.group.id, reference, command.period)
        .await?;

    if json {
        return print_json(&tasks);
    }

    let names = UserNames::new(&repo.find_users().await?);
    let categories: HashMap<_, _> = repo
        .find_categories(actor.id, group.group.id)
        .await?
        .into_iter()
        .map(|c| (c.id, c.title))
        .collect();

    display_tasks(&tasks, &names, &categories);

    Ok(())
}
