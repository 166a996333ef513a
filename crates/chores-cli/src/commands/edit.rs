use anyhow::Result;
use chores_core::models::{UpdateTaskData, User};
use chores_core::repository::Repository;
use owo_colors::OwoColorize;

use crate::cli::EditCommand;
use crate::parser::parse_datetime;
use crate::util::{resolve_category, resolve_task_id, resolve_users};
use crate::views::print_json;

pub async fn edit_task(repo: &(impl Repository + Sync), actor: &User, command: EditCommand, json: bool) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let current = repo.find_task(actor.id, task_id).await?;

    // Categories are looked up inside the task's current group
    let category_id = match command.category.as_deref() {
        Some(title) => {
            let current_category = repo.find_category(actor.id, current.task.category_id).await?;
            Some(resolve_category(repo, current_category.category.group_id, title).await?.id)
        }
        None => None,
    };

    let update_data = UpdateTaskData {
        category_id,
        title: command.title,
        memo: command.memo,
        notice_available: command.notice,
        execute_at: command.at.as_deref().map(parse_datetime).transpose()?,
        add_user_ids: resolve_users(repo, &command.assign).await?,
        delete_user_ids: resolve_users(repo, &command.unassign).await?,
    };

    let updated = repo.update_task(actor.id, task_id, update_data).await?;

    if json {
        return print_json(&updated);
    }

    println!("{} Updated task: {}", "✓".green().bold(), updated.task.title.bright_white().bold());
    if updated.task.chain_id.is_some() {
        println!("  Only this occurrence changed; the rest of the series is untouched.");
    }

    Ok(())
}
