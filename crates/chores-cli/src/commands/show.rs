use anyhow::Result;
use chores_core::models::User;
use chores_core::repository::Repository;

use crate::cli::ShowCommand;
use crate::util::resolve_task_id;
use crate::views::print_json;
use crate::views::table::{display_task_detail, UserNames};

pub async fn show_task(repo: &(impl Repository + Sync), actor: &User, command: ShowCommand, json: bool) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo.find_task(actor.id, task_id).await?;

    if json {
        return print_json(&task);
    }

    let category = repo.find_category(actor.id, task.task.category_id).await?;
    let names = UserNames::new(&repo.find_users().await?);
    display_task_detail(&task, &names, &category.category.title);

    Ok(())
}
