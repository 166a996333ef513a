use anyhow::Result;
use chores_core::models::User;
use chores_core::repository::Repository;

use crate::cli::DoneCommand;
use crate::util::resolve_task_id;
use crate::views::print_json;

pub async fn set_completion(
    repo: &(impl Repository + Sync),
    actor: &User,
    command: DoneCommand,
    is_end: bool,
    json: bool,
) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task_user = repo.set_task_completion(actor.id, task_id, is_end).await?;

    if json {
        return print_json(&task_user);
    }

    let task = repo.find_task(actor.id, task_id).await?;
    if is_end {
        println!("Completed task: '{}'", task.task.title);
    } else {
        println!("Reopened task: '{}'", task.task.title);
    }

    let open = task.task_user_list.iter().filter(|u| !u.is_end).count();
    if open > 0 {
        println!("{} of {} assignees still to go", open, task.task_user_list.len());
    }

    Ok(())
}
