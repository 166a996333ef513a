use anyhow::Result;
use chores_core::models::User;
use chores_core::repository::Repository;
use dialoguer::Confirm;

use crate::cli::DeleteCommand;
use crate::util::resolve_task_id;

pub async fn delete_task(repo: &(impl Repository + Sync), actor: &User, command: DeleteCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo.find_task(actor.id, task_id).await?.task;

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!(
                "Are you sure you want to delete task '{}' on {}?",
                task.title,
                task.execute_at.format("%Y-%m-%d")
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    repo.delete_task(actor.id, task_id).await?;
    println!("Deleted task: '{}'", task.title);

    Ok(())
}
