use anyhow::{anyhow, Result};
use chores_core::error::CoreError;
use chores_core::models::{Category, GroupInfo, User};
use chores_core::repository::Repository;
use uuid::Uuid;

pub async fn resolve_task_id(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let tasks = repo.find_tasks_by_short_id_prefix(short_id).await?;
    if tasks.len() == 1 {
        Ok(tasks[0].id)
    } else if tasks.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            short_id
        ))))
    } else {
        let task_info: Vec<(String, String)> = tasks
            .into_iter()
            .map(|t| (t.id.to_string(), format!("{} @ {}", t.title, t.execute_at.format("%Y-%m-%d"))))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(task_info)))
    }
}

pub async fn resolve_user(repo: &impl Repository, name: &str) -> Result<User> {
    repo.find_user_by_name(name.trim())
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(format!("User '{}' not found", name))))
}

/// The user commands run as: `--user` first, then `user` from the config.
pub async fn resolve_actor(repo: &impl Repository, name: Option<&str>) -> Result<User> {
    let name = name.ok_or_else(|| {
        anyhow!(CoreError::InvalidInput(
            "No acting user. Pass --user <name> or set `user` in config.toml".to_string()
        ))
    })?;
    resolve_user(repo, name).await
}

pub async fn resolve_users(repo: &impl Repository, names: &[String]) -> Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.push(resolve_user(repo, name).await?.id);
    }
    Ok(ids)
}

/// Looks a group up by title and checks that `actor` may see it.
pub async fn resolve_group(repo: &impl Repository, actor: Uuid, title: &str) -> Result<GroupInfo> {
    let group = repo
        .find_group_by_title(title.trim())
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(format!("Group '{}' not found", title))))?;
    Ok(repo.find_group(actor, group.id).await?)
}

pub async fn resolve_category(repo: &impl Repository, group_id: Uuid, title: &str) -> Result<Category> {
    repo.find_category_by_title(group_id, title.trim())
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(format!("Category '{}' not found", title))))
}
