use anyhow::Result;
use chores_core::models::User;
use chores_core::error::CoreError;
use chores_core::repository::Repository;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::cli::{GroupCommand, GroupSubcommand};
use crate::util::resolve_group;
use crate::views::print_json;
use crate::views::table::{display_group, UserNames};

pub async fn group_command(repo: &(impl Repository + Sync), actor: &User, command: GroupCommand, json: bool) -> Result<()> {
    let info = match command.command {
        GroupSubcommand::Add { title } => {
            let info = repo.add_group(actor.id, title).await?;
            if !json {
                println!("{} Created group: {}", "✓".green().bold(), info.group.title.bright_white().bold());
            }
            info
        }
        GroupSubcommand::Show { title } => resolve_group(repo, actor.id, &title).await?,
        GroupSubcommand::Rename { title, new_title } => {
            let current = resolve_group(repo, actor.id, &title).await?;
            repo.rename_group(actor.id, current.group.id, new_title).await?
        }
        GroupSubcommand::Join { title, code } => {
            // Not a member yet, so the lookup cannot go through `resolve_group`
            let group = repo
                .find_group_by_title(title.trim())
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("Group '{}' not found", title)))?;
            let info = repo.join_group(actor.id, group.id, &code).await?;
            if !json {
                println!("{} Joined group: {}", "✓".green().bold(), info.group.title.bright_white().bold());
            }
            info
        }
        GroupSubcommand::Leave { title, force } => {
            let current = resolve_group(repo, actor.id, &title).await?;
            if !force {
                let last = current.user_ids.len() == 1;
                let prompt = if last {
                    format!("You are the last member; leaving deletes '{}' and all its tasks. Continue?", current.group.title)
                } else {
                    format!("Leave group '{}'?", current.group.title)
                };
                if !Confirm::new().with_prompt(prompt).default(false).interact().unwrap_or(false) {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            repo.leave_group(actor.id, current.group.id).await?;
            println!("Left group: '{}'", current.group.title);
            return Ok(());
        }
        GroupSubcommand::List => {
            let groups = repo.find_groups_for_user(actor.id).await?;
            if json {
                return print_json(&groups);
            }
            if groups.is_empty() {
                println!("No groups found.");
            }
            for group in groups {
                println!("{}", group.title);
            }
            return Ok(());
        }
    };

    if json {
        return print_json(&info);
    }

    let names = UserNames::new(&repo.find_users().await?);
    display_group(&info, &names);
    Ok(())
}
