use anyhow::Result;
use chores_core::models::User;
use chores_core::repository::Repository;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::cli::{CategoryCommand, CategorySubcommand};
use crate::util::{resolve_category, resolve_group};
use crate::views::print_json;
use crate::views::table::display_categories;

pub async fn category_command(repo: &(impl Repository + Sync), actor: &User, command: CategoryCommand, json: bool) -> Result<()> {
    match command.command {
        CategorySubcommand::Add { group, title } => {
            let group = resolve_group(repo, actor.id, &group).await?;
            let info = repo.add_category(actor.id, group.group.id, title).await?;
            if json {
                return print_json(&info);
            }
            println!("{} Added category: {}", "✓".green().bold(), info.category.title.bright_white().bold());
        }
        CategorySubcommand::List { group } => {
            let group = resolve_group(repo, actor.id, &group).await?;
            let categories = repo.find_categories(actor.id, group.group.id).await?;
            if json {
                return print_json(&categories);
            }
            display_categories(&categories);
        }
        CategorySubcommand::Rename { group, title, new_title } => {
            let group = resolve_group(repo, actor.id, &group).await?;
            let category = resolve_category(repo, group.group.id, &title).await?;
            let info = repo.rename_category(actor.id, category.id, new_title).await?;
            if json {
                return print_json(&info);
            }
            println!("Renamed category '{}' to '{}'", title, info.category.title);
        }
        CategorySubcommand::Delete { group, title, force } => {
            let group = resolve_group(repo, actor.id, &group).await?;
            let category = resolve_category(repo, group.group.id, &title).await?;
            let info = repo.find_category(actor.id, category.id).await?;

            if !force {
                let confirmation = Confirm::new()
                    .with_prompt(format!(
                        "Delete category '{}' and its {} tasks?",
                        info.category.title, info.task_count
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirmation {
                    println!("Deletion cancelled.");
                    return Ok(());
                }
            }

            repo.delete_category(actor.id, category.id).await?;
            println!("Deleted category '{}'", info.category.title);
        }
    }
    Ok(())
}
