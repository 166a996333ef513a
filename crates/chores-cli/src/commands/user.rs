use anyhow::Result;
use chores_core::repository::Repository;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::cli::{UserCommand, UserSubcommand};
use crate::util::resolve_user;
use crate::views::print_json;
use crate::views::table::display_users;

pub async fn user_command(repo: &(impl Repository + Sync), command: UserCommand, json: bool) -> Result<()> {
    match command.command {
        UserSubcommand::Add { name } => {
            let user = repo.add_user(name).await?;
            if json {
                return print_json(&user);
            }
            println!("{} Added user: {}", "✓".green().bold(), user.name.bright_white().bold());
        }
        UserSubcommand::List => {
            let users = repo.find_users().await?;
            if json {
                return print_json(&users);
            }
            display_users(&users);
        }
        UserSubcommand::Rename { name, new_name } => {
            let current = resolve_user(repo, &name).await?;
            let user = repo.rename_user(current.id, new_name).await?;
            if json {
                return print_json(&user);
            }
            println!("{} Renamed user: {} -> {}", "✓".green().bold(), current.name, user.name.bright_white().bold());
        }
        UserSubcommand::Delete { name, force } => {
            let user = resolve_user(repo, &name).await?;
            if !force {
                let prompt = format!("Delete user '{}'? Groups with no other members are deleted too.", user.name);
                if !Confirm::new().with_prompt(prompt).default(false).interact().unwrap_or(false) {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            repo.delete_user(user.id).await?;
            println!("Deleted user: '{}'", user.name);
        }
    }
    Ok(())
}
