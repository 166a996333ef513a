use anyhow::Result;
use chores_core::models::{NewTaskData, User};
use chores_core::repository::Repository;
use owo_colors::{OwoColorize, Style};

use crate::cli::AddCommand;
use crate::parser::parse_datetime;
use crate::util::{resolve_category, resolve_group, resolve_users};
use crate::views::print_json;

pub async fn add_task(repo: &(impl Repository + Sync), actor: &User, command: AddCommand, json: bool) -> Result<()> {
    let group = resolve_group(repo, actor.id, &command.group).await?;
    let category = resolve_category(repo, group.group.id, &command.category).await?;

    let execute_at = parse_datetime(&command.at)?;
    let end_repeat_at = command.until.as_deref().map(parse_datetime).transpose()?;
    let add_user_ids = if command.assign.is_empty() {
        None
    } else {
        Some(resolve_users(repo, &command.assign).await?)
    };

    let new_task_data = NewTaskData {
        category_id: category.id,
        title: command.title,
        repeat_cycle: command.every,
        memo: command.memo,
        notice_available: Some(!command.no_notice),
        end_repeat_at,
        execute_at,
        add_user_ids,
    };

    let created = repo.add_task(actor.id, new_task_data).await?;

    if json {
        return print_json(&created.head);
    }

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    let head = &created.head.task;

    if head.chain_id.is_some() {
        println!(
            "{} Created recurring task: {}",
            "✓".style(success_style),
            head.title.bright_white().bold()
        );
        println!("  {} Task ID: {}", "→".style(info_style), head.id.to_string().yellow());
        if let Some(last) = created.occurrences.last() {
            println!(
                "  {} {} occurrences scheduled through {}",
                "→".style(info_style),
                created.occurrences.len(),
                last.execute_at.format("%Y-%m-%d").to_string().cyan()
            );
        }
    } else {
        if command.every.is_some() {
            println!(
                "{} No --until given, so the task was created once",
                "!".yellow().bold()
            );
        }
        println!("{} Created task: {}", "✓".style(success_style), head.title.bright_white().bold());
        println!("  {} Task ID: {}", "→".style(info_style), head.id.to_string().yellow());
        println!(
            "  {} Due: {}",
            "→".style(info_style),
            head.execute_at.format("%Y-%m-%d %H:%M").to_string().cyan()
        );
    }

    Ok(())
}
