use chores_core::models::{Category, GroupInfo, TaskWithUsers, User};
use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use std::collections::HashMap;
use uuid::Uuid;

/// Resolves user ids to names for display.
pub struct UserNames(HashMap<Uuid, String>);

impl UserNames {
    pub fn new(users: &[User]) -> Self {
        Self(users.iter().map(|u| (u.id, u.name.clone())).collect())
    }

    pub fn name(&self, id: &Uuid) -> String {
        self.0
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string()[..8].to_string())
    }
}

fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn due_cell(execute_at: DateTime<Utc>, finished: bool) -> Cell {
    let text = format!("{} ({})", execute_at.format("%a %Y-%m-%d %H:%M"), execute_at.humanize());
    if finished {
        return Cell::new(text).fg(Color::DarkGrey);
    }

    let now = Utc::now();
    if execute_at < now && execute_at.date_naive() != now.date_naive() {
        Cell::new(text).fg(Color::Red) // Overdue
    } else if execute_at.date_naive() == now.date_naive() {
        Cell::new(text).fg(Color::Yellow) // Due today
    } else {
        Cell::new(text)
    }
}

/// Everyone assigned has marked it done.
fn is_finished(task: &TaskWithUsers) -> bool {
    !task.task_user_list.is_empty() && task.task_user_list.iter().all(|u| u.is_end)
}

pub fn display_tasks(tasks: &[TaskWithUsers], names: &UserNames, categories: &HashMap<Uuid, String>) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Due", "Category", "Assignees"]);

    for entry in tasks {
        let task = &entry.task;
        let finished = is_finished(entry);
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&task.id)));

        let mut title = String::new();
        if task.chain_id.is_some() {
            title.push('↻'); // Recurring symbol
            title.push(' ');
        }
        title.push_str(&task.title);

        let mut title_cell = Cell::new(title);
        if finished {
            title_cell = title_cell.add_attribute(Attribute::CrossedOut).fg(Color::DarkGrey);
        }
        row.add_cell(title_cell);
        row.add_cell(due_cell(task.execute_at, finished));
        row.add_cell(Cell::new(
            categories.get(&task.category_id).map(String::as_str).unwrap_or("?"),
        ));

        let assignees: Vec<String> = entry
            .task_user_list
            .iter()
            .map(|u| {
                let name = names.name(&u.user_id);
                if u.is_end { format!("{} ✓", name) } else { name }
            })
            .collect();
        row.add_cell(Cell::new(if assignees.is_empty() {
            "None".to_string()
        } else {
            assignees.join(", ")
        }));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_task_detail(entry: &TaskWithUsers, names: &UserNames, category: &str) {
    let task = &entry.task;
    let mut table = Table::new();

    table.add_row(vec![Cell::new("ID").add_attribute(Attribute::Bold), Cell::new(task.id)]);
    table.add_row(vec![Cell::new("Title").add_attribute(Attribute::Bold), Cell::new(&task.title)]);
    table.add_row(vec![Cell::new("Category").add_attribute(Attribute::Bold), Cell::new(category)]);
    table.add_row(vec![
        Cell::new("Due").add_attribute(Attribute::Bold),
        due_cell(task.execute_at, is_finished(entry)),
    ]);
    table.add_row(vec![
        Cell::new("Memo").add_attribute(Attribute::Bold),
        Cell::new(task.memo.as_deref().unwrap_or("None")),
    ]);
    table.add_row(vec![
        Cell::new("Reminders").add_attribute(Attribute::Bold),
        Cell::new(if task.notice_available { "on" } else { "off" }),
    ]);
    if let (Some(cycle), Some(until)) = (task.repeat_cycle, task.end_repeat_at) {
        table.add_row(vec![
            Cell::new("Repeats").add_attribute(Attribute::Bold),
            Cell::new(format!("{} until {}", cycle, until.format("%Y-%m-%d"))),
        ]);
    }
    table.add_row(vec![
        Cell::new("Created by").add_attribute(Attribute::Bold),
        Cell::new(names.name(&task.creator_id)),
    ]);
    for user in &entry.task_user_list {
        let state = if user.is_end {
            Cell::new("done").fg(Color::Green)
        } else {
            Cell::new("open")
        };
        table.add_row(vec![Cell::new(names.name(&user.user_id)), state]);
    }

    println!("{table}");
}

pub fn display_users(users: &[User]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Joined"]);
    for user in users {
        table.add_row(vec![
            Cell::new(short_id(&user.id)),
            Cell::new(&user.name),
            Cell::new(user.created_at.humanize()),
        ]);
    }

    println!("{table}");
}

pub fn display_group(info: &GroupInfo, names: &UserNames) {
    let mut table = Table::new();
    table.set_header(vec!["Group", "Invite code", "Members"]);

    let members: Vec<String> = info.user_ids.iter().map(|id| names.name(id)).collect();
    table.add_row(vec![
        Cell::new(&info.group.title).add_attribute(Attribute::Bold),
        Cell::new(&info.group.invite_code).fg(Color::Yellow),
        Cell::new(members.join(", ")),
    ]);

    println!("{table}");
}

pub fn display_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Created"]);
    for category in categories {
        table.add_row(vec![
            Cell::new(short_id(&category.id)),
            Cell::new(&category.title),
            Cell::new(category.created_at.humanize()),
        ]);
    }

    println!("{table}");
}
