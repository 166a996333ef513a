use chores_core::models::{Periodical, RepeatCycle};
use clap::{Parser, Subcommand};

/// Shared household chores with recurring tasks planned months ahead
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Act as this user instead of the one configured in config.toml
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage users
    User(UserCommand),
    /// Manage groups
    Group(GroupCommand),
    /// Manage categories inside a group
    Category(CategoryCommand),
    /// Add a task, optionally repeating
    Add(AddCommand),
    /// List a group's tasks for a day, week or month
    List(ListCommand),
    /// Show one task with its assignees
    Show(ShowCommand),
    /// Edit a single occurrence
    Edit(EditCommand),
    /// Delete a single occurrence
    Delete(DeleteCommand),
    /// Mark your part of a task as done
    Done(DoneCommand),
    /// Mark your part of a task as not done
    Undo(DoneCommand),
    /// Materialize upcoming occurrences of every open recurring task
    Extend,
}

#[derive(Parser, Debug, Clone)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum UserSubcommand {
    /// Register a user
    Add {
        name: String,
    },
    /// List users
    List,
    /// Change a user's name
    Rename {
        name: String,
        new_name: String,
    },
    /// Delete a user; groups they alone belong to go with them
    Delete {
        name: String,
        /// Delete without confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct GroupCommand {
    #[command(subcommand)]
    pub command: GroupSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum GroupSubcommand {
    /// Create a group; you become its first member
    Add {
        title: String,
    },
    /// Show a group, its members and invite code
    Show {
        title: String,
    },
    /// Rename a group
    Rename {
        title: String,
        new_title: String,
    },
    /// Join a group with its invite code
    Join {
        title: String,
        code: String,
    },
    /// Leave a group; the last member out deletes it
    Leave {
        title: String,
        /// Leave without confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// List the groups you belong to
    List,
}

#[derive(Parser, Debug, Clone)]
pub struct CategoryCommand {
    #[command(subcommand)]
    pub command: CategorySubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategorySubcommand {
    /// Add a category to a group
    Add {
        #[arg(short, long)]
        group: String,
        title: String,
    },
    /// List a group's categories
    List {
        #[arg(short, long)]
        group: String,
    },
    /// Rename a category
    Rename {
        #[arg(short, long)]
        group: String,
        title: String,
        new_title: String,
    },
    /// Delete a category and every task in it
    Delete {
        #[arg(short, long)]
        group: String,
        title: String,
        /// Delete without confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The title of the task
    pub title: String,
    /// Group the task belongs to
    #[arg(short, long)]
    pub group: String,
    /// Category inside the group
    #[arg(short, long)]
    pub category: String,
    /// When the (first) occurrence is due, e.g. "2024-05-01 09:00" or "tomorrow"
    #[arg(short, long, default_value = "today")]
    pub at: String,
    /// Repeat cycle: daily, weekly or monthly
    #[arg(short, long)]
    pub every: Option<RepeatCycle>,
    /// Last date a repeating task may fall on
    #[arg(long, requires = "every")]
    pub until: Option<String>,
    /// Free-form note
    #[arg(short, long)]
    pub memo: Option<String>,
    /// Disable reminders for this task
    #[arg(long)]
    pub no_notice: bool,
    /// Assign users by name
    #[arg(short = 'u', long = "assign", num_args = 1..)]
    pub assign: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Group to list
    #[arg(short, long)]
    pub group: String,
    /// Bucket size: daily, weekly or monthly
    #[arg(short, long, default_value = "weekly")]
    pub period: Periodical,
    /// Any date inside the bucket
    #[arg(short, long, default_value = "today")]
    pub date: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowCommand {
    /// The ID (or unique prefix) of the task
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID (or unique prefix) of the task to edit
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub memo: Option<String>,

    /// Move this occurrence to another date
    #[arg(long)]
    pub at: Option<String>,

    /// Move to another category of the same group
    #[arg(long)]
    pub category: Option<String>,

    /// Turn reminders on or off
    #[arg(long)]
    pub notice: Option<bool>,

    /// Assign more users by name
    #[arg(long, num_args = 1..)]
    pub assign: Vec<String>,

    /// Remove assignees by name
    #[arg(long, num_args = 1..)]
    pub unassign: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID (or unique prefix) of the task to delete
    pub id: String,
    /// Force deletion without confirmation
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DoneCommand {
    /// The ID (or unique prefix) of the task
    pub id: String,
}
