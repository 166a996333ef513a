use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A group together with the ids of its members.
#[derive(Debug, Clone, Serialize)]
pub struct GroupInfo {
    #[serde(flatten)]
    pub group: Group,
    pub user_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub group_id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category with the number of occurrences filed under it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryInfo {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub category: Category,
    pub task_count: i64,
}

/// The fixed set of recurrence cycles a chain can follow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RepeatCycle {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid repeat cycle: {0} (expected daily, weekly or monthly)")]
pub struct ParseRepeatCycleError(String);

impl FromStr for RepeatCycle {
    type Err = ParseRepeatCycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "1d" => Ok(RepeatCycle::Daily),
            "weekly" | "1w" => Ok(RepeatCycle::Weekly),
            "monthly" | "1m" => Ok(RepeatCycle::Monthly),
            _ => Err(ParseRepeatCycleError(s.to_string())),
        }
    }
}

impl std::fmt::Display for RepeatCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepeatCycle::Daily => write!(f, "daily"),
            RepeatCycle::Weekly => write!(f, "weekly"),
            RepeatCycle::Monthly => write!(f, "monthly"),
        }
    }
}

/// Bucket granularity for periodical listings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Periodical {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid periodical: {0} (expected daily, weekly or monthly)")]
pub struct ParsePeriodicalError(String);

impl FromStr for Periodical {
    type Err = ParsePeriodicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "day" => Ok(Periodical::Daily),
            "weekly" | "week" => Ok(Periodical::Weekly),
            "monthly" | "month" => Ok(Periodical::Monthly),
            _ => Err(ParsePeriodicalError(s.to_string())),
        }
    }
}

impl std::fmt::Display for Periodical {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Periodical::Daily => write!(f, "daily"),
            Periodical::Weekly => write!(f, "weekly"),
            Periodical::Monthly => write!(f, "monthly"),
        }
    }
}

/// One concrete, dated task occurrence.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub category_id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub memo: Option<String>,
    pub notice_available: bool,
    pub repeat_cycle: Option<RepeatCycle>,
    pub end_repeat_at: Option<DateTime<Utc>>,
    pub execute_at: DateTime<Utc>,
    /// Id of the occurrence that started the chain. The head stores its own id;
    /// non-repeating tasks store NULL.
    pub chain_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_chain_head(&self) -> bool {
        self.chain_id == Some(self.id)
    }
}

/// Assignment of an occurrence to a user, with that user's completion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TaskUser {
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub is_end: bool,
}

/// An occurrence with its full assignment list attached.
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithUsers {
    #[serde(flatten)]
    pub task: Task,
    pub task_user_list: Vec<TaskUser>,
}

#[derive(Debug, Clone)]
pub struct NewTaskData {
    pub category_id: Uuid,
    pub title: String,
    pub repeat_cycle: Option<RepeatCycle>,
    pub memo: Option<String>,
    /// Defaults to enabled when absent
    pub notice_available: Option<bool>,
    pub end_repeat_at: Option<DateTime<Utc>>,
    pub execute_at: DateTime<Utc>,
    /// Initial assignees; must be non-empty when present
    pub add_user_ids: Option<Vec<Uuid>>,
}

/// Partial update of a single occurrence. Siblings in the chain are untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskData {
    pub category_id: Option<Uuid>,
    pub title: Option<String>,
    pub memo: Option<String>,
    pub notice_available: Option<bool>,
    pub execute_at: Option<DateTime<Utc>>,
    pub add_user_ids: Vec<Uuid>,
    pub delete_user_ids: Vec<Uuid>,
}

/// Result of creating a task: the head plus every occurrence materialized with it.
#[derive(Debug, Clone)]
pub struct CreatedTask {
    pub head: TaskWithUsers,
    pub occurrences: Vec<Task>,
}

/// Outcome of one window-extension run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterializationSummary {
    /// Number of active chains examined
    pub chains_processed: usize,
    /// Total occurrences appended across all chains
    pub occurrences_created: usize,
    /// Horizon the run extended up to
    pub horizon: Option<NaiveDate>,
    /// Time taken for the operation
    pub duration_ms: u64,
}

/// Configuration for materialization behavior - core version
/// This is separate from the CLI config to allow for type differences
#[derive(Debug, Clone)]
pub struct MaterializationConfig {
    /// The horizon is the last day of the month this many months after the current one
    pub horizon_months: u32,
}

impl Default for MaterializationConfig {
    fn default() -> Self {
        Self { horizon_months: 2 }
    }
}
