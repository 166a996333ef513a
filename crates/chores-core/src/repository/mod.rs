use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    Category, CategoryInfo, CreatedTask, Group, GroupInfo, MaterializationSummary, NewTaskData,
    Periodical, Task, TaskUser, TaskWithUsers, UpdateTaskData, User,
};
use crate::recurrence::MaterializationManager;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::FromRow;
use uuid::Uuid;

// Re-export domain modules
pub mod authorization;
pub mod categories;
pub mod groups;
pub mod materialization;
pub mod tasks;
pub mod users;

/// Row shape of the periodical listing: an occurrence plus its assignments
/// aggregated into a JSON array by SQLite.
#[derive(Debug, Clone, FromRow)]
pub struct TaskQueryResult {
    #[sqlx(flatten)]
    pub task: Task,
    pub task_user_list: String,
}

/// Membership checks consumed by every operation that acts on behalf of a user.
#[async_trait]
pub trait Authorization {
    /// `NotFound` if the group does not exist, `Forbidden` if `user_id` is not a member.
    async fn assert_member(&self, user_id: Uuid, group_id: Uuid) -> Result<(), CoreError>;
    /// The group owning a category, or `NotFound`.
    async fn category_group(&self, category_id: Uuid) -> Result<Uuid, CoreError>;
}

/// Domain-specific trait for user operations
#[async_trait]
pub trait UserRepository {
    async fn add_user(&self, name: String) -> Result<User, CoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, CoreError>;
    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, CoreError>;
    async fn find_users(&self) -> Result<Vec<User>, CoreError>;
    async fn find_groups_for_user(&self, user_id: Uuid) -> Result<Vec<Group>, CoreError>;
    async fn rename_user(&self, id: Uuid, name: String) -> Result<User, CoreError>;
    async fn delete_user(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for group operations
#[async_trait]
pub trait GroupRepository {
    async fn add_group(&self, actor: Uuid, title: String) -> Result<GroupInfo, CoreError>;
    async fn find_group(&self, actor: Uuid, id: Uuid) -> Result<GroupInfo, CoreError>;
    async fn find_group_by_title(&self, title: &str) -> Result<Option<Group>, CoreError>;
    async fn rename_group(&self, actor: Uuid, id: Uuid, title: String) -> Result<GroupInfo, CoreError>;
    async fn join_group(&self, actor: Uuid, id: Uuid, invite_code: &str) -> Result<GroupInfo, CoreError>;
    async fn leave_group(&self, actor: Uuid, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for category operations
#[async_trait]
pub trait CategoryRepository {
    async fn add_category(&self, actor: Uuid, group_id: Uuid, title: String) -> Result<CategoryInfo, CoreError>;
    async fn find_category(&self, actor: Uuid, id: Uuid) -> Result<CategoryInfo, CoreError>;
    async fn find_category_by_title(&self, group_id: Uuid, title: &str) -> Result<Option<Category>, CoreError>;
    async fn find_categories(&self, actor: Uuid, group_id: Uuid) -> Result<Vec<Category>, CoreError>;
    async fn rename_category(&self, actor: Uuid, id: Uuid, title: String) -> Result<CategoryInfo, CoreError>;
    async fn delete_category(&self, actor: Uuid, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for task operations
#[async_trait]
pub trait TaskRepository {
    /// Creates a task. Recurring definitions materialize their whole chain up to the horizon.
    async fn add_task(&self, actor: Uuid, data: NewTaskData) -> Result<CreatedTask, CoreError>;
    async fn find_task(&self, actor: Uuid, id: Uuid) -> Result<TaskWithUsers, CoreError>;
    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError>;
    async fn find_task_users(&self, task_id: Uuid) -> Result<Vec<TaskUser>, CoreError>;
    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError>;
    /// Occurrences of a group falling in the bucket of `reference`, with their assignments.
    async fn find_tasks_by_period(
        &self,
        actor: Uuid,
        group_id: Uuid,
        reference: NaiveDate,
        periodical: Periodical,
    ) -> Result<Vec<TaskWithUsers>, CoreError>;
    /// Every surviving occurrence of a chain in date order.
    async fn find_chain(&self, chain_id: Uuid) -> Result<Vec<Task>, CoreError>;
    async fn update_task(&self, actor: Uuid, id: Uuid, data: UpdateTaskData) -> Result<TaskWithUsers, CoreError>;
    async fn delete_task(&self, actor: Uuid, id: Uuid) -> Result<(), CoreError>;
    async fn set_task_completion(&self, actor: Uuid, id: Uuid, is_end: bool) -> Result<TaskUser, CoreError>;
}

/// Domain-specific trait for materialization operations
#[async_trait]
pub trait MaterializationRepository {
    /// Appends occurrences to every open chain up to the current horizon, atomically.
    async fn extend_chains(&self) -> Result<MaterializationSummary, CoreError>;
    async fn find_active_chain_ids(&self) -> Result<Vec<Uuid>, CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository:
    Authorization +
    UserRepository +
    GroupRepository +
    CategoryRepository +
    TaskRepository +
    MaterializationRepository
{
    // This trait automatically composes all domain-specific repositories
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
    materialization_manager: MaterializationManager,
}

impl SqliteRepository {
    pub fn new(pool: DbPool, materialization_manager: MaterializationManager) -> Self {
        Self { pool, materialization_manager }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Get a reference to the materialization manager for internal use
    pub(crate) fn materialization_manager(&self) -> &MaterializationManager {
        &self.materialization_manager
    }
}

impl Repository for SqliteRepository {}

/// Trims a user-supplied title and rejects it when nothing is left.
pub(crate) fn normalize_title(kind: &str, title: &str) -> Result<String, CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidInput(format!("{} title must not be empty", kind)));
    }
    Ok(trimmed.to_string())
}
