use crate::error::CoreError;
use crate::models::{
    CreatedTask, NewTaskData, Periodical, Task, TaskUser, TaskWithUsers, UpdateTaskData,
};
use crate::repository::{normalize_title, Authorization, SqliteRepository, TaskQueryResult};
use async_trait::async_trait;
use chrono::{NaiveDate, SubsecRound, Utc};
use serde::Deserialize;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl super::TaskRepository for SqliteRepository {
    async fn add_task(&self, actor: Uuid, data: NewTaskData) -> Result<CreatedTask, CoreError> {
        let title = normalize_title("Task", &data.title)?;
        let assignees = normalize_assignees(data.add_user_ids)?;

        let group_id = self.category_group(data.category_id).await?;
        self.assert_member(actor, group_id).await?;
        self.assert_assignable(group_id, &assignees).await?;

        let execute_at = data.execute_at.trunc_subsecs(0);

        // Only a cycle together with an end date starts a chain
        let (repeat_cycle, end_repeat_at, dates) = match (data.repeat_cycle, data.end_repeat_at) {
            (Some(cycle), Some(until)) => {
                let until = until.trunc_subsecs(0);
                let dates = self.materialization_manager().plan_chain(cycle, execute_at, until);
                (Some(cycle), Some(until), dates)
            }
            (None, Some(_)) => {
                return Err(CoreError::InvalidInput(
                    "An end of repeat date requires a repeat cycle".to_string(),
                ));
            }
            // The cycle is kept but nothing beyond the head is scheduled
            (cycle, None) => (cycle, None, vec![execute_at]),
        };

        let head_id = Uuid::now_v7();
        let chain_id = end_repeat_at.map(|_| head_id);
        let now = Utc::now();

        let mut tx = self.pool().begin().await?;
        let mut occurrences = Vec::with_capacity(dates.len());

        for (index, scheduled) in dates.into_iter().enumerate() {
            let occurrence = Task {
                id: if index == 0 { head_id } else { Uuid::now_v7() },
                category_id: data.category_id,
                creator_id: actor,
                title: title.clone(),
                memo: data.memo.clone(),
                notice_available: data.notice_available.unwrap_or(true),
                repeat_cycle,
                end_repeat_at,
                execute_at: scheduled,
                chain_id,
                created_at: now,
                updated_at: now,
            };

            Self::insert_task_in_transaction(&mut tx, &occurrence).await?;
            Self::insert_task_users_in_transaction(&mut tx, occurrence.id, &assignees).await?;
            occurrences.push(occurrence);
        }

        tx.commit().await?;

        tracing::info!(
            task_id = %head_id,
            chain = chain_id.is_some(),
            occurrences = occurrences.len(),
            horizon = %self.materialization_manager().horizon(),
            "task created"
        );

        let head = occurrences
            .first()
            .cloned()
            .ok_or_else(|| CoreError::InvalidInput("No occurrence was scheduled".to_string()))?;
        let task_user_list = assignees
            .iter()
            .map(|user_id| TaskUser { task_id: head_id, user_id: *user_id, is_end: false })
            .collect();

        Ok(CreatedTask {
            head: TaskWithUsers { task: head, task_user_list },
            occurrences,
        })
    }

    async fn find_task(&self, actor: Uuid, id: Uuid) -> Result<TaskWithUsers, CoreError> {
        let task = self.require_task(id).await?;
        let group_id = self.category_group(task.category_id).await?;
        self.assert_member(actor, group_id).await?;

        let task_user_list = self.find_task_users(id).await?;
        Ok(TaskWithUsers { task, task_user_list })
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError> {
        let task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(task)
    }

    async fn find_task_users(&self, task_id: Uuid) -> Result<Vec<TaskUser>, CoreError> {
        let users = sqlx::query_as("SELECT task_id, user_id, is_end FROM task_users WHERE task_id = $1 ORDER BY rowid")
            .bind(task_id)
            .fetch_all(self.pool())
            .await?;
        Ok(users)
    }

    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError> {
        // Ids are stored as 16-byte blobs; match against their hex form
        let mut pattern: String = short_id
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        pattern.push('%');

        let tasks: Vec<Task> = sqlx::query_as("SELECT * FROM tasks WHERE lower(hex(id)) LIKE $1 ORDER BY execute_at")
            .bind(pattern)
            .fetch_all(self.pool())
            .await?;
        Ok(tasks)
    }

    async fn find_tasks_by_period(
        &self,
        actor: Uuid,
        group_id: Uuid,
        reference: NaiveDate,
        periodical: Periodical,
    ) -> Result<Vec<TaskWithUsers>, CoreError> {
        self.assert_member(actor, group_id).await?;

        let (start, end) = periodical.bucket(reference);
        let rows: Vec<TaskQueryResult> = sqlx::query_as(
            r#"SELECT t.*,
                json_group_array(json_object('user_id', lower(hex(tu.user_id)), 'is_end', tu.is_end))
                    FILTER (WHERE tu.user_id IS NOT NULL) AS task_user_list
            FROM tasks t
            INNER JOIN categories c ON c.id = t.category_id
            LEFT JOIN task_users tu ON tu.task_id = t.id
            WHERE c.group_id = $1
                AND datetime(t.execute_at) >= datetime($2)
                AND datetime(t.execute_at) < datetime($3)
            GROUP BY t.id
            ORDER BY t.execute_at, t.id"#,
        )
        .bind(group_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter()
            .map(|row| {
                let task_user_list = parse_task_user_list(row.task.id, &row.task_user_list)?;
                Ok(TaskWithUsers { task: row.task, task_user_list })
            })
            .collect()
    }

    async fn find_chain(&self, chain_id: Uuid) -> Result<Vec<Task>, CoreError> {
        let tasks = sqlx::query_as("SELECT * FROM tasks WHERE chain_id = $1 ORDER BY execute_at")
            .bind(chain_id)
            .fetch_all(self.pool())
            .await?;
        Ok(tasks)
    }

    async fn update_task(&self, actor: Uuid, id: Uuid, data: UpdateTaskData) -> Result<TaskWithUsers, CoreError> {
        let current = self.require_task(id).await?;
        let current_users = self.find_task_users(id).await?;
        authorize_editor(&current, &current_users, actor)?;

        let title = data.title.as_deref().map(|t| normalize_title("Task", t)).transpose()?;

        // Moving to another category requires membership of its group as well
        let group_id = match data.category_id {
            Some(category_id) if category_id != current.category_id => {
                let group_id = self.category_group(category_id).await?;
                self.assert_member(actor, group_id).await?;
                group_id
            }
            _ => self.category_group(current.category_id).await?,
        };

        let mut add_user_ids = Vec::with_capacity(data.add_user_ids.len());
        for user_id in data.add_user_ids {
            if current_users.iter().any(|u| u.user_id == user_id) || add_user_ids.contains(&user_id) {
                return Err(CoreError::Duplicate(format!("Assignment of user {} to task {}", user_id, id)));
            }
            add_user_ids.push(user_id);
        }
        self.assert_assignable(group_id, &add_user_ids).await?;

        let mut tx = self.pool().begin().await?;

        sqlx::query(
            r#"UPDATE tasks SET
                category_id = COALESCE($1, category_id),
                title = COALESCE($2, title),
                memo = COALESCE($3, memo),
                notice_available = COALESCE($4, notice_available),
                execute_at = COALESCE($5, execute_at),
                updated_at = $6
            WHERE id = $7"#,
        )
        .bind(data.category_id)
        .bind(title)
        .bind(data.memo)
        .bind(data.notice_available)
        .bind(data.execute_at.map(|at| at.trunc_subsecs(0)))
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        Self::insert_task_users_in_transaction(&mut tx, id, &add_user_ids).await?;

        for user_id in &data.delete_user_ids {
            sqlx::query("DELETE FROM task_users WHERE task_id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let task = self.require_task(id).await?;
        let task_user_list = self.find_task_users(id).await?;
        Ok(TaskWithUsers { task, task_user_list })
    }

    async fn delete_task(&self, actor: Uuid, id: Uuid) -> Result<(), CoreError> {
        let task = self.require_task(id).await?;
        let users = self.find_task_users(id).await?;
        authorize_editor(&task, &users, actor)?;

        // Assignments cascade
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn set_task_completion(&self, actor: Uuid, id: Uuid, is_end: bool) -> Result<TaskUser, CoreError> {
        self.require_task(id).await?;

        let mut tx = self.pool().begin().await?;
        let mut updated: Vec<TaskUser> = sqlx::query_as(
            r#"UPDATE task_users
            SET is_end = $1
            WHERE task_id = $2 AND user_id = $3
            RETURNING task_id, user_id, is_end
            "#,
        )
        .bind(is_end)
        .bind(id)
        .bind(actor)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        updated.pop().ok_or_else(|| {
            CoreError::Forbidden(format!("User {} is not assigned to task {}", actor, id))
        })
    }
}

impl SqliteRepository {
    async fn require_task(&self, id: Uuid) -> Result<Task, CoreError> {
        sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Task with id {} not found", id)))
    }

    /// Every assignee must belong to the group owning the task's category.
    async fn assert_assignable(&self, group_id: Uuid, user_ids: &[Uuid]) -> Result<(), CoreError> {
        for user_id in user_ids {
            self.assert_member(*user_id, group_id).await?;
        }
        Ok(())
    }

    pub(crate) async fn insert_task_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        task: &Task,
    ) -> Result<(), CoreError> {
        sqlx::query(
            r#"INSERT INTO tasks (id, category_id, creator_id, title, memo, notice_available, repeat_cycle, end_repeat_at, execute_at, chain_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
        )
        .bind(task.id)
        .bind(task.category_id)
        .bind(task.creator_id)
        .bind(&task.title)
        .bind(&task.memo)
        .bind(task.notice_available)
        .bind(task.repeat_cycle)
        .bind(task.end_repeat_at)
        .bind(task.execute_at)
        .bind(task.chain_id)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub(crate) async fn insert_task_users_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        task_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<(), CoreError> {
        for user_id in user_ids {
            sqlx::query("INSERT INTO task_users (task_id, user_id, is_end) VALUES ($1, $2, 0)")
                .bind(task_id)
                .bind(user_id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

/// An explicitly given assignee list must be non-empty; repeated ids collapse.
fn normalize_assignees(user_ids: Option<Vec<Uuid>>) -> Result<Vec<Uuid>, CoreError> {
    let Some(user_ids) = user_ids else {
        return Ok(Vec::new());
    };
    if user_ids.is_empty() {
        return Err(CoreError::InvalidInput("add_user_ids must contain at least one user".to_string()));
    }

    let mut unique = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        if !unique.contains(&user_id) {
            unique.push(user_id);
        }
    }
    Ok(unique)
}

/// Only the creator or a current assignee may edit or delete an occurrence.
fn authorize_editor(task: &Task, users: &[TaskUser], actor: Uuid) -> Result<(), CoreError> {
    if task.creator_id == actor || users.iter().any(|u| u.user_id == actor) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "User {} is neither the creator nor an assignee of task {}",
            actor, task.id
        )))
    }
}

#[derive(Debug, Deserialize)]
struct AggregatedTaskUser {
    user_id: String,
    is_end: i64,
}

fn parse_task_user_list(task_id: Uuid, raw: &str) -> Result<Vec<TaskUser>, CoreError> {
    let entries: Vec<AggregatedTaskUser> = serde_json::from_str(raw)
        .map_err(|e| CoreError::CorruptData(format!("assignments of task {}: {}", task_id, e)))?;

    entries
        .into_iter()
        .map(|entry| {
            let user_id = Uuid::parse_str(&entry.user_id)
                .map_err(|e| CoreError::CorruptData(format!("user id '{}': {}", entry.user_id, e)))?;
            Ok(TaskUser { task_id, user_id, is_end: entry.is_end != 0 })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_assignees_absent_is_empty() {
        assert!(normalize_assignees(None).unwrap().is_empty());
    }

    #[test]
    fn test_normalize_assignees_rejects_empty_list() {
        let result = normalize_assignees(Some(vec![]));
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_normalize_assignees_collapses_repeats() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        assert_eq!(normalize_assignees(Some(vec![a, b, a])).unwrap(), vec![a, b]);
    }

    #[test]
    fn test_parse_task_user_list_reads_sqlite_hex_ids() {
        let task_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let raw = format!(r#"[{{"user_id":"{}","is_end":1}}]"#, user_id.simple());

        let parsed = parse_task_user_list(task_id, &raw).unwrap();
        assert_eq!(parsed, vec![TaskUser { task_id, user_id, is_end: true }]);
    }

    #[test]
    fn test_parse_task_user_list_empty_array() {
        assert!(parse_task_user_list(Uuid::now_v7(), "[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_task_user_list_rejects_garbage() {
        let result = parse_task_user_list(Uuid::now_v7(), "not json");
        assert!(matches!(result, Err(CoreError::CorruptData(_))));
    }
}
