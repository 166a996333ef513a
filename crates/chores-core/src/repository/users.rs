use crate::error::CoreError;
use crate::models::{Group, User};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl super::UserRepository for SqliteRepository {
    async fn add_user(&self, name: String) -> Result<User, CoreError> {
        let name = normalize_user_name(&name)?;
        if self.find_user_by_name(&name).await?.is_some() {
            return Err(CoreError::Duplicate(format!("User '{}'", name)));
        }

        let mut tx = self.pool().begin().await?;
        // fetch_all steps the statement to completion so the insert is not left pending
        let user: User = sqlx::query_as(
            r#"INSERT INTO users (id, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(Utc::now())
        .fetch_all(&mut *tx)
        .await?
        .pop()
        .ok_or(CoreError::Database(sqlx::Error::RowNotFound))?;
        tx.commit().await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, CoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, CoreError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn find_users(&self) -> Result<Vec<User>, CoreError> {
        let users = sqlx::query_as("SELECT id, name, created_at FROM users ORDER BY name")
            .fetch_all(self.pool())
            .await?;
        Ok(users)
    }

    async fn find_groups_for_user(&self, user_id: Uuid) -> Result<Vec<Group>, CoreError> {
        let groups = sqlx::query_as(
            r#"SELECT g.* FROM task_groups g
            INNER JOIN group_members gm ON gm.group_id = g.id
            WHERE gm.user_id = $1
            ORDER BY g.title"#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(groups)
    }

    async fn rename_user(&self, id: Uuid, name: String) -> Result<User, CoreError> {
        let name = normalize_user_name(&name)?;
        if let Some(existing) = self.find_user_by_name(&name).await? {
            if existing.id != id {
                return Err(CoreError::Duplicate(format!("User '{}'", name)));
            }
        }

        let result = sqlx::query("UPDATE users SET name = $1 WHERE id = $2")
            .bind(&name)
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("User with id {} not found", id)));
        }

        self.find_user_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("User with id {} not found", id)))
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), CoreError> {
        let user = self
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("User with id {} not found", id)))?;
        let groups = self.find_groups_for_user(id).await?;

        let mut tx = self.pool().begin().await?;
        for group in &groups {
            Self::remove_member_in_transaction(&mut tx, group.id, id).await?;
        }
        Self::hand_over_in_transaction(&mut tx, id).await?;

        // Assignments cascade
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(user_id = %id, name = %user.name, groups = groups.len(), "user deleted");
        Ok(())
    }
}

impl SqliteRepository {
    /// Groups, categories and tasks authored by `from` pass to the longest-standing
    /// member of their group. Groups without members are already gone.
    async fn hand_over_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        from: Uuid,
    ) -> Result<(), CoreError> {
        sqlx::query(
            r#"UPDATE task_groups SET owner_id = (
                SELECT gm.user_id FROM group_members gm
                WHERE gm.group_id = task_groups.id
                ORDER BY gm.joined_at, gm.rowid LIMIT 1)
            WHERE owner_id = $1"#,
        )
        .bind(from)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"UPDATE categories SET creator_id = (
                SELECT gm.user_id FROM group_members gm
                WHERE gm.group_id = categories.group_id
                ORDER BY gm.joined_at, gm.rowid LIMIT 1)
            WHERE creator_id = $1"#,
        )
        .bind(from)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"UPDATE tasks SET creator_id = (
                SELECT gm.user_id FROM group_members gm
                INNER JOIN categories c ON c.group_id = gm.group_id
                WHERE c.id = tasks.category_id
                ORDER BY gm.joined_at, gm.rowid LIMIT 1)
            WHERE creator_id = $1"#,
        )
        .bind(from)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

fn normalize_user_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::InvalidInput("User name must not be empty".to_string()));
    }
    Ok(name.to_string())
}
