use crate::error::CoreError;
use crate::models::{Category, CategoryInfo};
use crate::repository::{normalize_title, Authorization, SqliteRepository};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

#[async_trait]
impl super::CategoryRepository for SqliteRepository {
    async fn add_category(&self, actor: Uuid, group_id: Uuid, title: String) -> Result<CategoryInfo, CoreError> {
        self.assert_member(actor, group_id).await?;
        let title = normalize_title("Category", &title)?;
        if self.find_category_by_title(group_id, &title).await?.is_some() {
            return Err(CoreError::Duplicate(format!("Category '{}'", title)));
        }

        let now = Utc::now();
        let mut tx = self.pool().begin().await?;
        let category: Category = sqlx::query_as(
            r#"INSERT INTO categories (id, group_id, creator_id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(group_id)
        .bind(actor)
        .bind(title)
        .bind(now)
        .fetch_all(&mut *tx)
        .await?
        .pop()
        .ok_or(CoreError::Database(sqlx::Error::RowNotFound))?;
        tx.commit().await?;

        Ok(CategoryInfo { category, task_count: 0 })
    }

    async fn find_category(&self, actor: Uuid, id: Uuid) -> Result<CategoryInfo, CoreError> {
        let info: CategoryInfo = sqlx::query_as(
            r#"SELECT c.*, (SELECT COUNT(*) FROM tasks t WHERE t.category_id = c.id) AS task_count
            FROM categories c
            WHERE c.id = $1"#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Category with id {} not found", id)))?;

        self.assert_member(actor, info.category.group_id).await?;
        Ok(info)
    }

    async fn find_category_by_title(&self, group_id: Uuid, title: &str) -> Result<Option<Category>, CoreError> {
        let category = sqlx::query_as("SELECT * FROM categories WHERE group_id = $1 AND title = $2")
            .bind(group_id)
            .bind(title)
            .fetch_optional(self.pool())
            .await?;
        Ok(category)
    }

    async fn find_categories(&self, actor: Uuid, group_id: Uuid) -> Result<Vec<Category>, CoreError> {
        self.assert_member(actor, group_id).await?;
        let categories = sqlx::query_as("SELECT * FROM categories WHERE group_id = $1 ORDER BY title")
            .bind(group_id)
            .fetch_all(self.pool())
            .await?;
        Ok(categories)
    }

    async fn rename_category(&self, actor: Uuid, id: Uuid, title: String) -> Result<CategoryInfo, CoreError> {
        let existing = self.find_category(actor, id).await?;
        let title = normalize_title("Category", &title)?;
        if let Some(clash) = self.find_category_by_title(existing.category.group_id, &title).await? {
            if clash.id != id {
                return Err(CoreError::Duplicate(format!("Category '{}'", title)));
            }
        }

        sqlx::query("UPDATE categories SET title = $1, updated_at = $2 WHERE id = $3")
            .bind(title)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool())
            .await?;

        self.find_category(actor, id).await
    }

    async fn delete_category(&self, actor: Uuid, id: Uuid) -> Result<(), CoreError> {
        let existing = self.find_category(actor, id).await?;

        // Tasks and their assignments go with the category via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Category with id {} not found", id)));
        }

        tracing::info!(
            category_id = %id,
            tasks_removed = existing.task_count,
            "category deleted"
        );
        Ok(())
    }
}
