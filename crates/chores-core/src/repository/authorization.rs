use crate::error::CoreError;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl super::Authorization for SqliteRepository {
    async fn assert_member(&self, user_id: Uuid, group_id: Uuid) -> Result<(), CoreError> {
        let membership: Option<(Uuid, Option<Uuid>)> = sqlx::query_as(
            r#"SELECT g.id, gm.user_id
            FROM task_groups g
            LEFT JOIN group_members gm ON gm.group_id = g.id AND gm.user_id = $2
            WHERE g.id = $1"#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;

        match membership {
            None => Err(CoreError::NotFound(format!("Group with id {} not found", group_id))),
            Some((_, None)) => Err(CoreError::Forbidden(format!(
                "User {} is not a member of group {}",
                user_id, group_id
            ))),
            Some((_, Some(_))) => Ok(()),
        }
    }

    async fn category_group(&self, category_id: Uuid) -> Result<Uuid, CoreError> {
        sqlx::query_scalar("SELECT group_id FROM categories WHERE id = $1")
            .bind(category_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Category with id {} not found", category_id)))
    }
}
