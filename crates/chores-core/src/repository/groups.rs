use crate::error::CoreError;
use crate::models::{Group, GroupInfo};
use crate::repository::{normalize_title, Authorization, SqliteRepository};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

#[async_trait]
impl super::GroupRepository for SqliteRepository {
    async fn add_group(&self, actor: Uuid, title: String) -> Result<GroupInfo, CoreError> {
        let title = normalize_title("Group", &title)?;
        if self.find_group_by_title(&title).await?.is_some() {
            return Err(CoreError::Duplicate(format!("Group '{}'", title)));
        }

        let now = Utc::now();
        let mut tx = self.pool().begin().await?;

        let group: Group = sqlx::query_as(
            r#"INSERT INTO task_groups (id, owner_id, title, invite_code, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(actor)
        .bind(&title)
        .bind(generate_invite_code())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        Self::add_member_in_transaction(&mut tx, group.id, actor).await?;
        tx.commit().await?;

        tracing::info!(group_id = %group.id, title = %group.title, "group created");
        Ok(GroupInfo { group, user_ids: vec![actor] })
    }

    async fn find_group(&self, actor: Uuid, id: Uuid) -> Result<GroupInfo, CoreError> {
        self.assert_member(actor, id).await?;
        self.load_group_info(id).await
    }

    async fn find_group_by_title(&self, title: &str) -> Result<Option<Group>, CoreError> {
        let group = sqlx::query_as("SELECT * FROM task_groups WHERE title = $1")
            .bind(title)
            .fetch_optional(self.pool())
            .await?;
        Ok(group)
    }

    async fn rename_group(&self, actor: Uuid, id: Uuid, title: String) -> Result<GroupInfo, CoreError> {
        self.assert_member(actor, id).await?;
        let title = normalize_title("Group", &title)?;
        if let Some(existing) = self.find_group_by_title(&title).await? {
            if existing.id != id {
                return Err(CoreError::Duplicate(format!("Group '{}'", title)));
            }
        }

        sqlx::query("UPDATE task_groups SET title = $1, updated_at = $2 WHERE id = $3")
            .bind(&title)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool())
            .await?;

        self.load_group_info(id).await
    }

    async fn join_group(&self, actor: Uuid, id: Uuid, invite_code: &str) -> Result<GroupInfo, CoreError> {
        let info = self.load_group_info(id).await?;
        if info.group.invite_code != invite_code.trim() {
            return Err(CoreError::InvalidInput("invite_code does not match".to_string()));
        }
        if info.user_ids.contains(&actor) {
            return Err(CoreError::Duplicate(format!("Membership of group '{}'", info.group.title)));
        }

        let mut tx = self.pool().begin().await?;
        Self::add_member_in_transaction(&mut tx, id, actor).await?;
        tx.commit().await?;

        self.load_group_info(id).await
    }

    async fn leave_group(&self, actor: Uuid, id: Uuid) -> Result<(), CoreError> {
        self.assert_member(actor, id).await?;

        let mut tx = self.pool().begin().await?;
        Self::remove_member_in_transaction(&mut tx, id, actor).await?;
        tx.commit().await?;
        Ok(())
    }
}

impl SqliteRepository {
    async fn load_group_info(&self, id: Uuid) -> Result<GroupInfo, CoreError> {
        let group: Group = sqlx::query_as("SELECT * FROM task_groups WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Group with id {} not found", id)))?;

        let user_ids = sqlx::query_scalar(
            "SELECT user_id FROM group_members WHERE group_id = $1 ORDER BY joined_at, rowid",
        )
        .bind(id)
        .fetch_all(self.pool())
        .await?;

        Ok(GroupInfo { group, user_ids })
    }

    /// The last member out takes the group, its categories and tasks with them.
    pub(crate) async fn remove_member_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), CoreError> {
        sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM group_members WHERE group_id = $1")
            .bind(group_id)
            .fetch_one(&mut **tx)
            .await?;

        if remaining == 0 {
            sqlx::query("DELETE FROM task_groups WHERE id = $1")
                .bind(group_id)
                .execute(&mut **tx)
                .await?;
            tracing::info!(group_id = %group_id, "group deleted after last member left");
        }
        Ok(())
    }

    async fn add_member_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), CoreError> {
        sqlx::query("INSERT INTO group_members (group_id, user_id, joined_at) VALUES ($1, $2, $3)")
            .bind(group_id)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

/// Six decimal digits, zero padded.
fn generate_invite_code() -> String {
    format!("{:06}", fastrand::u32(0..1_000_000))
}
