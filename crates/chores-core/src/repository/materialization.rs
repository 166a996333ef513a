use crate::error::CoreError;
use crate::models::{MaterializationSummary, Task};
use crate::recurrence::plan_extension;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, Transaction};
use std::time::Instant;
use uuid::Uuid;

#[async_trait]
impl super::MaterializationRepository for SqliteRepository {
    async fn extend_chains(&self) -> Result<MaterializationSummary, CoreError> {
        let started = Instant::now();
        // One horizon for the whole run, even if it crosses midnight
        let horizon = self.materialization_manager().horizon();

        let mut tx = self.pool().begin().await?;
        let outcome = Self::extend_chains_in_transaction(&mut tx, horizon).await;

        let (chains_processed, occurrences_created) = match outcome {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!(%horizon, error = %e, "chain extension failed, rolling back");
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::error!(error = %rollback_error, "rollback after failed chain extension failed");
                }
                return Err(e);
            }
        };
        tx.commit().await?;

        let summary = MaterializationSummary {
            chains_processed,
            occurrences_created,
            horizon: Some(horizon),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            chains = summary.chains_processed,
            created = summary.occurrences_created,
            %horizon,
            duration_ms = summary.duration_ms,
            "chain extension finished"
        );
        Ok(summary)
    }

    async fn find_active_chain_ids(&self) -> Result<Vec<Uuid>, CoreError> {
        let horizon = self.materialization_manager().horizon();
        let ids = sqlx::query_scalar(ACTIVE_CHAINS_SQL)
            .bind(horizon)
            .fetch_all(self.pool())
            .await?;
        Ok(ids)
    }
}

const ACTIVE_CHAINS_SQL: &str = r#"SELECT DISTINCT chain_id FROM tasks
    WHERE chain_id IS NOT NULL
        AND repeat_cycle IS NOT NULL
        AND end_repeat_at IS NOT NULL
        AND date(end_repeat_at) > date($1)
    ORDER BY chain_id"#;

impl SqliteRepository {
    /// Extends every open chain up to `horizon` inside `tx`.
    ///
    /// Returns `(chains examined, occurrences inserted)`.
    pub(crate) async fn extend_chains_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        horizon: NaiveDate,
    ) -> Result<(usize, usize), CoreError> {
        let chain_ids: Vec<Uuid> = sqlx::query_scalar(ACTIVE_CHAINS_SQL)
            .bind(horizon)
            .fetch_all(&mut **tx)
            .await?;

        let mut created = 0;
        for chain_id in &chain_ids {
            created += Self::extend_chain_in_transaction(tx, *chain_id, horizon).await?;
        }

        Ok((chain_ids.len(), created))
    }

    async fn extend_chain_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        chain_id: Uuid,
        horizon: NaiveDate,
    ) -> Result<usize, CoreError> {
        // Attributes come from the earliest surviving occurrence, the schedule
        // and assignees from the latest one
        let template: Task = sqlx::query_as(
            "SELECT * FROM tasks WHERE chain_id = $1 ORDER BY execute_at ASC, id ASC LIMIT 1",
        )
        .bind(chain_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Chain {} has no occurrences", chain_id)))?;

        let latest: Task = sqlx::query_as(
            "SELECT * FROM tasks WHERE chain_id = $1 ORDER BY execute_at DESC, id DESC LIMIT 1",
        )
        .bind(chain_id)
        .fetch_one(&mut **tx)
        .await?;

        let (Some(cycle), Some(until)) = (template.repeat_cycle, template.end_repeat_at) else {
            return Err(CoreError::CorruptData(format!(
                "Chain {} is missing its repeat cycle or end date",
                chain_id
            )));
        };

        let dates = plan_extension(cycle, latest.execute_at, until, horizon);
        tracing::debug!(
            %chain_id,
            latest = %latest.execute_at,
            planned = dates.len(),
            "extending chain"
        );
        if dates.is_empty() {
            return Ok(0);
        }

        let assignees: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM task_users WHERE task_id = $1 ORDER BY rowid",
        )
        .bind(latest.id)
        .fetch_all(&mut **tx)
        .await?;

        let now = Utc::now();
        for execute_at in &dates {
            let occurrence = Task {
                id: Uuid::now_v7(),
                execute_at: *execute_at,
                chain_id: Some(chain_id),
                created_at: now,
                updated_at: now,
                ..template.clone()
            };
            Self::insert_task_in_transaction(tx, &occurrence).await?;
            Self::insert_task_users_in_transaction(tx, occurrence.id, &assignees).await?;
        }

        Ok(dates.len())
    }
}
