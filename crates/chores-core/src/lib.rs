//! # Chores Core Library
//!
//! Shared household task tracking: users, groups, categories and dated task
//! occurrences, with recurring tasks materialized ahead of time as concrete rows.
//!
//! ## Recurring tasks
//!
//! A recurring task is a *chain* of occurrences sharing a `chain_id`. Creating one
//! writes every occurrence from the first execution date up to the rolling
//! horizon (the last day of the month `horizon_months` months ahead, two by
//! default). [`repository::MaterializationRepository::extend_chains`] appends the
//! missing tail of every open chain as the horizon moves forward.
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`recurrence`]: Cycle arithmetic, horizon policy and period buckets
//! - [`repository`]: Data access layer with Repository pattern
//! - [`error`]: Error types shared by every layer
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chores_core::{
//!     db,
//!     models::{MaterializationConfig, NewTaskData, RepeatCycle},
//!     recurrence::MaterializationManager,
//!     repository::{CategoryRepository, GroupRepository, SqliteRepository, TaskRepository, UserRepository},
//! };
//! use chrono::{Duration, Utc};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = db::establish_connection("chores.db").await?;
//!     let repo = SqliteRepository::new(pool, MaterializationManager::new(MaterializationConfig::default()));
//!
//!     let alice = repo.add_user("alice".to_string()).await?;
//!     let home = repo.add_group(alice.id, "Home".to_string()).await?;
//!     let kitchen = repo.add_category(alice.id, home.group.id, "Kitchen".to_string()).await?;
//!
//!     let created = repo
//!         .add_task(
//!             alice.id,
//!             NewTaskData {
//!                 category_id: kitchen.category.id,
//!                 title: "Take out the trash".to_string(),
//!                 repeat_cycle: Some(RepeatCycle::Weekly),
//!                 memo: None,
//!                 notice_available: None,
//!                 end_repeat_at: Some(Utc::now() + Duration::days(365)),
//!                 execute_at: Utc::now(),
//!                 add_user_ids: Some(vec![alice.id]),
//!             },
//!         )
//!         .await?;
//!     println!("Scheduled {} occurrences", created.occurrences.len());
//!
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod repository;
