use chores_core::db;
use chores_core::error::CoreError;
use chores_core::recurrence::MaterializationManager;
use chores_core::repository::SqliteRepository;
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use util::resolve_actor;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let config = match config::Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Invalid configuration: {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    tracing::debug!(
        database = %config.database_path,
        horizon_months = config.materialization.horizon_months,
        "configuration loaded"
    );
    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let materialization_manager = MaterializationManager::new((&config.materialization).into());
    let repository = SqliteRepository::new(db_pool.clone(), materialization_manager);

    let result = run(&repository, &config, cli).await;
    db_pool.close().await;

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

async fn run(repository: &SqliteRepository, config: &config::Config, cli: cli::Cli) -> anyhow::Result<()> {
    let json = cli.json;
    let actor_name = cli.user.as_deref().or(config.user.as_deref());

    match cli.command {
        cli::Commands::User(command) => commands::user::user_command(repository, command, json).await,
        cli::Commands::Extend => commands::extend::extend_chains(repository, json).await,
        cli::Commands::Group(command) => {
            let actor = resolve_actor(repository, actor_name).await?;
            commands::group::group_command(repository, &actor, command, json).await
        }
        cli::Commands::Category(command) => {
            let actor = resolve_actor(repository, actor_name).await?;
            commands::category::category_command(repository, &actor, command, json).await
        }
        cli::Commands::Add(command) => {
            let actor = resolve_actor(repository, actor_name).await?;
            commands::add::add_task(repository, &actor, command, json).await
        }
        cli::Commands::List(command) => {
            let actor = resolve_actor(repository, actor_name).await?;
            commands::list::list_tasks(repository, &actor, command, json).await
        }
        cli::Commands::Show(command) => {
            let actor = resolve_actor(repository, actor_name).await?;
            commands::show::show_task(repository, &actor, command, json).await
        }
        cli::Commands::Edit(command) => {
            let actor = resolve_actor(repository, actor_name).await?;
            commands::edit::edit_task(repository, &actor, command, json).await
        }
        cli::Commands::Delete(command) => {
            let actor = resolve_actor(repository, actor_name).await?;
            commands::delete::delete_task(repository, &actor, command).await
        }
        cli::Commands::Done(command) => {
            let actor = resolve_actor(repository, actor_name).await?;
            commands::done::set_completion(repository, &actor, command, true, json).await
        }
        cli::Commands::Undo(command) => {
            let actor = resolve_actor(repository, actor_name).await?;
            commands::done::set_completion(repository, &actor, command, false, json).await
        }
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::Forbidden(s) => {
                eprintln!("{} Not allowed: {}", "Error:".style(error_style), s.yellow());
            }
            CoreError::AmbiguousId(tasks) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, title) in tasks {
                    eprintln!("  {} ({})", id.yellow(), title);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::Duplicate(s) => {
                eprintln!("{} {} already exists", "Error:".style(error_style), s.yellow());
            }
            CoreError::Database(_) if core_error.is_unique_violation() => {
                eprintln!(
                    "{} Another occurrence of this task is already scheduled at that time",
                    "Error:".style(error_style)
                );
            }
            CoreError::Database(inner) => {
                eprintln!("{} Database error: {}", "Error:".style(error_style), inner);
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
