use anyhow::Result;
use chores_core::repository::Repository;
use owo_colors::OwoColorize;

use crate::views::print_json;

pub async fn extend_chains(repo: &(impl Repository + Sync), json: bool) -> Result<()> {
    let summary = match repo.extend_chains().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "extend run aborted, nothing was written");
            return Err(e.into());
        }
    };
    tracing::debug!(
        chains = summary.chains_processed,
        created = summary.occurrences_created,
        "extend run committed"
    );

    if json {
        return print_json(&summary);
    }

    let horizon = summary
        .horizon
        .map(|h| h.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{} Extended {} recurring tasks with {} occurrences through {} ({} ms)",
        "✓".green().bold(),
        summary.chains_processed,
        summary.occurrences_created,
        horizon.cyan(),
        summary.duration_ms
    );

    Ok(())
}
