//! `status` command: recent analysis runs.

/// Shows recent analysis runs, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_status(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = blindspot_db::list_analysis_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no analysis runs recorded; run `analyze` first");
        return Ok(());
    }

    let header = format!(
        "{:<6}{:<38}{:<8}{:<11}{:<10}{:<10}STARTED",
        "ID", "PUBLIC ID", "SOURCE", "STATUS", "CLUSTERS", "ARTICLES"
    );
    println!("{header}");
    for run in &runs {
        let started = run.started_at.map_or_else(
            || "\u{2014}".to_string(),
            |t| t.format("%Y-%m-%d %H:%M").to_string(),
        );
        println!(
            "{:<6}{:<38}{:<8}{:<11}{:<10}{:<10}{}",
            run.id,
            run.public_id,
            run.trigger_source,
            run.status,
            run.clusters_saved,
            run.articles_analyzed,
            started
        );
        if let Some(ref error) = run.error_message {
            println!("      error: {error}");
        }
    }

    Ok(())
}
