//! `analyze` command: run the clustering pipeline and persist the results.

use blindspot_analyzer::{
    bucketed_cluster_count, partition_by_category, run_analysis, AnalysisInput,
    ClusterCountPolicy, EmbeddingClient, ReportCluster, SummarizerClient, MIN_ARTICLES,
};
use blindspot_core::{AppConfig, Article};
use blindspot_db::StoredCluster;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Runs the full analysis pipeline over stored articles.
///
/// Loads articles (all or one category), resolves outlet bias labels from
/// the registry, clusters each category, persists surviving clusters and
/// memberships, records an analysis run, and writes the markdown report.
///
/// With `no_save` the report is still written but no clusters are persisted.
/// With `dry_run` only the per-category article counts and chosen `k` are
/// printed, before any network call or write.
///
/// # Errors
///
/// Returns an error when loading inputs or run bookkeeping fails.
/// Per-cluster persistence failures are logged and skipped.
pub(crate) async fn run_analyze(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    category: Option<&str>,
    dry_run: bool,
    no_save: bool,
    auto_k: bool,
) -> anyhow::Result<()> {
    let outlets = blindspot_core::load_outlets(&config.outlets_path)?;
    let registry = outlets.registry();

    let rows = blindspot_db::list_articles(pool, category).await?;
    if rows.is_empty() {
        println!("no articles to analyze; run `ingest` first");
        return Ok(());
    }

    let articles: Vec<Article> = rows
        .into_iter()
        .map(|row| {
            let bias = registry.bias_of(&row.outlet);
            row.into_article(bias)
        })
        .collect();

    if dry_run {
        println!("dry-run: {} articles loaded", articles.len());
        for (category, members) in partition_by_category(&articles) {
            let n = members.len();
            if n < MIN_ARTICLES {
                println!("  {category}: {n} articles (below minimum, will skip)");
            } else if auto_k {
                println!("  {category}: {n} articles, k = auto (elbow)");
            } else {
                println!(
                    "  {category}: {n} articles, k = {}",
                    bucketed_cluster_count(n).min(n)
                );
            }
        }
        return Ok(());
    }

    let embeddings = EmbeddingClient::new(&config.embedding_url, config.http_timeout_secs)
        .map_err(|e| anyhow::anyhow!("failed to build embedding client: {e}"))?;
    let summarizer = SummarizerClient::new(
        &config.summarizer_url,
        config.summarizer_api_key.as_deref(),
        &config.summarizer_model,
        config.http_timeout_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build summarizer client: {e}"))?;

    let run = blindspot_db::create_analysis_run(pool, "cli").await?;
    if let Err(e) = blindspot_db::start_analysis_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }

    let policy = if auto_k {
        ClusterCountPolicy::Elbow
    } else {
        ClusterCountPolicy::Bucketed
    };
    let input = AnalysisInput { articles, policy };
    let report = match run_analysis(&input, &embeddings, &summarizer).await {
        Ok(report) => report,
        Err(e) => {
            fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
            return Err(e.into());
        }
    };

    let mut saved: i32 = 0;
    if no_save {
        println!("--no-save: skipping cluster persistence");
    } else {
        for cluster in &report.clusters {
            if let Err(e) = persist_cluster(pool, cluster).await {
                tracing::error!(
                    cluster_key = %cluster.key,
                    error = %e,
                    "failed to persist cluster, continuing"
                );
                continue;
            }
            saved = saved.saturating_add(1);
        }
    }

    // The in-memory report renders even when cluster persistence had
    // failures; a report IO problem is logged rather than failing the run.
    match crate::report::write_report(&report, &config.report_dir) {
        Ok(Some(path)) => println!("report written to {}", path.display()),
        Ok(None) => println!("no clusters survived; no report written"),
        Err(e) => tracing::error!(error = %e, "failed to write report file"),
    }

    let analyzed = i32::try_from(report.article_ids.len()).unwrap_or(i32::MAX);
    if let Err(e) = blindspot_db::complete_analysis_run(pool, run.id, saved, analyzed).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }

    println!(
        "analyzed {} articles into {} clusters ({saved} saved)",
        report.article_ids.len(),
        report.clusters.len()
    );
    Ok(())
}

/// Converts one surviving cluster into its storage shape and saves it with
/// its membership.
async fn persist_cluster(pool: &sqlx::PgPool, cluster: &ReportCluster) -> anyhow::Result<()> {
    let stored = StoredCluster {
        cluster_key: cluster.key.clone(),
        category: cluster.category.clone(),
        topic: cluster.topic.clone(),
        summary: cluster.summary.clone(),
        article_count: i32::try_from(cluster.article_count).unwrap_or(i32::MAX),
        bias_score: Decimal::from_f64(cluster.profile.bias_score).unwrap_or(Decimal::ZERO),
        bias_profile: serde_json::to_value(&cluster.profile)?,
        verdict: cluster.profile.verdict.as_str().to_string(),
    };
    blindspot_db::upsert_cluster(pool, &stored).await?;
    blindspot_db::replace_cluster_articles(pool, &cluster.key, &cluster.article_ids).await?;
    Ok(())
}

/// Attempts to mark an analysis run as failed, logging any secondary error.
async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, message: String) {
    if let Err(mark_err) = blindspot_db::fail_analysis_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark analysis run as failed"
        );
    }
}
