//! Markdown rendering for analysis reports, fresh or from storage.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use blindspot_analyzer::{lean_summary, BiasProfile, Report};
use chrono::Utc;

/// Per-cluster fields every rendered section needs, whether the cluster
/// comes from a fresh run or from storage.
struct ClusterSection<'a> {
    key: &'a str,
    topic: &'a str,
    summary: &'a str,
    keywords: Option<&'a str>,
    category: &'a str,
    article_count: usize,
    /// Raw member counts per label in `[left, center, right]` order.
    label_counts: [usize; 3],
    profile: &'a BiasProfile,
    article_ids: &'a [i64],
}

/// Renders a full analysis report as markdown.
pub(crate) fn render_markdown(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Blindspot Analysis Report");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "**Generated**: {}",
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out, "**Clusters**: {}", report.clusters.len());
    let _ = writeln!(out, "**Articles analyzed**: {}", report.article_ids.len());
    let _ = writeln!(out);
    let _ = writeln!(out, "---");

    for cluster in &report.clusters {
        push_cluster_section(
            &mut out,
            &ClusterSection {
                key: &cluster.key,
                topic: &cluster.topic,
                summary: &cluster.summary,
                keywords: cluster.keywords.as_deref(),
                category: &cluster.category,
                article_count: cluster.article_count,
                label_counts: cluster.label_counts,
                profile: &cluster.profile,
                article_ids: &cluster.article_ids,
            },
        );
    }

    out
}

fn push_cluster_section(out: &mut String, section: &ClusterSection<'_>) {
    let _ = writeln!(out);
    let _ = writeln!(out, "### {}", section.key);
    let _ = writeln!(out);
    let _ = writeln!(out, "**Topic**: {}", section.topic);
    let _ = writeln!(out, "**Summary**: {}", section.summary);
    if let Some(keywords) = section.keywords {
        let _ = writeln!(out, "**Keywords**: {keywords}");
    }
    let _ = writeln!(
        out,
        "**Category**: {} | **Articles**: {}",
        section.category, section.article_count
    );
    let _ = writeln!(out);

    // Outlets by descending article count, name breaking ties.
    let mut outlets: Vec<(&str, i64)> = section
        .profile
        .media_distribution
        .iter()
        .map(|(name, count)| (name.as_str(), *count))
        .collect();
    outlets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let outlet_list = outlets
        .iter()
        .map(|(name, count)| format!("{name} ({count})"))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "**Outlets**: {outlet_list}");

    let [left, center, right] = section.label_counts;
    let _ = writeln!(
        out,
        "**Bias**: left {left} ({}%) | center {center} ({}%) | right {right} ({}%)",
        section.profile.left_pct, section.profile.center_pct, section.profile.right_pct
    );
    let _ = writeln!(
        out,
        "**Bias score**: {:.3}, {}",
        section.profile.bias_score,
        lean_summary(section.profile.bias_score, left, center, right)
    );
    let _ = writeln!(out, "**Verdict**: {}", section.profile.verdict);

    let ids = section
        .article_ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "**Member ids**: {ids}");
    let _ = writeln!(out);
    let _ = writeln!(out, "---");
}

/// Writes the rendered report under `dir` as
/// `blindspot_analysis_{YYYYMMDD_HHMMSS}.md`, creating the directory.
///
/// A report with no clusters writes nothing and returns `None`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub(crate) fn write_report(report: &Report, dir: &Path) -> anyhow::Result<Option<PathBuf>> {
    if report.clusters.is_empty() {
        return Ok(None);
    }

    std::fs::create_dir_all(dir)
        .map_err(|e| anyhow::anyhow!("cannot create report dir {}: {e}", dir.display()))?;
    let filename = format!(
        "blindspot_analysis_{}.md",
        report.generated_at.format("%Y%m%d_%H%M%S")
    );
    let path = dir.join(filename);
    std::fs::write(&path, render_markdown(report))
        .map_err(|e| anyhow::anyhow!("cannot write report {}: {e}", path.display()))?;
    Ok(Some(path))
}

/// Re-renders stored clusters to stdout as markdown, most recently updated
/// first.
///
/// # Errors
///
/// Returns an error if a database query fails. A cluster whose stored bias
/// profile no longer parses is logged and skipped.
pub(crate) async fn run_report(
    pool: &sqlx::PgPool,
    category: Option<&str>,
    limit: i64,
) -> anyhow::Result<()> {
    let clusters = blindspot_db::list_clusters(pool, category, limit).await?;
    if clusters.is_empty() {
        println!("no stored clusters; run `analyze` first");
        return Ok(());
    }

    let total_articles: i64 = clusters.iter().map(|c| i64::from(c.article_count)).sum();

    let mut out = String::new();
    let _ = writeln!(out, "# Blindspot Analysis Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "**Generated**: {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "**Clusters**: {}", clusters.len());
    let _ = writeln!(out, "**Articles analyzed**: {total_articles}");
    let _ = writeln!(out);
    let _ = writeln!(out, "---");

    for cluster in &clusters {
        let profile: BiasProfile = match serde_json::from_value(cluster.bias_profile.clone()) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(
                    cluster_key = %cluster.cluster_key,
                    error = %e,
                    "stored bias profile no longer parses, skipping cluster"
                );
                continue;
            }
        };
        let article_ids =
            blindspot_db::list_cluster_article_ids(pool, &cluster.cluster_key).await?;

        push_cluster_section(
            &mut out,
            &ClusterSection {
                key: &cluster.cluster_key,
                topic: &cluster.topic,
                summary: &cluster.summary,
                keywords: None,
                category: &cluster.category,
                article_count: usize::try_from(cluster.article_count).unwrap_or(0),
                label_counts: derived_label_counts(cluster.article_count, &profile),
                profile: &profile,
                article_ids: &article_ids,
            },
        );
    }

    print!("{out}");
    Ok(())
}

/// Approximates raw label counts for a stored cluster from its corrected
/// percentages. Fresh runs carry exact counts; storage only keeps the
/// percentages.
fn derived_label_counts(article_count: i32, profile: &BiasProfile) -> [usize; 3] {
    let total = i64::from(article_count);
    [profile.left_pct, profile.center_pct, profile.right_pct]
        .map(|pct| usize::try_from(total * i64::from(pct) / 100).unwrap_or(0))
}
