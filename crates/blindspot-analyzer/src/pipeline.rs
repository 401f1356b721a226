//! Run orchestration: per-category clustering merged into one report.

use std::collections::{BTreeMap, BTreeSet};

use blindspot_core::Article;
use chrono::{DateTime, Utc};

use crate::bias::{aggregate_bias, label_counts, BiasProfile};
use crate::cluster::{fit_kmeans, KMEANS_SEED};
use crate::embeddings::EmbeddingClient;
use crate::error::AnalyzerError;
use crate::selector::{
    bucketed_cluster_count, elbow_cluster_count, ClusterCountPolicy, DEFAULT_ELBOW_MAX_K,
};
use crate::summarizer::SummarizerClient;
use crate::text::prepare_text;

/// Minimum articles a category needs before it is clustered at all.
pub const MIN_ARTICLES: usize = 3;

/// Input of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub articles: Vec<Article>,
    pub policy: ClusterCountPolicy,
}

impl AnalysisInput {
    /// Checks every article carries the fields the pipeline depends on.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::InvalidInput`] naming the first offending
    /// article id when a title or category is blank.
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        for article in &self.articles {
            if article.title.trim().is_empty() {
                return Err(AnalyzerError::InvalidInput(format!(
                    "article {} has a blank title",
                    article.id
                )));
            }
            if article.category.trim().is_empty() {
                return Err(AnalyzerError::InvalidInput(format!(
                    "article {} has a blank category",
                    article.id
                )));
            }
        }
        Ok(())
    }
}

/// One surviving cluster, keyed for the merged report.
#[derive(Debug, Clone)]
pub struct ReportCluster {
    /// Globally unique `"{category}_{local_id}"` key.
    pub key: String,
    pub category: String,
    /// Partition label within the category, `0..k`.
    pub local_id: usize,
    pub topic: String,
    pub summary: String,
    pub keywords: Option<String>,
    pub article_count: usize,
    pub article_ids: Vec<i64>,
    /// Raw member counts per label in `[left, center, right]` order.
    pub label_counts: [usize; 3],
    pub centroid: Vec<f32>,
    pub profile: BiasProfile,
}

/// Clusters produced from a single category, isolated until the merge.
#[derive(Debug, Clone)]
pub struct CategoryOutcome {
    pub category: String,
    pub clusters: Vec<ReportCluster>,
}

/// Merged artifact of one full run.
#[derive(Debug, Clone)]
pub struct Report {
    /// Surviving clusters in category order, local-id order within each.
    pub clusters: Vec<ReportCluster>,
    /// Every article id that contributed to a surviving cluster.
    pub article_ids: BTreeSet<i64>,
    pub generated_at: DateTime<Utc>,
}

/// Groups articles by exact category string, iterable in sorted order.
#[must_use]
pub fn partition_by_category(articles: &[Article]) -> BTreeMap<&str, Vec<&Article>> {
    let mut by_category: BTreeMap<&str, Vec<&Article>> = BTreeMap::new();
    for article in articles {
        by_category
            .entry(article.category.as_str())
            .or_default()
            .push(article);
    }
    by_category
}

/// Runs the full analysis over every category in the input.
///
/// Categories are processed independently in sorted order. A category below
/// [`MIN_ARTICLES`], or one whose embedding or clustering fails, is logged
/// and skipped; the rest of the run proceeds. Clusters without a usable
/// summary are dropped. Whatever survives is merged into one [`Report`]
/// under globally unique cluster keys.
///
/// # Errors
///
/// Returns [`AnalyzerError::InvalidInput`] only when the input itself fails
/// validation. Upstream service failures never abort the run.
pub async fn run_analysis(
    input: &AnalysisInput,
    embeddings: &EmbeddingClient,
    summarizer: &SummarizerClient,
) -> Result<Report, AnalyzerError> {
    input.validate()?;

    let mut clusters = Vec::new();
    let mut article_ids = BTreeSet::new();
    for (category, members) in partition_by_category(&input.articles) {
        let Some(outcome) =
            analyze_category(category, &members, input.policy, embeddings, summarizer).await
        else {
            continue;
        };
        for cluster in &outcome.clusters {
            article_ids.extend(cluster.article_ids.iter().copied());
        }
        clusters.extend(outcome.clusters);
    }

    Ok(Report {
        clusters,
        article_ids,
        generated_at: Utc::now(),
    })
}

/// Clusters one category's articles. `None` means the category was skipped.
async fn analyze_category(
    category: &str,
    members: &[&Article],
    policy: ClusterCountPolicy,
    embeddings: &EmbeddingClient,
    summarizer: &SummarizerClient,
) -> Option<CategoryOutcome> {
    let n = members.len();
    if n < MIN_ARTICLES {
        tracing::info!(category = %category, articles = n, "category below minimum, skipping");
        return None;
    }

    let texts: Vec<String> = members
        .iter()
        .map(|a| prepare_text(&a.title, &a.content))
        .collect();
    let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let vectors = match embeddings.embed(&text_refs).await {
        Ok(vectors) => vectors,
        Err(e) => {
            tracing::warn!(category = %category, error = %e, "embedding failed, skipping category");
            return None;
        }
    };

    let k = match policy {
        ClusterCountPolicy::Bucketed => bucketed_cluster_count(n),
        ClusterCountPolicy::Elbow => {
            match elbow_cluster_count(&vectors, DEFAULT_ELBOW_MAX_K, KMEANS_SEED) {
                Ok(k) => k,
                Err(e) => {
                    tracing::warn!(category = %category, error = %e, "elbow selection failed, skipping category");
                    return None;
                }
            }
        }
    };
    // Clusters of size 0 are invalid, so k never exceeds the article count.
    let k = k.min(n);

    let partition = match fit_kmeans(&vectors, k, KMEANS_SEED) {
        Ok(partition) => partition,
        Err(e) => {
            tracing::warn!(category = %category, error = %e, "clustering failed, skipping category");
            return None;
        }
    };

    let mut clusters = Vec::new();
    for (local_id, indices) in group_indices(&partition.labels, k).into_iter().enumerate() {
        if indices.is_empty() {
            continue;
        }

        let group: Vec<&Article> = indices.iter().map(|&i| members[i]).collect();
        let titles: Vec<&str> = group.iter().map(|a| a.title.as_str()).collect();
        let digest = summarizer.summarize(&titles, local_id).await;
        let Some(summary) = digest.summary else {
            tracing::warn!(category = %category, local_id, "no usable summary, dropping cluster");
            continue;
        };

        let profile = aggregate_bias(&group);
        clusters.push(ReportCluster {
            key: format!("{category}_{local_id}"),
            category: category.to_string(),
            local_id,
            topic: digest.topic,
            summary,
            keywords: digest.keywords,
            article_count: group.len(),
            article_ids: group.iter().map(|a| a.id).collect(),
            label_counts: label_counts(&group),
            centroid: partition.centroids[local_id].clone(),
            profile,
        });
    }

    tracing::info!(
        category = %category,
        articles = n,
        k,
        clusters = clusters.len(),
        "category analyzed"
    );
    Some(CategoryOutcome {
        category: category.to_string(),
        clusters,
    })
}

/// Bins observation indices by partition label. Labels are `0..k` by
/// construction of the fit.
fn group_indices(labels: &[usize], k: usize) -> Vec<Vec<usize>> {
    let mut groups = vec![Vec::new(); k];
    for (i, &label) in labels.iter().enumerate() {
        groups[label].push(i);
    }
    groups
}
