//! Clustering and bias analysis pipeline for Blindspot.
//!
//! Partitions ingested articles by category, embeds them via a TEI service,
//! groups each category with seeded k-means, summarizes every cluster through
//! an OpenAI-compatible endpoint, and aggregates outlet bias labels into a
//! per-cluster profile. The merged [`Report`] feeds the markdown renderer and
//! the cluster store.

pub mod bias;
pub mod cluster;
pub mod embeddings;
pub mod error;
pub mod pipeline;
pub mod selector;
pub mod summarizer;
pub mod text;

pub use bias::{aggregate_bias, label_counts, lean_summary, BiasProfile};
pub use cluster::{fit_kmeans, KmeansPartition, KMEANS_SEED};
pub use embeddings::EmbeddingClient;
pub use error::AnalyzerError;
pub use pipeline::{
    partition_by_category, run_analysis, AnalysisInput, CategoryOutcome, Report, ReportCluster,
    MIN_ARTICLES,
};
pub use selector::{
    bucketed_cluster_count, elbow_cluster_count, ClusterCountPolicy, DEFAULT_ELBOW_MAX_K,
};
pub use summarizer::{SummarizerClient, TopicDigest};
pub use text::prepare_text;
