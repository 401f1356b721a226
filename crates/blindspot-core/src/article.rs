use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bias::BiasLabel;

/// A news article loaded for one analysis run, normalized for clustering and
/// bias aggregation across outlets.
///
/// Immutable once loaded; the orchestrator owns the set for the duration of
/// a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Database id; globally unique across categories.
    pub id: i64,
    pub title: String,
    pub content: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Outlet display name exactly as ingested, e.g. `"한겨레"`.
    pub outlet: String,
    /// Lean of the outlet per the registry; `None` when the outlet is not
    /// registered.
    pub bias: Option<BiasLabel>,
    pub category: String,
}

impl Article {
    /// The label this article contributes to aggregation. Articles from
    /// unregistered outlets count as center rather than being dropped.
    #[must_use]
    pub fn effective_bias(&self) -> BiasLabel {
        self.bias.unwrap_or(BiasLabel::Center)
    }
}
