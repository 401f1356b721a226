//! Database operations for `clusters` and `cluster_articles`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `clusters` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClusterRow {
    pub id: i64,
    /// Globally-unique `"{category}_{local_id}"` key.
    pub cluster_key: String,
    pub category: String,
    pub topic: String,
    pub summary: String,
    pub article_count: i32,
    /// The schema defines this as `NUMERIC(5,3)`.
    pub bias_score: Decimal,
    /// Full bias profile (percentages, media distribution, verdict) as JSONB.
    pub bias_profile: Value,
    pub verdict: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cluster ready for persistence.
///
/// One explicit shape with every field present, validated once at the write
/// boundary.
#[derive(Debug, Clone)]
pub struct StoredCluster {
    pub cluster_key: String,
    pub category: String,
    pub topic: String,
    pub summary: String,
    pub article_count: i32,
    pub bias_score: Decimal,
    pub bias_profile: Value,
    pub verdict: String,
}

impl StoredCluster {
    /// Check field completeness.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidCluster`] naming the first blank required
    /// field.
    pub fn validate(&self) -> Result<(), DbError> {
        let required = [
            ("cluster_key", &self.cluster_key),
            ("category", &self.category),
            ("topic", &self.topic),
            ("summary", &self.summary),
            ("verdict", &self.verdict),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DbError::InvalidCluster(format!(
                    "field '{field}' must be non-empty"
                )));
            }
        }
        if self.article_count < 0 {
            return Err(DbError::InvalidCluster(
                "article_count must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// clusters operations
// ---------------------------------------------------------------------------

/// Upserts a cluster row keyed by `cluster_key`.
///
/// Re-running a save on an existing key updates the row in place rather than
/// duplicating it; `updated_at` advances on every save.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::InvalidCluster`] if validation fails, or
/// [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_cluster(pool: &PgPool, cluster: &StoredCluster) -> Result<i64, DbError> {
    cluster.validate()?;

    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO clusters \
             (cluster_key, category, topic, summary, article_count, bias_score, \
              bias_profile, verdict) \
         VALUES ($1, $2, $3, $4, $5, $6, $7::jsonb, $8) \
         ON CONFLICT (cluster_key) DO UPDATE SET \
             category      = EXCLUDED.category, \
             topic         = EXCLUDED.topic, \
             summary       = EXCLUDED.summary, \
             article_count = EXCLUDED.article_count, \
             bias_score    = EXCLUDED.bias_score, \
             bias_profile  = EXCLUDED.bias_profile, \
             verdict       = EXCLUDED.verdict, \
             updated_at    = NOW() \
         RETURNING id",
    )
    .bind(&cluster.cluster_key)
    .bind(&cluster.category)
    .bind(&cluster.topic)
    .bind(&cluster.summary)
    .bind(cluster.article_count)
    .bind(cluster.bias_score)
    .bind(&cluster.bias_profile)
    .bind(&cluster.verdict)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Replaces the membership rows for a cluster.
///
/// Delete-then-insert inside one transaction, so a re-run replaces the old
/// membership wholesale instead of merging with it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement in the transaction fails.
pub async fn replace_cluster_articles(
    pool: &PgPool,
    cluster_key: &str,
    article_ids: &[i64],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM cluster_articles WHERE cluster_key = $1")
        .bind(cluster_key)
        .execute(&mut *tx)
        .await?;

    for article_id in article_ids {
        sqlx::query(
            "INSERT INTO cluster_articles (cluster_key, article_id) \
             VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(cluster_key)
        .bind(article_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Fetches a single cluster by its key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_cluster_by_key(
    pool: &PgPool,
    cluster_key: &str,
) -> Result<Option<ClusterRow>, DbError> {
    let row = sqlx::query_as::<_, ClusterRow>(
        "SELECT id, cluster_key, category, topic, summary, article_count, bias_score, \
                bias_profile, verdict, created_at, updated_at \
         FROM clusters \
         WHERE cluster_key = $1",
    )
    .bind(cluster_key)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the most recently updated clusters, optionally restricted to one
/// category.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_clusters(
    pool: &PgPool,
    category: Option<&str>,
    limit: i64,
) -> Result<Vec<ClusterRow>, DbError> {
    let rows = match category {
        Some(category) => {
            sqlx::query_as::<_, ClusterRow>(
                "SELECT id, cluster_key, category, topic, summary, article_count, bias_score, \
                        bias_profile, verdict, created_at, updated_at \
                 FROM clusters \
                 WHERE category = $1 \
                 ORDER BY updated_at DESC, id DESC \
                 LIMIT $2",
            )
            .bind(category)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ClusterRow>(
                "SELECT id, cluster_key, category, topic, summary, article_count, bias_score, \
                        bias_profile, verdict, created_at, updated_at \
                 FROM clusters \
                 ORDER BY updated_at DESC, id DESC \
                 LIMIT $1",
            )
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}

/// Returns the member article ids for a cluster, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_cluster_article_ids(
    pool: &PgPool,
    cluster_key: &str,
) -> Result<Vec<i64>, DbError> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT article_id FROM cluster_articles \
         WHERE cluster_key = $1 \
         ORDER BY article_id",
    )
    .bind(cluster_key)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}
