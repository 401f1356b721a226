//! Database operations for `articles`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use blindspot_core::{Article, BiasLabel};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub url: String,
    pub outlet: String,
    pub category: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ArticleRow {
    /// Convert to the analyzer's input type, attaching the outlet's lean as
    /// resolved by the caller from the registry.
    #[must_use]
    pub fn into_article(self, bias: Option<BiasLabel>) -> Article {
        Article {
            id: self.id,
            title: self.title,
            content: self.content,
            url: self.url,
            published_at: self.published_at,
            outlet: self.outlet,
            bias,
            category: self.category,
        }
    }
}

/// An article ready for insertion.
///
/// One explicit shape with every field present; [`NewArticle::validate`] runs
/// once at the write boundary, so writers never branch on which calling form
/// was used.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub url: String,
    pub outlet: String,
    pub category: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewArticle {
    /// Check field completeness.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidArticle`] naming the first blank required
    /// field.
    pub fn validate(&self) -> Result<(), DbError> {
        let required = [
            ("title", &self.title),
            ("content", &self.content),
            ("url", &self.url),
            ("outlet", &self.outlet),
            ("category", &self.category),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DbError::InvalidArticle(format!(
                    "field '{field}' must be non-empty"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// articles operations
// ---------------------------------------------------------------------------

/// Inserts an article, skipping duplicates by URL.
///
/// Returns `None` when a row with the same `url` already exists (the insert
/// is a no-op in that case).
///
/// # Errors
///
/// Returns [`DbError::InvalidArticle`] if validation fails, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_article(
    pool: &PgPool,
    article: &NewArticle,
) -> Result<Option<ArticleRow>, DbError> {
    article.validate()?;

    let row = sqlx::query_as::<_, ArticleRow>(
        "INSERT INTO articles (title, content, url, outlet, category, published_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (url) DO NOTHING \
         RETURNING id, title, content, url, outlet, category, published_at, created_at",
    )
    .bind(&article.title)
    .bind(&article.content)
    .bind(&article.url)
    .bind(&article.outlet)
    .bind(&article.category)
    .bind(article.published_at)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns articles for analysis, optionally restricted to one category,
/// ordered by `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_articles(
    pool: &PgPool,
    category: Option<&str>,
) -> Result<Vec<ArticleRow>, DbError> {
    let rows = match category {
        Some(category) => {
            sqlx::query_as::<_, ArticleRow>(
                "SELECT id, title, content, url, outlet, category, published_at, created_at \
                 FROM articles \
                 WHERE category = $1 \
                 ORDER BY id",
            )
            .bind(category)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ArticleRow>(
                "SELECT id, title, content, url, outlet, category, published_at, created_at \
                 FROM articles \
                 ORDER BY id",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}
