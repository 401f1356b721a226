//! `ingest` command: load crawled articles into the database.

use std::path::Path;

use blindspot_db::NewArticle;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Raw article shape produced by the crawl stage.
#[derive(Debug, Deserialize)]
struct RawArticle {
    title: String,
    content: String,
    url: String,
    outlet: String,
    category: String,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

/// Loads a JSON array of crawled articles and inserts them.
///
/// Articles with blank required fields are logged and counted as invalid;
/// duplicate URLs are skipped via the unique constraint. With `dry_run` the
/// file is validated and counted without any database writes.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a database
/// insert fails.
pub(crate) async fn run_ingest(
    pool: &sqlx::PgPool,
    file: &Path,
    dry_run: bool,
) -> anyhow::Result<()> {
    let payload = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", file.display()))?;
    let raw: Vec<RawArticle> = serde_json::from_str(&payload)
        .map_err(|e| anyhow::anyhow!("cannot parse {}: {e}", file.display()))?;

    let mut inserted = 0_usize;
    let mut duplicates = 0_usize;
    let mut invalid = 0_usize;

    for article in raw {
        let new_article = NewArticle {
            title: article.title,
            content: article.content,
            url: article.url,
            outlet: article.outlet,
            category: article.category,
            published_at: article.published_at,
        };
        if let Err(e) = new_article.validate() {
            tracing::warn!(url = %new_article.url, error = %e, "skipping invalid article");
            invalid += 1;
            continue;
        }
        if dry_run {
            inserted += 1;
            continue;
        }
        match blindspot_db::insert_article(pool, &new_article).await? {
            Some(_) => inserted += 1,
            None => duplicates += 1,
        }
    }

    if dry_run {
        println!("dry-run: {inserted} valid articles, {invalid} invalid; nothing written");
    } else {
        println!("ingested {inserted} articles, skipped {duplicates} duplicates, {invalid} invalid");
    }
    Ok(())
}
