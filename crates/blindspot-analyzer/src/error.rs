use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("summarizer error: {0}")]
    Summarizer(String),

    #[error("clustering error: {0}")]
    Clustering(String),

    #[error("invalid clustering input: {0}")]
    InvalidInput(String),
}
