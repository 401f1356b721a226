use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub outlets_path: PathBuf,
    pub report_dir: PathBuf,
    pub embedding_url: String,
    pub summarizer_url: String,
    pub summarizer_api_key: Option<String>,
    pub summarizer_model: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("outlets_path", &self.outlets_path)
            .field("report_dir", &self.report_dir)
            .field("database_url", &"[redacted]")
            .field("embedding_url", &self.embedding_url)
            .field("summarizer_url", &self.summarizer_url)
            .field(
                "summarizer_api_key",
                &self.summarizer_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("summarizer_model", &self.summarizer_model)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}
