mod analyze;
mod ingest;
mod report;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "blindspot-cli")]
#[command(about = "News clustering and outlet bias analysis")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load crawled articles from a JSON file into the database
    Ingest {
        /// Path to a JSON array of raw articles
        #[arg(long)]
        file: PathBuf,
        /// Validate and count without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Cluster stored articles and aggregate outlet bias per cluster
    Analyze {
        /// Restrict the run to one category
        #[arg(long)]
        category: Option<String>,
        /// Print per-category article counts and chosen k, then exit
        #[arg(long)]
        dry_run: bool,
        /// Render the report without persisting clusters
        #[arg(long)]
        no_save: bool,
        /// Pick k per category with the elbow heuristic instead of the buckets
        #[arg(long)]
        auto_k: bool,
    },
    /// Render stored clusters as a markdown report to stdout
    Report {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,
        /// Maximum number of clusters to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Show recent analysis runs
    Status {
        /// Maximum number of runs to show
        #[arg(long, default_value = "10")]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("no command given; try `blindspot-cli --help`");
        return Ok(());
    };

    dotenvy::dotenv().ok();
    let config = blindspot_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = blindspot_db::PoolConfig::from_app_config(&config);
    let pool = blindspot_db::connect_pool(&config.database_url, pool_config).await?;
    blindspot_db::run_migrations(&pool).await?;

    match command {
        Commands::Ingest { file, dry_run } => ingest::run_ingest(&pool, &file, dry_run).await,
        Commands::Analyze {
            category,
            dry_run,
            no_save,
            auto_k,
        } => {
            analyze::run_analyze(
                &pool,
                &config,
                category.as_deref(),
                dry_run,
                no_save,
                auto_k,
            )
            .await
        }
        Commands::Report { category, limit } => {
            report::run_report(&pool, category.as_deref(), limit).await
        }
        Commands::Status { limit } => status::run_status(&pool, limit).await,
    }
}
