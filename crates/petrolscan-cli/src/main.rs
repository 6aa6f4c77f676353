mod crawl;
mod query;

use clap::{Parser, Subcommand};
use petrolscan_core::{AppConfig, FuelQuality, Station};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "petrolscan")]
#[command(about = "PetrolScan fuel price ingestion")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Classify a fuel name the way a station's website renders it
    Classify {
        /// Station identifier (e.g. globus, ono)
        #[arg(long)]
        station: Station,
        /// Raw fuel name, e.g. "Natural 95 Plus"
        name: String,
    },
    /// Ingest the latest dataset of every enabled station
    Crawl {
        /// Only process this station
        #[arg(long)]
        station: Option<Station>,
        /// Use an in-memory store instead of the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show recent crawl runs
    Runs {
        /// Only show runs of this station
        #[arg(long)]
        station: Option<Station>,
        /// Maximum number of runs to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Show stored fuel prices, most recently written first
    Prices {
        /// Only show one outlet, e.g. "Globus Brno"
        #[arg(long)]
        station_name: Option<String>,
        /// Maximum number of records to show
        #[arg(long, default_value = "50")]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run(Cli::parse()).await
}

/// Dispatches a parsed command. Configuration and logging are set up only
/// for commands that touch the database or the datasets.
async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Classify { station, name }) => {
            println!("{}", classify_line(station, &name));
        }
        Some(Commands::Db {
            command: DbCommands::Ping,
        }) => {
            let config = setup()?;
            let pool = connect(&config).await?;
            petrolscan_db::health_check(&pool).await?;
            println!("database connection ok");
        }
        Some(Commands::Db {
            command: DbCommands::Migrate,
        }) => {
            let config = setup()?;
            let pool = connect(&config).await?;
            let applied = petrolscan_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Some(Commands::Crawl { station, dry_run }) => {
            let config = setup()?;
            let pool = if dry_run {
                None
            } else {
                Some(connect(&config).await?)
            };
            crawl::run_crawl(&config, pool, station).await?;
        }
        Some(Commands::Runs { station, limit }) => {
            let config = setup()?;
            let pool = connect(&config).await?;
            query::run_runs(&pool, station, limit).await?;
        }
        Some(Commands::Prices {
            station_name,
            limit,
        }) => {
            let config = setup()?;
            let pool = connect(&config).await?;
            query::run_prices(&pool, station_name.as_deref(), limit).await?;
        }
        None => println!("petrolscan: no command given, see --help"),
    }

    Ok(())
}

/// Loads configuration (including `.env`) and installs the log subscriber.
fn setup() -> anyhow::Result<AppConfig> {
    let config = petrolscan_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    Ok(config)
}

fn classify_line(station: Station, name: &str) -> String {
    let (fuel_type, fuel_quality) = petrolscan_classify::classify(station, name);
    format!(
        "{station}\t{name}\t{fuel_type}\t{}",
        fuel_quality.map_or("-", FuelQuality::as_str)
    )
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = petrolscan_db::PoolConfig::from_app_config(config);
    let pool = petrolscan_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests;
