mod data;
mod query;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "revloc-cli")]
#[command(about = "Reseller locator command line interface")]
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
    /// Import resellers from a CSV file, replacing records with the same CNPJ
    Import {
        /// Path to the CSV file (`;` or `,` delimited)
        path: std::path::PathBuf,
    },
    /// Run an enrichment pass against the company registry
    Enrich {
        /// Prioritised, batched pass over active records only
        #[arg(long)]
        smart: bool,
        /// List the records the pass would process without calling out
        #[arg(long)]
        dry_run: bool,
    },
    /// Reopen enriched records so the next pass processes them again
    ResetEnrichment {
        /// Only reset the record with this CNPJ (any formatting)
        #[arg(long)]
        cnpj: Option<String>,
    },
    /// Find the resellers nearest to a CEP
    Search {
        /// Customer postal code (00000-000 or 00000000)
        cep: String,
        #[arg(long)]
        max_distance_km: Option<f64>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Look up a company in the CNPJ registry
    Lookup { cnpj: String },
    /// Geocode a street address
    Geocode {
        address: String,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
    },
    /// Show data-quality counters
    Stats,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("revloc-cli ready; run with --help to list commands");
        return Ok(());
    };

    let config = revloc_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            let pool = revloc_db::connect_pool_from_config(&config).await?;
            revloc_db::health_check(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let pool = revloc_db::connect_pool_from_config(&config).await?;
            let applied = revloc_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Import { path } => {
            let pool = revloc_db::connect_pool_from_config(&config).await?;
            data::run_import(&pool, &path).await?;
        }
        Commands::Enrich { smart, dry_run } => {
            let pool = revloc_db::connect_pool_from_config(&config).await?;
            data::run_enrich(&pool, &config, smart, dry_run).await?;
        }
        Commands::ResetEnrichment { cnpj } => {
            let pool = revloc_db::connect_pool_from_config(&config).await?;
            data::run_reset(&pool, &config, cnpj.as_deref()).await?;
        }
        Commands::Search {
            cep,
            max_distance_km,
            limit,
        } => {
            let pool = revloc_db::connect_pool_from_config(&config).await?;
            query::run_search(&pool, &config, cep, max_distance_km, limit).await?;
        }
        Commands::Lookup { cnpj } => query::run_lookup(&config, &cnpj).await?,
        Commands::Geocode {
            address,
            city,
            state,
        } => {
            query::run_geocode(&config, &address, city.as_deref(), state.as_deref()).await?;
        }
        Commands::Stats => {
            let pool = revloc_db::connect_pool_from_config(&config).await?;
            data::run_stats(&pool).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
