//! Operational CLI for the catalog service: run migrations, or run an
//! import from a local file or a remote URL without going through HTTP.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Catalog admin command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run pending database migrations.
    Migrate,
    /// Import a spreadsheet into the catalog.
    Import(ImportArgs),
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct ImportArgs {
    /// Path to a local spreadsheet file.
    #[arg(long)]
    file: Option<PathBuf>,
    /// URL of a remote spreadsheet file.
    #[arg(long)]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = catalog_core::load_app_config_from_env()?;
    let pool_config = catalog_db::PoolConfig::from_app_config(&config);
    let pool = catalog_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Migrate => {
            let applied = catalog_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Import(args) => {
            let outcome = if let Some(path) = args.file {
                let bytes = std::fs::read(&path)?;
                catalog_import::import_file_bytes(&pool, &bytes).await?
            } else if let Some(url) = args.url {
                let fetcher = catalog_import::RemoteFetcher::new(
                    config.fetch_timeout_secs,
                    &config.fetch_user_agent,
                )?;
                catalog_import::import_remote(&pool, &fetcher, &url).await?
            } else {
                // clap's arg group guarantees one of the two is present.
                unreachable!("clap enforces --file or --url");
            };
            println!("imported {} row(s)", outcome.rows_imported);
        }
    }

    Ok(())
}
