//! keyscout CLI - infer implicit keys of a relational database
//!
//! Usage:
//!   keyscout discover [--db <path>] [--output <dir>]
//!   keyscout show <verified_relationships.csv>
//!   keyscout ddl <output-dir> [--dialect <dialect>]
//!   keyscout cache <stats|clear>
//!
//! Examples:
//!   keyscout discover --db shop.db --output out
//!   keyscout show out/verified_relationships.csv
//!   keyscout ddl out --dialect mysql

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use keyscout::cache::{connection_hash, MetadataCache};
use keyscout::config::Settings;
use keyscout::discovery::{
    describe_tables, DiscoveryPipeline, OfflineRater, RelationshipRater, TableDescriber,
};
use keyscout::llm::OpenAiClient;
use keyscout::logging::{init_logging, LogConfig, LogFormat};
use keyscout::metadata::SchemaIntrospector;
use keyscout::report::persist::{
    read_catalog, write_catalog, write_descriptions, COLUMNS_FILE, DDL_FILE, DESCRIPTIONS_FILE,
    RELATIONSHIPS_FILE,
};
use keyscout::report::{column_catalog, generate_ddl, Report};
use keyscout::source::connect;
use keyscout::sql::Dialect;

#[derive(Parser)]
#[command(name = "keyscout")]
#[command(about = "keyscout - infer primary and foreign keys from names, data and a language model")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (defaults to KEYSCOUT_CONFIG, ./keyscout.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, default_value = "pretty", global = true)]
    log_format: LogFormat,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover keys and write the report files
    Discover {
        /// Database path (overrides [source].path)
        #[arg(long)]
        db: Option<String>,

        /// Datasource driver (overrides [source].driver)
        #[arg(long)]
        driver: Option<String>,

        /// Output directory (overrides [output].directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the language model entirely
        #[arg(long)]
        offline: bool,

        /// Do not write table descriptions
        #[arg(long)]
        no_describe: bool,
    },

    /// Summarise a saved relationships report
    Show {
        /// Path to verified_relationships.csv
        file: PathBuf,
    },

    /// Regenerate create_tables.sql from saved report files
    Ddl {
        /// Directory holding verified_relationships.csv and table_columns.csv
        dir: PathBuf,

        /// SQL dialect to generate (defaults to the configured driver)
        #[arg(short, long)]
        dialect: Option<DialectArg>,
    },

    /// Inspect or clear the description cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Print the number of cached entries
    Stats,
    /// Remove cached entries
    Clear {
        /// Only entries of the configured source
        #[arg(long)]
        current: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Sqlite,
    Mysql,
    Postgres,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Postgres => Dialect::Postgres,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(cli.log_format)
        .with_ansi(cli.log_file.is_none())
        .with_log_file(cli.log_file.clone());
    if let Err(e) = init_logging(&log_config) {
        eprintln!("Error: failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };

    match cli.command {
        Commands::Discover {
            db,
            driver,
            output,
            offline,
            no_describe,
        } => {
            let mut settings = settings;
            if let Some(db) = db {
                settings.source.path = db;
            }
            if let Some(driver) = driver {
                settings.source.driver = driver;
            }
            if let Some(output) = output {
                settings.output.directory = output;
            }
            if offline {
                settings.llm.enabled = false;
            }
            if no_describe {
                settings.llm.describe_tables = false;
            }
            cmd_discover(&settings).await
        }
        Commands::Show { file } => cmd_show(&file),
        Commands::Ddl { dir, dialect } => {
            let dialect = dialect
                .map(Dialect::from)
                .or_else(|| Dialect::parse(&settings.source.driver))
                .unwrap_or_default();
            cmd_ddl(&dir, dialect)
        }
        Commands::Cache { action } => cmd_cache(&settings, action),
    }
}

async fn cmd_discover(settings: &Settings) -> Result<()> {
    let path = settings.source.resolved_path()?;
    let source = connect(&settings.source.driver, &path)
        .with_context(|| format!("failed to open {} source '{}'", settings.source.driver, path))?;
    let dialect = source.dialect();

    let client = if settings.llm.enabled {
        let llm = &settings.llm;
        Some(OpenAiClient::new(
            llm.resolved_api_key()?,
            llm.model.clone(),
            llm.base_url.clone(),
        )?)
    } else {
        None
    };
    let offline = OfflineRater;
    let rater: &dyn RelationshipRater = match &client {
        Some(c) => c,
        None => &offline,
    };

    let outcome = DiscoveryPipeline::new(source.as_ref(), rater, settings.discovery_config())
        .run()
        .await?;
    let report = Report::assemble(&outcome);

    let out_dir = &settings.output.directory;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    report.write_csv(out_dir.join(RELATIONSHIPS_FILE))?;

    let tables = SchemaIntrospector::new(source.as_ref()).catalog().await?;
    let catalog = column_catalog(&tables);
    write_catalog(out_dir.join(COLUMNS_FILE), &catalog)?;

    if let Some(client) = client.as_ref().filter(|_| settings.llm.describe_tables) {
        let cache = open_cache(settings);
        let describer: &dyn TableDescriber = client;
        let descriptions =
            describe_tables(source.as_ref(), describer, cache.as_ref(), settings.llm.sample_rows)
                .await?;
        write_descriptions(out_dir.join(DESCRIPTIONS_FILE), &descriptions)?;
    }

    fs::write(out_dir.join(DDL_FILE), generate_ddl(&catalog, &report, dialect))?;

    info!(
        output = %out_dir.display(),
        verified = outcome.verified_count(),
        untracked = outcome.untracked_tables.len(),
        "discovery written"
    );
    println!(
        "{} verified relationship(s), {} untracked table(s) -> {}",
        outcome.verified_count(),
        outcome.untracked_tables.len(),
        out_dir.display()
    );
    Ok(())
}

fn open_cache(settings: &Settings) -> Option<MetadataCache> {
    if !settings.cache.enabled {
        return None;
    }
    match MetadataCache::open(settings.cache.path.as_deref()) {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!(error = %e, "description cache unavailable");
            None
        }
    }
}

fn cmd_show(file: &Path) -> Result<()> {
    let report = Report::read_csv(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let outcome = report.reconstruct();

    println!("Report: {}", file.display());
    println!("  PK candidates:  {}", outcome.pk_candidates.len());
    println!("  FK candidates:  {}", outcome.fk_candidates.len());
    println!("  Untracked:      {}", outcome.untracked_tables.len());
    println!();

    if outcome.matches.is_empty() {
        println!("No verified relationships.");
    } else {
        println!("Verified relationships:");
        for (m, stats) in outcome.verified() {
            println!(
                "  {}  (coverage {:.1}%, nulls {:.1}%)",
                m, stats.coverage_percent, stats.null_percentage
            );
        }
    }

    if !outcome.untracked_tables.is_empty() {
        println!();
        println!("Untracked tables:");
        for table in &outcome.untracked_tables {
            println!("  {}", table);
        }
    }
    Ok(())
}

fn cmd_ddl(dir: &Path, dialect: Dialect) -> Result<()> {
    let report = Report::read_csv(dir.join(RELATIONSHIPS_FILE))
        .with_context(|| format!("failed to read {}", RELATIONSHIPS_FILE))?;
    let catalog = read_catalog(dir.join(COLUMNS_FILE))
        .with_context(|| format!("failed to read {}", COLUMNS_FILE))?;

    let target = dir.join(DDL_FILE);
    fs::write(&target, generate_ddl(&catalog, &report, dialect))?;
    println!("Wrote {} ({})", target.display(), dialect);
    Ok(())
}

fn cmd_cache(settings: &Settings, action: CacheAction) -> Result<()> {
    let cache = MetadataCache::open(settings.cache.path.as_deref())?;
    match action {
        CacheAction::Stats => {
            println!("{} cached entr(ies)", cache.len()?);
        }
        CacheAction::Clear { current: false } => {
            cache.clear_all()?;
            println!("Cache cleared");
        }
        CacheAction::Clear { current: true } => {
            let path = settings.source.resolved_path()?;
            let source = connect(&settings.source.driver, &path)?;
            let removed = cache.clear_connection(&connection_hash(&source.fingerprint()))?;
            println!("Removed {} entr(ies) for {}", removed, path);
        }
    }
    Ok(())
}
