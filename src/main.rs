//! CLI for pubs-sync - Regenerate a publications TOML file from Zotero.

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pubs_sync::config::DEFAULT_OUTPUT;
use pubs_sync::pipeline::source_for;
use pubs_sync::stats::DEFAULT_SCHOLAR_ID;
use pubs_sync::{sync, SourceConfig, SyncConfig, SyncError, Taxonomy, ZoteroCredentials};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Regenerate a publications TOML file from a Zotero collection, preserving [stats]
#[derive(Parser)]
#[command(name = "pubs-sync")]
#[command(version)]
#[command(after_help = "\
Examples:
  pubs-sync sync --user 123456 --key <api-key> --collection ABCD1234
  pubs-sync sync -o site/data/publications.toml
  pubs-sync sync --input exported-items.json
  pubs-sync types --dataset-types dataset,webpage

Credentials fall back to ZOTERO_USER_ID, ZOTERO_API_KEY and ZOTERO_COLLECTION_KEY,
read from the environment or a .env file in the working directory.")]
struct Cli {
    /// Log filter (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the collection and rewrite the output file
    Sync {
        /// Output TOML file
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Zotero user ID
        #[arg(short, long, env = "ZOTERO_USER_ID")]
        user: Option<String>,

        /// Zotero API key
        #[arg(short, long, env = "ZOTERO_API_KEY", hide_env_values = true)]
        key: Option<String>,

        /// Zotero collection key
        #[arg(short, long, env = "ZOTERO_COLLECTION_KEY")]
        collection: Option<String>,

        /// Google Scholar profile id used in the default [stats] section
        #[arg(long, env = "GOOGLE_SCHOLAR_ID", default_value = DEFAULT_SCHOLAR_ID)]
        scholar_id: String,

        /// Read records from a CSL-JSON (or JSONL) export instead of the Zotero API
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        taxonomy: TaxonomyArgs,
    },

    /// Show which item types map to papers and datasets
    Types {
        #[command(flatten)]
        taxonomy: TaxonomyArgs,
    },
}

#[derive(Args)]
struct TaxonomyArgs {
    /// Comma-separated item types treated as papers (replaces the default list)
    #[arg(long, value_delimiter = ',')]
    paper_types: Option<Vec<String>>,

    /// Comma-separated item types treated as datasets (replaces the default list)
    #[arg(long, value_delimiter = ',')]
    dataset_types: Option<Vec<String>>,
}

impl TaxonomyArgs {
    fn build(&self) -> Taxonomy {
        let default = Taxonomy::default();
        let papers = self
            .paper_types
            .clone()
            .unwrap_or_else(|| default.paper_types().to_vec());
        let datasets = self
            .dataset_types
            .clone()
            .unwrap_or_else(|| default.dataset_types().to_vec());
        Taxonomy::new(papers, datasets)
    }
}

// ---------------------------------------------------------------------------
// AppError - semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10: required Zotero setting missing
    Config(String),
    /// Exit 11: records could not be fetched or read
    Fetch(String),
    /// Exit 12: cannot write output file
    OutputFile(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 10,
            AppError::Fetch(_) => 11,
            AppError::OutputFile(_) => 12,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => {
                write!(
                    f,
                    "{}\n  hint: pass --user, --key and --collection, or set ZOTERO_USER_ID, ZOTERO_API_KEY and ZOTERO_COLLECTION_KEY",
                    msg
                )
            }
            AppError::Fetch(msg) => {
                write!(
                    f,
                    "{}\n  hint: check the API key permissions and the collection key; the output file was not modified",
                    msg
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output path is writable",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Sync {
            output,
            user,
            key,
            collection,
            scholar_id,
            input,
            taxonomy,
        } => {
            let source = match input {
                Some(path) => SourceConfig::File(path),
                None => SourceConfig::Zotero(
                    ZoteroCredentials::new(user.as_deref(), key.as_deref(), collection.as_deref())
                        .map_err(|e| AppError::Config(e.to_string()))?,
                ),
            };
            let config = SyncConfig::new(source)
                .with_output(output)
                .with_scholar_id(scholar_id)
                .with_taxonomy(taxonomy.build());
            sync_command(&config)?;
        }
        Commands::Types { taxonomy } => {
            types_command(&taxonomy.build());
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Fetch, classify, merge and write.
fn sync_command(config: &SyncConfig) -> Result<(), AppError> {
    let source = source_for(config).map_err(|e| AppError::Fetch(e.to_string()))?;

    let report = sync(config, source.as_ref()).map_err(|e| match e {
        SyncError::Fetch(_) => AppError::Fetch(e.to_string()),
        SyncError::Output(_) => {
            AppError::OutputFile(format!("'{}': {}", config.output.display(), e))
        }
    })?;

    eprintln!(
        "generated '{}' with {} paper(s) and {} dataset(s) ({} item(s) skipped)",
        report.output.display(),
        report.papers,
        report.datasets,
        report.skipped.len()
    );
    if report.stats_populated {
        eprintln!("  preserved existing [stats] section");
    } else {
        eprintln!("  used default [stats] section (update manually if needed)");
    }

    Ok(())
}

/// Print the effective type mapping.
fn types_command(taxonomy: &Taxonomy) {
    for t in taxonomy.paper_types() {
        println!("{}\tpaper", t);
    }
    for t in taxonomy.dataset_types() {
        println!("{}\tdataset", t);
    }
}
