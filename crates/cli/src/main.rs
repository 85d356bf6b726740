mod commands;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::OutputFormat;
use settings::Settings;

/// Extract products from OCR'd grocery receipts
#[derive(Parser)]
#[command(name = "shelfscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Settings file (defaults to shelfscan.toml in the config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Custom store-processor document, tried before the defaults
    #[arg(long, global = true)]
    custom: Option<PathBuf>,

    /// Default store-processor document
    #[arg(long, global = true)]
    default: Option<PathBuf>,

    /// Category-mapping document
    #[arg(long, global = true)]
    categories: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract products from one receipt text file
    Parse {
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Extract several receipts concurrently, one JSON summary per line
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the cleaned text of a receipt
    Normalize { file: PathBuf },
    /// Expand 10-digit receipt codes to full UPC-A
    Barcode {
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// List configured stores
    Stores,
    /// Check extracted products against a catalog snapshot
    Review {
        file: PathBuf,
        /// JSON array of catalog items
        #[arg(long)]
        catalog: PathBuf,
        /// Create items for products not yet in the catalog
        #[arg(long)]
        create_missing: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // These never touch the store documents.
    match &cli.command {
        Commands::Normalize { file } => return commands::normalize_file(file),
        Commands::Barcode { codes } => return commands::barcodes(codes),
        _ => {}
    }

    let pipeline = Settings::discover(cli.config.as_deref())?
        .with_overrides(cli.custom, cli.default, cli.categories)
        .build_pipeline()?;

    match cli.command {
        Commands::Parse { file, format } => commands::parse(&pipeline, &file, format),
        Commands::Batch { files } => commands::batch(Arc::new(pipeline), files).await,
        Commands::Stores => {
            print!("{}", commands::list_stores(&pipeline));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Review { file, catalog, create_missing } => {
            commands::review(&pipeline, &file, &catalog, create_missing)
        }
        Commands::Normalize { .. } | Commands::Barcode { .. } => Ok(ExitCode::SUCCESS),
    }
}
