use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use safemenu::AppError;
use safemenu::cli::{self as commands, OutputFormat, TargetArgs};
use safemenu_shared::Tier;

/// safemenu - allergy-aware menu and product filtering
#[derive(Parser)]
#[command(name = "safemenu")]
#[command(about = "Decide which menu items and products are safe for a set of allergens", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the allergen catalog
    Catalog {
        /// Only one labelling tier (mandatory, recommended)
        #[arg(long)]
        tier: Option<Tier>,
    },
    /// Print the products that may be displayed
    Eligible {
        /// Product dataset (JSON)
        #[arg(long)]
        data: PathBuf,

        #[command(flatten)]
        targets: TargetArgs,
    },
    /// Explain the verdict for every menu item of one product
    Classify {
        /// Product dataset (JSON)
        #[arg(long)]
        data: PathBuf,

        /// Product id
        #[arg(long)]
        product: String,

        #[command(flatten)]
        targets: TargetArgs,
    },
    /// Report items whose allergy sources disagree
    Conflicts {
        /// Product dataset (JSON)
        #[arg(long)]
        data: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = safemenu::Config::load(cli.config.clone()).map_err(AppError::from)?;

    // Initialize observability (tracing + logging)
    safemenu::observability::init_observability(
        "safemenu",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
        &config.observability.format,
    )?;

    config.validate().map_err(AppError::InvalidConfig)?;

    let output = match &cli.command {
        Commands::Catalog { tier } => commands::catalog::run(*tier, cli.format)?,
        Commands::Eligible { data, targets } => {
            commands::eligible::run(&config, data, targets, cli.format)?
        }
        Commands::Classify {
            data,
            product,
            targets,
        } => commands::classify::run(&config, data, product, targets, cli.format)?,
        Commands::Conflicts { data } => commands::conflicts::run(&config, data, cli.format)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}
