//! Flowmap CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "flowmap")]
#[command(about = "Map described flows to canonical catalog flows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Catalog directory (defaults to $FLOWMAP_CATALOG, then the current directory)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Resolver configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the sample catalog into the catalog directory
    Init,
    /// Resolve one flow and record it in the flow map
    Resolve {
        /// Flow type: elementary, product or waste
        #[arg(short, long = "type", default_value = "elementary")]
        flow_type: String,

        /// Flow name
        #[arg(short, long)]
        name: String,

        /// Unit symbol
        #[arg(short, long)]
        unit: String,

        /// Category path fragments, e.g. air/unspecified
        #[arg(long)]
        category: Option<String>,

        /// Location name or code
        #[arg(short, long)]
        location: Option<String>,

        /// Flow map name
        #[arg(short, long)]
        mapping: Option<String>,
    },
    /// List unit groups and their units
    Units,
    /// Print the category tree
    Categories {
        /// Model type of the tree
        #[arg(long, default_value = "flow")]
        model_type: String,
    },
    /// List the entries of a flow map
    Mapping {
        /// Flow map name
        #[arg(short, long)]
        mapping: Option<String>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "flowmap={0},flowmap_core={0},flowmap_catalog={0},flowmap_resolver={0}",
            log_level
        ))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let root = cli
        .catalog
        .or_else(|| std::env::var_os(commands::CATALOG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    tracing::debug!("Catalog directory: {}", root.display());

    match cli.command {
        Commands::Init => commands::init(root).await,
        Commands::Resolve {
            flow_type,
            name,
            unit,
            category,
            location,
            mapping,
        } => {
            let config = commands::load_config(cli.config.as_deref(), mapping)?;
            let query = commands::build_query(
                &flow_type,
                &name,
                &unit,
                category.as_deref(),
                location.as_deref(),
            )?;
            commands::resolve(root, config, query).await
        }
        Commands::Units => commands::units(root).await,
        Commands::Categories { model_type } => commands::categories(root, &model_type).await,
        Commands::Mapping { mapping } => {
            let config = commands::load_config(cli.config.as_deref(), mapping)?;
            commands::mapping(root, config).await
        }
        Commands::Version => {
            println!("Flowmap v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
