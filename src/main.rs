//! Billmark CLI

use anyhow::{Context, Result};
use billmark_core::{
    annotate_bill, dates::parse_iso_date, payload, AnnotationContext, BillmarkConfig, NoRenames,
    RenameLookup, VersionTable,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "billmark")]
#[command(about = "Highlights fiscal parameter values cited in legislative bills", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long, env = "BILLMARK_CONFIG", default_value = "billmark.toml")]
    config: PathBuf,

    /// Set log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate the HTML of a bill
    Annotate {
        /// Raw bill HTML
        input: PathBuf,

        /// Bill identifier, used for its reference date and links
        #[arg(short, long)]
        bill_id: String,

        /// Reference date (YYYY-MM-DD), overriding the configured one
        #[arg(short, long)]
        date: Option<String>,

        /// Output file (stdout when absent)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the parameters citing each legal identifier, as JSON
    Index {
        /// Resolve identifier renames at this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Decode the payload of a highlight button
    Decode {
        /// Base64 payload from a `data-params` attribute
        payload: String,
    },
}

fn rename_lookup(config: &BillmarkConfig) -> Result<Box<dyn RenameLookup>> {
    Ok(match &config.data.versions {
        Some(path) => Box::new(VersionTable::load(path)?),
        None => Box::new(NoRenames),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let level = level.as_str().to_lowercase();
    let filter = EnvFilter::new(format!("billmark={},billmark_core={}", level, level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Billmark v{} starting...", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Annotate {
            input,
            bill_id,
            date,
            output,
        } => {
            let mut config = BillmarkConfig::load(Some(&cli.config))?;
            let date = match date {
                Some(date) => parse_iso_date(&date)?,
                None => config.bill_date(&bill_id)?,
            };
            if config.highlight.link_base.is_empty() {
                config.highlight.link_base = format!("/pjl/{}", bill_id);
            }

            let context = AnnotationContext::load(&config)?;
            let lookup = rename_lookup(&config)?;
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read bill {}", input.display()))?;

            let bill =
                annotate_bill(&context, &raw, date, lookup.as_ref(), &config.highlight).await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, bill.html)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Annotated bill {} written to {}", bill_id, path.display());
                }
                None => println!("{}", bill.html),
            }
        }
        Commands::Index { date } => {
            let config = BillmarkConfig::load(Some(&cli.config))?;
            let context = AnnotationContext::load(&config)?;

            let index = match date {
                Some(date) => {
                    let lookup = rename_lookup(&config)?;
                    billmark_core::resolve_current_identifiers(
                        &context.index,
                        lookup.as_ref(),
                        parse_iso_date(&date)?,
                    )
                    .await
                }
                None => context.index.clone(),
            };
            println!("{}", serde_json::to_string_pretty(&index.names())?);
        }
        Commands::Decode { payload } => match payload::decode(&payload) {
            Some(parameters) => println!("{}", serde_json::to_string_pretty(&parameters)?),
            None => anyhow::bail!("Invalid highlight payload"),
        },
    }

    Ok(())
}
