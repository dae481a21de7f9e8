//! Folio CLI
//!
//! Imports spreadsheets and content files into the Folio content store.

mod commands;
mod report;
mod selection;

use clap::{Parser, Subcommand};
use commands::{ImportCommand, InitCommand};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "FOLIO_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "FOLIO_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import posts, terms or users from a directory of files
    Import(ImportCommand),
    /// Write a default folio.yaml
    Init(InitCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = cli.log_level.clone();

    // If RUST_LOG is set, use it directly; otherwise use our default filter
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .expect("Invalid RUST_LOG environment variable")
    } else {
        // folio crates at the requested level, noisy dependencies at warn
        tracing_subscriber::EnvFilter::new(format!(
            "folio={level},\
             folio_cli={level},\
             folio_core={level},\
             folio_import={level},\
             folio_import_types={level},\
             folio_records={level},\
             folio_database={level},\
             folio_migrations={level},\
             sqlx=warn,\
             sea_orm=warn,\
             sea_orm_migration=warn",
            level = log_level
        ))
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer() // "compact" or any other value
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");

    match cli.command {
        Commands::Import(import_cmd) => import_cmd.execute(),
        Commands::Init(init_cmd) => init_cmd.execute(),
    }
}
