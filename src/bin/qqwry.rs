mod cli_utils;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{cmd_inspect, cmd_query, cmd_validate};

#[derive(Parser)]
#[command(name = "qqwry")]
#[command(
    about = "Look up IPv4 addresses in QQWry geolocation databases",
    long_about = "qqwry - Read-only lookup tool for QQWry IPv4 geolocation databases\n\n\
    Loads a QQWry .dat file (memory-mapped), resolves addresses to their\n\
    country and region strings, and converts the stored GBK text to UTF-8.\n\n\
    Examples:\n\
      qqwry query qqwry.dat 8.8.8.8 1.1.1.1\n\
      qqwry query qqwry.dat 114.114.114.114 --json\n\
      qqwry inspect qqwry.dat\n\
      qqwry validate qqwry.dat --level strict"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query one or more IPv4 addresses
    Query {
        /// Path to the QQWry database (.dat file)
        #[arg(value_name = "DATABASE")]
        database: PathBuf,

        /// Dotted-decimal IPv4 addresses to look up
        #[arg(value_name = "ADDRESS", required = true)]
        addresses: Vec<String>,

        /// Output results as a JSON array
        #[arg(short, long)]
        json: bool,

        /// Quiet mode - no output, only exit code (0 = all found, 1 = otherwise)
        #[arg(short, long)]
        quiet: bool,

        /// Treat stored strings as UTF-8 instead of GBK
        #[arg(long)]
        utf8: bool,
    },

    /// Inspect a QQWry database
    Inspect {
        /// Path to the QQWry database (.dat file)
        #[arg(value_name = "DATABASE")]
        database: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Treat stored strings as UTF-8 instead of GBK
        #[arg(long)]
        utf8: bool,
    },

    /// Validate a database file for safety and correctness
    Validate {
        /// Path to the QQWry database (.dat file)
        #[arg(value_name = "DATABASE")]
        database: PathBuf,

        /// Validation level: standard or strict (default)
        #[arg(short, long, default_value = "strict")]
        level: String,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,

        /// Show detailed information (warnings and info messages)
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            database,
            addresses,
            json,
            quiet,
            utf8,
        } => cmd_query(database, addresses, json, quiet, utf8),
        Commands::Inspect {
            database,
            json,
            utf8,
        } => cmd_inspect(database, json, utf8),
        Commands::Validate {
            database,
            level,
            json,
            verbose,
        } => cmd_validate(database, level, json, verbose),
    }
}
