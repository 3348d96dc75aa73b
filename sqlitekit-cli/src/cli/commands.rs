// Copyright (c) 2024-2025 sqlitekit Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use sqlitekit::OpenOptions;
use std::path::PathBuf;

/// sqlitekit - query and modify SQLite databases
#[derive(Parser, Debug)]
#[command(name = "sqlitekit", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<log::Level>,

    /// Open the database read-only
    #[arg(long, global = true)]
    pub read_only: bool,

    /// JSON file with connection options
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Run one SQL statement and print its rows
    Query {
        /// SQL statement; only the first statement is run
        sql: String,

        /// Database file
        #[arg(short, long, default_value = "sqlitekit.db")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Positional parameter values, bound in order to ?1, ?2, ...
        #[arg(short = 'P', long = "param", value_name = "VALUE")]
        params: Vec<String>,
    },

    /// Run a script of `;`-separated statements
    Exec {
        /// SQL text
        #[arg(required_unless_present = "file")]
        sql: Option<String>,

        /// Read the SQL text from a file
        #[arg(long, conflicts_with = "sql")]
        file: Option<PathBuf>,

        /// Database file
        #[arg(short, long, default_value = "sqlitekit.db")]
        path: PathBuf,
    },

    /// Start the interactive SQL shell
    Shell {
        /// Database file
        #[arg(short, long, default_value = "sqlitekit.db")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

/// Output format for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Connection options from `--config`, then `--read-only` on top
pub fn load_options(cli: &Cli) -> Result<OpenOptions, Box<dyn std::error::Error>> {
    let mut options = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
            serde_json::from_str::<OpenOptions>(&text)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?
        }
        None => OpenOptions::default(),
    };

    if cli.read_only {
        options.read_only = true;
        options.create = false;
    }

    log::debug!("connection options: {:?}", options);
    Ok(options)
}
