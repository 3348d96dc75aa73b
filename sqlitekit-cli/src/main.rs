// Copyright (c) 2024-2025 sqlitekit Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! sqlitekit CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // -v/--verbose wins over --log-level; RUST_LOG can still override either
    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match &cli.command {
        Commands::Version => {
            println!("{} {}", "sqlitekit".bold().green(), sqlitekit::VERSION);
            println!("SQLite {}", sqlitekit::sqlite_version());
            Ok(())
        }

        Commands::Query {
            sql,
            path,
            format,
            params,
        } => {
            let options = cli::load_options(&cli)?;
            cli::handle_query(path, &options, sql, params, *format)
        }

        Commands::Exec { sql, file, path } => {
            let options = cli::load_options(&cli)?;
            cli::handle_exec(path, &options, sql.as_deref(), file.as_deref())
        }

        Commands::Shell { path, format } => {
            let options = cli::load_options(&cli)?;
            cli::handle_shell(path, &options, *format)
        }
    }
}
