// Copyright (c) 2024-2025 sqlitekit Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for sqlitekit

use colored::Colorize;
use rustyline::{error::ReadlineError, CompletionType, Config, EditMode, Editor};
use sqlitekit::{Connection, OpenOptions, Value};
use std::path::Path;
use std::time::Instant;

use super::commands::OutputFormat;
use super::output::{QueryOutput, ResultFormatter};

const HISTORY_PATH: &str = ".sqlitekit/.sql_history.txt";

/// Handle the query command (one-off statement execution)
pub fn handle_query(
    path: &Path,
    options: &OpenOptions,
    sql: &str,
    params: &[String],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let conn = Connection::open_with(path, options)?;
    let values: Vec<Value> = params.iter().map(|p| parse_param(p)).collect();

    match run_statement(&conn, sql, &values) {
        Ok(output) => {
            println!("{}", ResultFormatter::format(&output, format));
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            Err(e.into())
        }
    }
}

/// Handle the exec command (run a script)
pub fn handle_exec(
    path: &Path,
    options: &OpenOptions,
    sql: Option<&str>,
    file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let script = match (sql, file) {
        (Some(sql), _) => sql.to_string(),
        (None, Some(file)) => std::fs::read_to_string(file)
            .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?,
        (None, None) => return Err("No SQL given".into()),
    };

    let conn = Connection::open_with(path, options)?;
    let start = Instant::now();
    conn.execute_batch(&script)?;

    println!(
        "{}",
        format!(
            "✅ Script executed in {} ms, {} row(s) changed",
            start.elapsed().as_millis(),
            conn.total_changes()
        )
        .green()
    );
    Ok(())
}

/// Handle the shell (REPL) command
pub fn handle_shell(
    path: &Path,
    options: &OpenOptions,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let conn = Connection::open_with(path, options)?;

    println!("{}", "sqlitekit".bold().green());
    println!("Type 'help' for commands, 'exit' or 'quit' to exit");
    println!("Multi-line statements supported - use ';' to terminate\n");
    println!(
        "{}",
        format!(
            "Connected to {} (SQLite {})",
            path.display(),
            sqlitekit::sqlite_version()
        )
        .cyan()
    );

    let config = Config::builder()
        .edit_mode(EditMode::Emacs)
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .auto_add_history(false)
        .build();

    let mut rl = Editor::<(), _>::with_config(config)?;

    if let Some(parent) = Path::new(HISTORY_PATH).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.load_history(HISTORY_PATH);

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() {
            format!("{}> ", "sqlitekit".cyan())
        } else {
            format!("{}> ", "      ...".cyan())
        };

        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                if !buffer.is_empty() {
                    buffer.clear();
                    println!("{}", "\nStatement buffer cleared".yellow());
                }
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let trimmed = line.trim();

        if buffer.is_empty() {
            match trimmed.to_lowercase().as_str() {
                "exit" | "quit" => {
                    println!("{}", "Goodbye!".green());
                    break;
                }
                "help" => {
                    print_help();
                    continue;
                }
                "clear" => {
                    print!("\x1B[2J\x1B[1;1H");
                    std::io::Write::flush(&mut std::io::stdout())?;
                    continue;
                }
                "" => continue,
                _ => {}
            }
        }

        buffer.push_str(&line);
        buffer.push('\n');

        if trimmed.ends_with(';') {
            let sql = buffer.trim().to_string();
            rl.add_history_entry(&sql)?;

            match run_statement(&conn, &sql, &[]) {
                Ok(output) => println!("{}", ResultFormatter::format(&output, format)),
                Err(e) => eprintln!("{}", e.to_string().red()),
            }

            buffer.clear();
        }
    }

    let _ = rl.save_history(HISTORY_PATH);
    Ok(())
}

/// Prepare `sql`, bind `params` in order, and collect every row
pub fn run_statement(
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> Result<QueryOutput, sqlitekit::Error> {
    let start = Instant::now();
    let mut stmt = conn.prepare(sql)?;
    stmt.bind_all(params)?;

    let columns = stmt.column_names();
    let rows = stmt.begin()?.collect::<Result<Vec<_>, _>>()?;
    let changes = if columns.is_empty() { conn.changes() } else { 0 };

    Ok(QueryOutput {
        columns,
        rows,
        changes,
        execution_time_ms: start.elapsed().as_millis(),
    })
}

/// Interpret a command-line parameter: NULL, integer, real, or text
fn parse_param(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("null") {
        Value::Null
    } else if let Ok(i) = raw.parse::<i64>() {
        Value::Integer(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::Real(f)
    } else {
        Value::Text(raw.to_string())
    }
}

/// Print help message
fn print_help() {
    println!("{}", "Available commands:".bold().green());
    println!("  {}  - Show this help message", "help".cyan());
    println!("  {}  - Exit the shell", "exit/quit".cyan());
    println!("  {}  - Clear the screen", "clear".cyan());
    println!("\n{}", "Statement syntax:".bold().green());
    println!("  Multi-line statements are supported");
    println!("  Terminate statements with semicolon (;)");
    println!("\n{}", "Examples:".bold().green());
    println!(
        "  {}",
        "CREATE TABLE store (article TEXT, category TEXT, amount INT);".yellow()
    );
    println!(
        "  {}",
        "INSERT INTO store VALUES ('apple', 'fruit', 125);".yellow()
    );
    println!("  {}", "SELECT article, amount FROM store;".yellow());
}
