// Copyright (c) 2024-2025 sqlitekit Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for CLI output

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use sqlitekit::{Row, Value};

use super::commands::OutputFormat;

/// Everything one statement produced
#[derive(Debug, Default)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Rows changed, for statements without result columns
    pub changes: i32,
    pub execution_time_ms: u128,
}

impl QueryOutput {
    /// True for INSERT/UPDATE/DELETE/DDL, which report changes instead of rows
    pub fn is_statement(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Result formatter for different output formats
pub struct ResultFormatter;

impl ResultFormatter {
    pub fn format(output: &QueryOutput, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => Self::format_table(output),
            OutputFormat::Json => Self::format_json(output),
            OutputFormat::Csv => Self::format_csv(output),
        }
    }

    /// Format results as a table using comfy-table
    fn format_table(output: &QueryOutput) -> String {
        if output.is_statement() {
            return format!(
                "{}\n",
                format!("✅ {} row(s) changed", output.changes).green()
            );
        }

        if output.rows.is_empty() {
            return format!("{}\n", "No results found".yellow());
        }

        let mut text = String::new();
        text.push_str(&format!("{}\n", "Query Results".bold().green()));
        text.push_str(&format!(
            "Execution time: {} ms\n",
            output.execution_time_ms
        ));
        text.push_str(&format!("Rows returned: {}\n\n", output.rows.len()));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);

        let header_cells: Vec<Cell> = output
            .columns
            .iter()
            .map(|col| Cell::new(col).fg(Color::Green))
            .collect();
        table.set_header(header_cells);

        for row in &output.rows {
            let row_values: Vec<String> = row.values().iter().map(Value::to_string).collect();
            table.add_row(row_values);
        }

        text.push_str(&table.to_string());
        text.push('\n');
        text
    }

    /// Format results as JSON
    fn format_json(output: &QueryOutput) -> String {
        let json = if output.is_statement() {
            serde_json::json!({
                "status": "success",
                "changes": output.changes,
                "execution_time_ms": output.execution_time_ms,
            })
        } else {
            serde_json::json!({
                "status": "success",
                "columns": output.columns,
                "rows": output.rows.iter().map(Row::to_json).collect::<Vec<_>>(),
                "row_count": output.rows.len(),
                "execution_time_ms": output.execution_time_ms,
            })
        };

        serde_json::to_string_pretty(&json).unwrap_or_else(|_| {
            "{\"status\": \"error\", \"error\": \"Could not serialize results to JSON\"}"
                .to_string()
        })
    }

    /// Format results as CSV; NULL becomes an empty field
    fn format_csv(output: &QueryOutput) -> String {
        if output.is_statement() {
            return format!("changes\n{}\n", output.changes);
        }

        let mut text = String::new();
        let header: Vec<String> = output.columns.iter().map(|c| Self::csv_field(c)).collect();
        text.push_str(&header.join(","));
        text.push('\n');

        for row in &output.rows {
            let row_values: Vec<String> = row
                .values()
                .iter()
                .map(|v| match v {
                    Value::Null => String::new(),
                    other => Self::csv_field(&other.to_string()),
                })
                .collect();
            text.push_str(&row_values.join(","));
            text.push('\n');
        }

        text
    }

    fn csv_field(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}
