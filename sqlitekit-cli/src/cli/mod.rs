// Copyright (c) 2024-2025 sqlitekit Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for sqlitekit
//!
//! Provides one-off query and batch execution, and an interactive SQL shell
//! (REPL).

pub mod commands;
pub mod output;
pub mod shell;

pub use commands::{load_options, Cli, Commands};
pub use shell::{handle_exec, handle_query, handle_shell};
