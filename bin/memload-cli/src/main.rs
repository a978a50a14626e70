// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memload
//!
//! Interactive memory-pressure exerciser. Allocates and frees memory
//! through the heap, anonymous mappings and memfd-backed shared mappings,
//! printing the kernel's memory accounting after every step.
//!
//! ## Usage
//! ```bash
//! # Interactive session (needs a terminal)
//! memload
//!
//! # One-shot report, as text or JSON
//! memload report
//! memload report --json
//! ```
//!
//! ## Keys
//! `g`/`G` 1 GiB heap, `m`/`M` 32 MiB heap, `a`/`A` 1 GiB anonymous map,
//! `s`/`S` 1 GiB shared map (lowercase allocates, uppercase frees),
//! `r` free everything, `d` drop caches, space to refresh, `q` to quit.

mod commands;
mod terminal;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "memload",
    about = "Interactive memory-pressure exerciser",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Run an interactive session on the controlling terminal (default).
    Run,

    /// Print the memory report once and exit.
    Report {
        /// Emit the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::execute(),
        Commands::Report { json } => commands::report::execute(json),
    }
}
