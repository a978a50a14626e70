// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `memload run`: the interactive session.
//!
//! Reads one byte at a time from the raw-mode terminal and feeds it to the
//! session. Setup failures (no terminal, bucket registries, terminal
//! attributes) abort the process.

use crate::terminal::{self, RawModeGuard};
use anyhow::Context;
use exerciser::{Command, Outcome, Session};
use memory_manager::PoolConfig;
use std::io::{ErrorKind, Read, Write};

pub fn execute() -> anyhow::Result<()> {
    if let Err(e) = terminal::ensure_tty() {
        die(e);
    }
    let mut session = Session::new(PoolConfig::default()).unwrap_or_else(|e| die(e));
    let _raw = RawModeGuard::enable().unwrap_or_else(|e| die(e));

    let mut stdin = std::io::stdin().lock();
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", session.report())?;
    out.flush()?;

    let mut byte = [0u8; 1];
    while session.is_running() {
        let outcome = match stdin.read(&mut byte) {
            Ok(0) => session.handle(Command::Quit),
            Ok(_) => session.handle_byte(byte[0]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("failed to read from terminal"),
        };

        match outcome {
            Outcome::Report(report) => writeln!(out, "{report}")?,
            Outcome::Unknown(key) => writeln!(out, "unknown key 0x{key:x}")?,
            Outcome::Quit => {}
        }
        out.flush()?;
    }

    // Buckets drain before the terminal is restored.
    session.shutdown();
    Ok(())
}

/// Reports a fatal setup error and aborts.
fn die(e: impl std::fmt::Display) -> ! {
    eprintln!("{e:#}");
    std::process::abort()
}
