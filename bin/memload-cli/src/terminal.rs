// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Controlling-terminal checks and raw mode.

use anyhow::{bail, Context};
use rustix::termios::{self, OptionalActions, OutputModes, Termios};

/// Fails unless stdin, stdout and stderr are the same terminal.
pub fn ensure_tty() -> anyhow::Result<()> {
    let stdin = rustix::fs::fstat(std::io::stdin()).context("no tty")?;
    let stdout = rustix::fs::fstat(std::io::stdout()).context("no tty")?;
    let stderr = rustix::fs::fstat(std::io::stderr()).context("no tty")?;

    let same = |a: &rustix::fs::Stat, b: &rustix::fs::Stat| a.st_dev == b.st_dev && a.st_ino == b.st_ino;
    if !same(&stdin, &stdout) || !same(&stdin, &stderr) {
        bail!("no tty");
    }
    if !termios::isatty(std::io::stdin()) {
        bail!("no tty");
    }
    Ok(())
}

/// Puts the terminal in raw mode, restoring the original attributes on drop.
///
/// Output post-processing stays on so `\n` still returns the carriage.
pub struct RawModeGuard {
    original: Termios,
}

impl RawModeGuard {
    pub fn enable() -> anyhow::Result<Self> {
        let stdin = std::io::stdin();
        let original = termios::tcgetattr(&stdin).context("failed to get tty attrs")?;

        let mut raw = original.clone();
        raw.make_raw();
        raw.output_modes.insert(OutputModes::OPOST);
        termios::tcsetattr(&stdin, OptionalActions::Flush, &raw)
            .context("failed to set tty attrs")?;

        tracing::debug!("terminal in raw mode");
        Ok(Self { original })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = termios::tcsetattr(std::io::stdin(), OptionalActions::Flush, &self.original) {
            tracing::error!("tcsetattr: {e}");
            eprintln!("failed to restore tty attrs");
        }
    }
}
