// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The command dispatcher.
//!
//! A [`Session`] owns the bucket set for the lifetime of the process and
//! applies one [`Command`] at a time. Every command except quit and unknown
//! input is followed by a fresh read of the kernel report and a new
//! [`DerivedReport`].

use crate::{derive, CacheControl, Command, DerivedReport, ExerciserError, ProcDropCaches};
use kernel_stats::{KernelMemoryTable, MEMINFO_PATH};
use memory_manager::{BucketSet, PoolConfig};
use std::path::{Path, PathBuf};

/// Lifecycle of a session. `Quit` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Quit,
}

/// Result of handling one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran; here is the report that follows it.
    Report(DerivedReport),
    /// The input byte had no mapping. Nothing changed.
    Unknown(u8),
    /// The session has quit.
    Quit,
}

/// A single-owner memory-pressure session.
///
/// # Example
/// ```no_run
/// use exerciser::{Command, Outcome, Session};
///
/// let mut session = Session::new(Default::default()).unwrap();
/// assert!(matches!(session.handle(Command::Idle), Outcome::Report(_)));
/// assert_eq!(session.handle(Command::Quit), Outcome::Quit);
/// ```
pub struct Session<C = ProcDropCaches> {
    pools: BucketSet,
    cache: C,
    meminfo_path: PathBuf,
    state: SessionState,
}

impl Session<ProcDropCaches> {
    /// Creates a session reading `/proc/meminfo` and dropping caches via procfs.
    pub fn new(config: PoolConfig) -> Result<Self, ExerciserError> {
        Self::with_parts(config, ProcDropCaches::new(), MEMINFO_PATH)
    }
}

impl<C: CacheControl> Session<C> {
    /// Creates a session with an explicit cache controller and report source.
    pub fn with_parts(
        config: PoolConfig,
        cache: C,
        meminfo_path: impl Into<PathBuf>,
    ) -> Result<Self, ExerciserError> {
        let pools = BucketSet::new(config)?;
        let meminfo_path = meminfo_path.into();
        tracing::info!("session started, reading {}", meminfo_path.display());

        Ok(Self {
            pools,
            cache,
            meminfo_path,
            state: SessionState::Running,
        })
    }

    /// Applies one command.
    ///
    /// Declined acquires and releases (full bucket, empty bucket, OS
    /// exhaustion) still produce a report. After quit, every command
    /// returns [`Outcome::Quit`] without effect.
    pub fn handle(&mut self, command: Command) -> Outcome {
        if self.state == SessionState::Quit {
            return Outcome::Quit;
        }

        match command {
            Command::Reset => {
                let released = self.pools.reset_all();
                tracing::info!("reset: released {released} entries");
            }
            Command::DropCaches => self.cache.drop_caches(),
            Command::Acquire(mechanism) => {
                self.pools.acquire(mechanism);
            }
            Command::Release(mechanism) => {
                self.pools.release(mechanism);
            }
            Command::Idle => {}
            Command::Quit => {
                self.state = SessionState::Quit;
                return Outcome::Quit;
            }
            Command::Unknown(byte) => {
                tracing::debug!("ignoring unmapped key 0x{byte:x}");
                return Outcome::Unknown(byte);
            }
        }

        Outcome::Report(self.report())
    }

    /// Decodes and applies one input byte.
    pub fn handle_byte(&mut self, byte: u8) -> Outcome {
        self.handle(Command::from_byte(byte))
    }

    /// Reads the kernel report and derives a report for the current pools.
    pub fn report(&self) -> DerivedReport {
        let table = KernelMemoryTable::read_from(&self.meminfo_path);
        derive(&table, &self.pools.usage())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn pools(&self) -> &BucketSet {
        &self.pools
    }

    pub fn meminfo_path(&self) -> &Path {
        &self.meminfo_path
    }

    /// Releases every entry and ends the session.
    pub fn shutdown(mut self) {
        let released = self.pools.reset_all();
        self.state = SessionState::Quit;
        tracing::info!("session ended, released {released} entries");
    }
}

impl<C> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("pools", &self.pools)
            .field("meminfo_path", &self.meminfo_path)
            .field("state", &self.state)
            .finish()
    }
}
