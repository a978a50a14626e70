// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Page-cache dropping.
//!
//! Writing `1` to `/proc/sys/vm/drop_caches` asks the kernel to drop clean
//! page-cache pages. Dirty pages are flushed first with `sync()` so more of
//! the cache is clean by the time the request lands. Requires root; without
//! it the request is a silent no-op.

use crate::ExerciserError;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Kernel control file for dropping caches.
pub const DROP_CACHES_PATH: &str = "/proc/sys/vm/drop_caches";

/// Marker written to the control file: page cache only.
const DROP_PAGE_CACHE: &[u8] = b"1";

/// A best-effort request to drop kernel caches.
pub trait CacheControl {
    /// Issues the request. Failures are not reported to the caller.
    fn drop_caches(&mut self);
}

/// Drops caches through the procfs control file.
#[derive(Debug, Clone)]
pub struct ProcDropCaches {
    path: PathBuf,
}

impl ProcDropCaches {
    pub fn new() -> Self {
        Self::with_path(DROP_CACHES_PATH)
    }

    /// Uses a different control file (for testing).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Syncs, then writes the marker, reporting open/write failure.
    pub fn try_drop_caches(&self) -> Result<(), ExerciserError> {
        rustix::fs::sync();

        let to_error = |source| ExerciserError::CacheControl {
            path: self.path.display().to_string(),
            source,
        };
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(to_error)?;
        file.write_all(DROP_PAGE_CACHE).map_err(to_error)
    }
}

impl Default for ProcDropCaches {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheControl for ProcDropCaches {
    fn drop_caches(&mut self) {
        match self.try_drop_caches() {
            Ok(()) => tracing::info!("dropped page caches"),
            Err(e) => tracing::debug!("{e}"),
        }
    }
}
