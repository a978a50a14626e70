// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-bucket operation counters.
//!
//! [`BucketStats`] records how a bucket has been driven over a session:
//! successful acquires and releases, declined requests, and OS failures.
//! The counters are diagnostics only and never influence bucket behaviour.

/// Cumulative statistics about one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct BucketStats {
    /// Successful acquisitions.
    pub acquired: u64,
    /// Successful releases (including those performed by a reset).
    pub released: u64,
    /// Acquire requests declined because the bucket was full.
    pub saturated: u64,
    /// Release requests declined because the bucket was empty.
    pub empty_releases: u64,
    /// Acquire requests that failed in the allocator or a system call.
    pub os_failures: u64,
    /// Highest number of simultaneous entries.
    pub peak_entries: usize,
}

impl BucketStats {
    pub(crate) fn record_acquire(&mut self, entries: usize) {
        self.acquired += 1;
        if entries > self.peak_entries {
            self.peak_entries = entries;
        }
    }

    pub(crate) fn record_release(&mut self) {
        self.released += 1;
    }

    pub(crate) fn record_saturated(&mut self) {
        self.saturated += 1;
    }

    pub(crate) fn record_empty_release(&mut self) {
        self.empty_releases += 1;
    }

    pub(crate) fn record_os_failure(&mut self) {
        self.os_failures += 1;
    }

    /// Total requests that did not change the bucket.
    pub fn declined(&self) -> u64 {
        self.saturated + self.empty_releases + self.os_failures
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} acquired, {} released, {} declined ({} full, {} empty, {} OS failures), peak {}",
            self.acquired,
            self.released,
            self.declined(),
            self.saturated,
            self.empty_releases,
            self.os_failures,
            self.peak_entries,
        )
    }
}
