// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A fixed-capacity, last-in first-out registry of live entries.
//!
//! The [`Bucket`] is the ownership boundary for one allocation mechanism.
//! Entries are pushed on acquire and popped on release, so the most
//! recently acquired entry is always the next one returned to the OS.
//!
//! Each new entry is filled with its index modulo 256. The pattern makes
//! entries distinguishable from outside the process (e.g. in a core dump
//! or `/proc/<pid>/mem`) and forces every page to be touched.

use crate::region::Region;
use crate::{AllocationMechanism, BucketSpec, BucketStats, MemoryError};

/// Owns every live entry of one allocation mechanism.
///
/// Invariant: `0 <= len() <= capacity()`. Dropping a bucket releases its
/// remaining entries in LIFO order.
pub struct Bucket {
    mechanism: AllocationMechanism,
    spec: BucketSpec,
    entries: Vec<Region>,
    stats: BucketStats,
}

impl Bucket {
    /// Creates an empty bucket, reserving room for `spec.capacity` entries.
    ///
    /// Fails if the entry size is zero or the registry cannot be reserved.
    pub fn new(mechanism: AllocationMechanism, spec: BucketSpec) -> Result<Self, MemoryError> {
        if spec.entry_size == 0 {
            return Err(MemoryError::ZeroSizedEntry { mechanism });
        }

        let mut entries = Vec::new();
        entries
            .try_reserve_exact(spec.capacity)
            .map_err(|_| MemoryError::Registry {
                mechanism,
                capacity: spec.capacity,
            })?;

        Ok(Self {
            mechanism,
            spec,
            entries,
            stats: BucketStats::default(),
        })
    }

    /// Acquires one more entry, returning its index.
    ///
    /// On failure the bucket is unchanged.
    pub fn try_acquire(&mut self) -> Result<usize, MemoryError> {
        if self.is_full() {
            self.stats.record_saturated();
            return Err(MemoryError::Saturated {
                mechanism: self.mechanism,
                capacity: self.spec.capacity,
            });
        }

        let index = self.entries.len();
        let region = Region::acquire(self.mechanism, self.spec.entry_size, fingerprint(index))
            .inspect_err(|_| self.stats.record_os_failure())?;

        self.entries.push(region);
        self.stats.record_acquire(self.entries.len());
        tracing::trace!("{}: acquired entry {index}", self.mechanism);
        Ok(index)
    }

    /// Acquires one more entry. Returns `false` if the request was declined.
    pub fn acquire(&mut self) -> bool {
        match self.try_acquire() {
            Ok(_) => true,
            Err(e) => {
                log_decline(&e);
                false
            }
        }
    }

    /// Releases the most recently acquired entry, returning its index.
    pub fn try_release(&mut self) -> Result<usize, MemoryError> {
        let Some(region) = self.entries.pop() else {
            self.stats.record_empty_release();
            return Err(MemoryError::Empty {
                mechanism: self.mechanism,
            });
        };

        drop(region);
        let index = self.entries.len();
        self.stats.record_release();
        tracing::trace!("{}: released entry {index}", self.mechanism);
        Ok(index)
    }

    /// Releases the most recently acquired entry. Returns `false` if the
    /// bucket was already empty.
    pub fn release(&mut self) -> bool {
        match self.try_release() {
            Ok(_) => true,
            Err(e) => {
                log_decline(&e);
                false
            }
        }
    }

    /// Releases every entry, newest first. Returns how many were released.
    pub fn reset(&mut self) -> usize {
        let mut released = 0;
        while !self.is_empty() {
            if self.try_release().is_ok() {
                released += 1;
            }
        }
        released
    }

    /// The mechanism this bucket allocates with.
    pub fn mechanism(&self) -> AllocationMechanism {
        self.mechanism
    }

    /// Entry size and capacity.
    pub fn spec(&self) -> BucketSpec {
        self.spec
    }

    /// Size of every entry in bytes.
    pub fn entry_size(&self) -> usize {
        self.spec.entry_size
    }

    /// Maximum number of simultaneous entries.
    pub fn capacity(&self) -> usize {
        self.spec.capacity
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.spec.capacity
    }

    /// Bytes currently held by live entries.
    pub fn allocated_bytes(&self) -> u64 {
        self.entry_size() as u64 * self.len() as u64
    }

    /// First byte of every live entry, oldest first.
    pub fn fingerprints(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries
            .iter()
            .map(|region| region.as_slice().first().copied().unwrap_or_default())
    }

    /// Read-only view of a live entry's bytes.
    pub fn entry(&self, index: usize) -> Option<&[u8]> {
        self.entries.get(index).map(Region::as_slice)
    }

    /// Operation counters for this bucket.
    pub fn stats(&self) -> &BucketStats {
        &self.stats
    }
}

impl Drop for Bucket {
    fn drop(&mut self) {
        self.reset();
    }
}

impl std::fmt::Debug for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bucket")
            .field("mechanism", &self.mechanism)
            .field("spec", &self.spec)
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Fill byte for the entry at `index`.
fn fingerprint(index: usize) -> u8 {
    (index & 0xff) as u8
}

fn log_decline(e: &MemoryError) {
    if e.is_declined() {
        tracing::debug!("{e}");
    } else {
        tracing::warn!("{e}");
    }
}
