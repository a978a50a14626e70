// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for bucket operations.

use crate::AllocationMechanism;

/// Errors that can occur while acquiring or releasing bucket entries.
///
/// [`Saturated`](MemoryError::Saturated) and [`Empty`](MemoryError::Empty)
/// are declines rather than failures; see [`MemoryError::is_declined`].
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The bucket already holds its maximum number of entries.
    #[error("{mechanism} bucket is full ({capacity} entries)")]
    Saturated {
        mechanism: AllocationMechanism,
        capacity: usize,
    },

    /// The bucket holds no entries to release.
    #[error("{mechanism} bucket is empty")]
    Empty { mechanism: AllocationMechanism },

    /// The heap allocator refused the request.
    #[error("{mechanism}: cannot allocate {size} bytes on the heap")]
    HeapExhausted {
        mechanism: AllocationMechanism,
        size: usize,
    },

    /// A system call failed while acquiring an entry.
    #[error("{mechanism}: {op} failed: {source}")]
    Os {
        mechanism: AllocationMechanism,
        op: &'static str,
        #[source]
        source: rustix::io::Errno,
    },

    /// The entry registry itself could not be reserved.
    #[error("{mechanism}: cannot reserve registry for {capacity} entries")]
    Registry {
        mechanism: AllocationMechanism,
        capacity: usize,
    },

    /// Entries must have a non-zero size.
    #[error("{mechanism}: entry size must be greater than zero")]
    ZeroSizedEntry { mechanism: AllocationMechanism },
}

impl MemoryError {
    /// Returns `true` for the expected saturation signals (full or empty
    /// bucket), as opposed to resource exhaustion or setup failures.
    pub fn is_declined(&self) -> bool {
        matches!(self, Self::Saturated { .. } | Self::Empty { .. })
    }
}
