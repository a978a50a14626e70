// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Identities of the counters captured from `/proc/meminfo`.

use std::fmt;

/// A memory counter reported by the kernel.
///
/// Variants are declared in the order the kernel prints them, which is
/// also the iteration order of [`KernelMemoryTable`](crate::KernelMemoryTable).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
)]
pub enum KernelStat {
    MemTotal,
    MemFree,
    MemAvailable,
    Buffers,
    Cached,
    SwapCached,
    Active,
    Inactive,
    ActiveAnon,
    InactiveAnon,
    ActiveFile,
    InactiveFile,
    Unevictable,
    Mlocked,
    SwapTotal,
    SwapFree,
    Zswap,
    Zswapped,
    Dirty,
    Writeback,
    AnonPages,
    Mapped,
    Shmem,
    KReclaimable,
    Slab,
    SReclaimable,
    SUnreclaim,
    KernelStack,
    PageTables,
}

impl KernelStat {
    /// Number of supported counters.
    pub const COUNT: usize = 29;

    /// Every supported counter, in report order.
    pub const ALL: [KernelStat; Self::COUNT] = [
        Self::MemTotal,
        Self::MemFree,
        Self::MemAvailable,
        Self::Buffers,
        Self::Cached,
        Self::SwapCached,
        Self::Active,
        Self::Inactive,
        Self::ActiveAnon,
        Self::InactiveAnon,
        Self::ActiveFile,
        Self::InactiveFile,
        Self::Unevictable,
        Self::Mlocked,
        Self::SwapTotal,
        Self::SwapFree,
        Self::Zswap,
        Self::Zswapped,
        Self::Dirty,
        Self::Writeback,
        Self::AnonPages,
        Self::Mapped,
        Self::Shmem,
        Self::KReclaimable,
        Self::Slab,
        Self::SReclaimable,
        Self::SUnreclaim,
        Self::KernelStack,
        Self::PageTables,
    ];

    /// The label used for this counter in `/proc/meminfo` (without the colon).
    pub const fn label(self) -> &'static str {
        match self {
            Self::MemTotal => "MemTotal",
            Self::MemFree => "MemFree",
            Self::MemAvailable => "MemAvailable",
            Self::Buffers => "Buffers",
            Self::Cached => "Cached",
            Self::SwapCached => "SwapCached",
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::ActiveAnon => "Active(anon)",
            Self::InactiveAnon => "Inactive(anon)",
            Self::ActiveFile => "Active(file)",
            Self::InactiveFile => "Inactive(file)",
            Self::Unevictable => "Unevictable",
            Self::Mlocked => "Mlocked",
            Self::SwapTotal => "SwapTotal",
            Self::SwapFree => "SwapFree",
            Self::Zswap => "Zswap",
            Self::Zswapped => "Zswapped",
            Self::Dirty => "Dirty",
            Self::Writeback => "Writeback",
            Self::AnonPages => "AnonPages",
            Self::Mapped => "Mapped",
            Self::Shmem => "Shmem",
            Self::KReclaimable => "KReclaimable",
            Self::Slab => "Slab",
            Self::SReclaimable => "SReclaimable",
            Self::SUnreclaim => "SUnreclaim",
            Self::KernelStack => "KernelStack",
            Self::PageTables => "PageTables",
        }
    }

    /// Looks up a counter by its report label. Unsupported labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stat| stat.label() == label)
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for KernelStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
