// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The derived memory report and its text rendering.

use kernel_stats::KernelMemoryTable;
use memory_manager::PoolUsage;
use std::fmt;

/// Totals this process has allocated itself, per mechanism.
///
/// Heap and mapping totals are in GiB except the small heap, which is in
/// MiB. Each is `(entry_size >> shift) * entry_count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SelfAllocated {
    pub large_heap_gib: u64,
    pub small_heap_mib: u64,
    pub anonymous_map_gib: u64,
    pub shared_map_gib: u64,
}

/// Memory accounting derived from kernel counters and pool usage.
///
/// All kernel-derived values are in MiB and signed: [`other`](Self::other)
/// can go below zero when kernel counters overlap, and is reported as is.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DerivedReport {
    pub mem_total: i64,
    /// `MemTotal - MemFree`.
    pub mem_used: i64,
    pub swap_total: i64,
    /// `SwapTotal - SwapFree`.
    pub swap_used: i64,
    pub cached: i64,
    pub buffers: i64,
    pub swap_cached: i64,
    pub anon_pages: i64,
    pub slab_reclaimable: i64,
    pub slab_unreclaimable: i64,
    pub page_tables: i64,
    pub kernel_stack: i64,
    /// Used memory not attributed to any itemised consumer.
    pub other: i64,
    /// `Active(file) + Inactive(file)`.
    pub lru_file: i64,
    /// `Active(anon) + Inactive(anon)`.
    pub lru_anon: i64,
    pub unevictable: i64,
    pub shmem: i64,
    pub allocated: SelfAllocated,
    /// Raw counters the report was derived from.
    pub kernel: KernelMemoryTable,
    /// Pool usage the report was derived from.
    pub pools: PoolUsage,
}

impl fmt::Display for DerivedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--")?;
        writeln!(
            f,
            "Buddy {}/{}M Swap {}/{}M",
            self.mem_used, self.mem_total, self.swap_used, self.swap_total
        )?;
        writeln!(
            f,
            "Cached/Buffers/SwapCached {}/{}/{}M AnonPages {}M Slab {}+{}M PageTables {}M \
             KernelStack {}M Other {}M",
            self.cached,
            self.buffers,
            self.swap_cached,
            self.anon_pages,
            self.slab_reclaimable,
            self.slab_unreclaimable,
            self.page_tables,
            self.kernel_stack,
            self.other,
        )?;
        writeln!(
            f,
            "LRU File/Anon/Unevictable {}/{}/{} Shmem {}M",
            self.lru_file, self.lru_anon, self.unevictable, self.shmem
        )?;
        write!(
            f,
            "Allocated {}G+{}M, anon {}G, shmem {}G",
            self.allocated.large_heap_gib,
            self.allocated.small_heap_mib,
            self.allocated.anonymous_map_gib,
            self.allocated.shared_map_gib,
        )
    }
}
