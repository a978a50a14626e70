// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Derivation of the report from raw counters.
//!
//! Pure counter arithmetic: nothing is cached between calls and neither
//! input is modified.

use crate::{DerivedReport, SelfAllocated};
use kernel_stats::{KernelMemoryTable, KernelStat};
use memory_manager::{AllocationMechanism, PoolUsage};

/// Combines kernel counters with pool usage into a [`DerivedReport`].
pub fn derive(table: &KernelMemoryTable, pools: &PoolUsage) -> DerivedReport {
    let mib = |stat| signed(table.get(stat));

    let mem_total = mib(KernelStat::MemTotal);
    let mem_used = mem_total - mib(KernelStat::MemFree);
    let swap_total = mib(KernelStat::SwapTotal);
    let swap_used = swap_total - mib(KernelStat::SwapFree);

    let cached = mib(KernelStat::Cached);
    let buffers = mib(KernelStat::Buffers);
    let swap_cached = mib(KernelStat::SwapCached);
    let anon_pages = mib(KernelStat::AnonPages);
    let slab_reclaimable = mib(KernelStat::SReclaimable);
    let slab_unreclaimable = mib(KernelStat::SUnreclaim);
    let page_tables = mib(KernelStat::PageTables);
    let kernel_stack = mib(KernelStat::KernelStack);

    let itemised = cached
        + buffers
        + swap_cached
        + anon_pages
        + slab_reclaimable
        + slab_unreclaimable
        + page_tables
        + kernel_stack;

    DerivedReport {
        mem_total,
        mem_used,
        swap_total,
        swap_used,
        cached,
        buffers,
        swap_cached,
        anon_pages,
        slab_reclaimable,
        slab_unreclaimable,
        page_tables,
        kernel_stack,
        other: mem_used - itemised,
        lru_file: mib(KernelStat::ActiveFile) + mib(KernelStat::InactiveFile),
        lru_anon: mib(KernelStat::ActiveAnon) + mib(KernelStat::InactiveAnon),
        unevictable: mib(KernelStat::Unevictable),
        shmem: mib(KernelStat::Shmem),
        allocated: self_allocated(pools),
        kernel: *table,
        pools: pools.clone(),
    }
}

fn self_allocated(pools: &PoolUsage) -> SelfAllocated {
    let total = |mechanism: AllocationMechanism| {
        let usage = pools.get(mechanism);
        let unit = mechanism.report_unit();
        ((usage.entry_size as u64) >> unit.shift()) * usage.entry_count as u64
    };

    SelfAllocated {
        large_heap_gib: total(AllocationMechanism::LargeHeap),
        small_heap_mib: total(AllocationMechanism::SmallHeap),
        anonymous_map_gib: total(AllocationMechanism::AnonymousMap),
        shared_map_gib: total(AllocationMechanism::SharedMap),
    }
}

/// Saturates at `i64::MAX`.
fn signed(mib: u64) -> i64 {
    i64::try_from(mib).unwrap_or(i64::MAX)
}
