// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # kernel-stats
//!
//! Reads the kernel's memory-info report (`/proc/meminfo`) into a typed
//! table of counters, normalised to mebibytes.
//!
//! # Counters
//! Only the labels enumerated by [`KernelStat`] are captured. Everything
//! else in the report (hugepage counters, vmalloc, direct map sizes, ...)
//! is skipped without error.
//!
//! # Graceful Degradation
//! [`KernelMemoryTable::read()`] never fails. If the report cannot be read
//! (not Linux, procfs not mounted, sandboxed), every counter reads as zero
//! and the failure is logged at debug level. Callers that want to see the
//! error use [`KernelMemoryTable::try_read_from()`].
//!
//! # Example
//! ```no_run
//! use kernel_stats::{KernelMemoryTable, KernelStat};
//!
//! let table = KernelMemoryTable::read();
//! println!("MemTotal: {} MiB", table.get(KernelStat::MemTotal));
//! ```

mod error;
mod stat;
mod table;

pub use error::MonitorError;
pub use stat::KernelStat;
pub use table::{kib_to_mib, KernelMemoryTable, MEMINFO_PATH};
