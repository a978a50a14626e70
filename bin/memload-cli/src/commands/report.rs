// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `memload report`: print the memory report once.
//!
//! Runs with empty buckets, so the self-allocated totals are zero. Does not
//! touch the terminal, which makes it usable from scripts and pipes.

use exerciser::derive;
use kernel_stats::KernelMemoryTable;
use memory_manager::{PoolConfig, PoolUsage};

pub fn execute(json: bool) -> anyhow::Result<()> {
    let table = KernelMemoryTable::read();
    let report = derive(&table, &PoolUsage::empty(&PoolConfig::default()));

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}
