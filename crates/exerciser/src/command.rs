// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! One-character control commands.
//!
//! | Key | Command |
//! |-----|---------|
//! | `r` | reset every bucket |
//! | `d` | drop page caches |
//! | `g` / `G` | acquire / release large-heap |
//! | `m` / `M` | acquire / release small-heap |
//! | `a` / `A` | acquire / release anonymous mapping |
//! | `s` / `S` | acquire / release shared mapping |
//! | space, CR | refresh the report |
//! | `q`, Ctrl-C | quit |

use memory_manager::AllocationMechanism;

/// End-of-text, sent by Ctrl-C when the terminal is in raw mode.
const ETX: u8 = 0x03;
const CR: u8 = 0x0d;

/// A decoded control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reset,
    DropCaches,
    Acquire(AllocationMechanism),
    Release(AllocationMechanism),
    /// Refresh the report without changing anything.
    Idle,
    Quit,
    /// Any byte without a mapping.
    Unknown(u8),
}

impl Command {
    /// Decodes one input byte.
    pub fn from_byte(byte: u8) -> Self {
        use AllocationMechanism::*;

        match byte {
            b'r' => Self::Reset,
            b'd' => Self::DropCaches,
            b'g' => Self::Acquire(LargeHeap),
            b'G' => Self::Release(LargeHeap),
            b'm' => Self::Acquire(SmallHeap),
            b'M' => Self::Release(SmallHeap),
            b'a' => Self::Acquire(AnonymousMap),
            b'A' => Self::Release(AnonymousMap),
            b's' => Self::Acquire(SharedMap),
            b'S' => Self::Release(SharedMap),
            b' ' | CR => Self::Idle,
            b'q' | ETX => Self::Quit,
            other => Self::Unknown(other),
        }
    }
}
