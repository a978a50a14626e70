// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # exerciser
//!
//! Drives a memory-pressure session: takes one-character commands,
//! applies them to a [`BucketSet`](memory_manager::BucketSet), and
//! derives a report that puts the kernel's counters next to what this
//! process has allocated itself.
//!
//! # Flow
//! ```text
//! byte ──► Command ──► Session::handle ──► BucketSet (acquire/release/reset)
//!                            │                 │
//!                            │                 ▼
//!                            │            PoolUsage ─┐
//!                            ▼                       ▼
//!                  KernelMemoryTable::read ──► derive() ──► DerivedReport ──► Display
//! ```
//!
//! The session is single-threaded and owns its buckets outright; there is
//! no global state. A session has two states, running and quit, and quit is
//! terminal.
//!
//! # Example
//! ```no_run
//! use exerciser::{Command, Outcome, Session};
//!
//! let mut session = Session::new(Default::default()).unwrap();
//! println!("{}", session.report());
//! if let Outcome::Report(report) = session.handle(Command::from_byte(b'm')) {
//!     println!("{report}");
//! }
//! session.shutdown();
//! ```

mod cache;
mod command;
mod derive;
mod error;
mod report;
mod session;

pub use cache::{CacheControl, ProcDropCaches, DROP_CACHES_PATH};
pub use command::Command;
pub use derive::derive;
pub use error::ExerciserError;
pub use report::{DerivedReport, SelfAllocated};
pub use session::{Outcome, Session, SessionState};
