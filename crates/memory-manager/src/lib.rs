// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memory-manager
//!
//! Fixed-capacity allocation buckets that obtain memory from the OS through
//! distinct mechanisms, so the effect of each on kernel counters can be
//! observed.
//!
//! # Key Components
//!
//! - [`AllocationMechanism`] — how a bucket gets its memory: private heap
//!   (large or small entries), an anonymous private mapping, or a
//!   memfd-backed shared mapping.
//! - [`PoolConfig`] / [`BucketSpec`] — compiled-in entry sizes and capacities.
//! - [`Bucket`] — owns every live entry of one mechanism and releases them
//!   strictly last-in, first-out.
//! - [`BucketSet`] — the four independent buckets of a session.
//! - [`BucketStats`] — per-bucket counters (acquires, declines, OS failures).
//!
//! # Ownership Model
//!
//! ```text
//! Bucket::acquire()
//!       │
//!       ▼
//!   Region  ◄─── Heap(Vec<u8>) | Anonymous(Mapping) | Shared { Mapping, OwnedFd }
//!       │
//!       │  Bucket::release()  (pop from the end)
//!       ▼
//!   drop(Region)  ──► free / munmap (+ close)
//! ```
//!
//! A region is never shared or aliased; dropping it is the release. The
//! shared mapping keeps its memfd next to the mapping instead of inside it.
//!
//! # Example
//! ```
//! use memory_manager::{AllocationMechanism, Bucket, BucketSpec};
//!
//! let mut bucket = Bucket::new(
//!     AllocationMechanism::AnonymousMap,
//!     BucketSpec::new(4096, 2),
//! )
//! .unwrap();
//!
//! assert!(bucket.acquire());
//! assert!(bucket.acquire());
//! assert!(!bucket.acquire()); // saturated
//! assert_eq!(bucket.len(), 2);
//!
//! bucket.reset();
//! assert!(bucket.is_empty());
//! ```

mod bucket;
mod error;
mod mechanism;
mod region;
mod set;
mod stats;

pub use bucket::Bucket;
pub use error::MemoryError;
pub use mechanism::{AllocationMechanism, BucketSpec, PoolConfig, SizeUnit, GIB, MIB};
pub use set::{BucketSet, BucketUsage, PoolUsage};
pub use stats::BucketStats;
