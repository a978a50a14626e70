// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation mechanisms and their compiled-in bucket sizes.

use std::fmt;

/// One mebibyte in bytes.
pub const MIB: usize = 1 << 20;
/// One gibibyte in bytes.
pub const GIB: usize = 1 << 30;

/// A distinct OS-level way of obtaining memory.
///
/// Private heap memory behaves like `mmap(MAP_PRIVATE | MAP_ANONYMOUS)`; it
/// is not backed by any file. Shared memory behaves like
/// `mmap(MAP_SHARED | MAP_ANONYMOUS)` and is backed by an in-memory file,
/// so the kernel accounts it as `Shmem` rather than `AnonPages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationMechanism {
    /// Heap allocation in large entries.
    LargeHeap,
    /// Heap allocation in small entries.
    SmallHeap,
    /// Anonymous private memory mapping.
    AnonymousMap,
    /// Memfd-backed shared memory mapping.
    SharedMap,
}

/// Memory backing used to satisfy an acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Backing {
    Heap,
    Anonymous,
    Shared,
}

/// Unit in which a mechanism's self-allocated total is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SizeUnit {
    MiB,
    GiB,
}

impl SizeUnit {
    /// Right shift converting bytes to this unit (truncating).
    pub const fn shift(self) -> u32 {
        match self {
            Self::MiB => 20,
            Self::GiB => 30,
        }
    }

    /// Single-letter suffix used in reports.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::MiB => "M",
            Self::GiB => "G",
        }
    }
}

impl AllocationMechanism {
    /// Every mechanism, in bucket order.
    pub const ALL: [AllocationMechanism; 4] = [
        Self::LargeHeap,
        Self::SmallHeap,
        Self::AnonymousMap,
        Self::SharedMap,
    ];

    /// Short name for logs and reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::LargeHeap => "large-heap",
            Self::SmallHeap => "small-heap",
            Self::AnonymousMap => "anonymous-map",
            Self::SharedMap => "shared-map",
        }
    }

    pub(crate) const fn backing(self) -> Backing {
        match self {
            Self::LargeHeap | Self::SmallHeap => Backing::Heap,
            Self::AnonymousMap => Backing::Anonymous,
            Self::SharedMap => Backing::Shared,
        }
    }

    /// Unit for this mechanism's self-allocated total.
    pub const fn report_unit(self) -> SizeUnit {
        match self {
            Self::SmallHeap => SizeUnit::MiB,
            Self::LargeHeap | Self::AnonymousMap | Self::SharedMap => SizeUnit::GiB,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AllocationMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Entry size and capacity of one bucket. Fixed for the bucket's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BucketSpec {
    /// Size of every entry in bytes.
    pub entry_size: usize,
    /// Maximum number of simultaneous entries.
    pub capacity: usize,
}

impl BucketSpec {
    pub const fn new(entry_size: usize, capacity: usize) -> Self {
        Self {
            entry_size,
            capacity,
        }
    }
}

impl fmt::Display for BucketSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.entry_size;
        if size >= GIB && size % GIB == 0 {
            write!(f, "{} x {} GiB", self.capacity, size / GIB)
        } else if size >= MIB && size % MIB == 0 {
            write!(f, "{} x {} MiB", self.capacity, size / MIB)
        } else {
            write!(f, "{} x {} B", self.capacity, size)
        }
    }
}

/// Bucket layout for a whole session.
///
/// [`PoolConfig::default()`] is the compiled-in layout: 1 GiB entries for
/// every mechanism except the small heap, which uses 32 MiB entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PoolConfig {
    pub large_heap: BucketSpec,
    pub small_heap: BucketSpec,
    pub anonymous_map: BucketSpec,
    pub shared_map: BucketSpec,
}

impl PoolConfig {
    /// The same spec for every mechanism.
    pub const fn uniform(spec: BucketSpec) -> Self {
        Self {
            large_heap: spec,
            small_heap: spec,
            anonymous_map: spec,
            shared_map: spec,
        }
    }

    /// Returns the spec for one mechanism.
    pub const fn spec(&self, mechanism: AllocationMechanism) -> BucketSpec {
        match mechanism {
            AllocationMechanism::LargeHeap => self.large_heap,
            AllocationMechanism::SmallHeap => self.small_heap,
            AllocationMechanism::AnonymousMap => self.anonymous_map,
            AllocationMechanism::SharedMap => self.shared_map,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            large_heap: BucketSpec::new(GIB, 256),
            small_heap: BucketSpec::new(32 * MIB, 32),
            anonymous_map: BucketSpec::new(GIB, 256),
            shared_map: BucketSpec::new(GIB, 256),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let c = PoolConfig::default();
        assert_eq!(c.spec(AllocationMechanism::LargeHeap), BucketSpec::new(1 << 30, 256));
        assert_eq!(c.spec(AllocationMechanism::SmallHeap), BucketSpec::new(32 << 20, 32));
        assert_eq!(c.spec(AllocationMechanism::AnonymousMap), BucketSpec::new(1 << 30, 256));
        assert_eq!(c.spec(AllocationMechanism::SharedMap), BucketSpec::new(1 << 30, 256));
    }

    #[test]
    fn test_index_matches_all() {
        for (i, m) in AllocationMechanism::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }

    #[test]
    fn test_report_units() {
        assert_eq!(AllocationMechanism::LargeHeap.report_unit(), SizeUnit::GiB);
        assert_eq!(AllocationMechanism::SmallHeap.report_unit(), SizeUnit::MiB);
        assert_eq!(AllocationMechanism::AnonymousMap.report_unit(), SizeUnit::GiB);
        assert_eq!(AllocationMechanism::SharedMap.report_unit(), SizeUnit::GiB);
        assert_eq!((GIB as u64) >> SizeUnit::GiB.shift(), 1);
        assert_eq!((32 * MIB as u64) >> SizeUnit::MiB.shift(), 32);
    }

    #[test]
    fn test_spec_display() {
        assert_eq!(BucketSpec::new(GIB, 256).to_string(), "256 x 1 GiB");
        assert_eq!(BucketSpec::new(32 * MIB, 32).to_string(), "32 x 32 MiB");
        assert_eq!(BucketSpec::new(4096, 8).to_string(), "8 x 4096 B");
    }

    #[test]
    fn test_serialize_mechanism() {
        let json = serde_json::to_string(&AllocationMechanism::AnonymousMap).unwrap();
        assert_eq!(json, "\"anonymous-map\"");
    }
}
