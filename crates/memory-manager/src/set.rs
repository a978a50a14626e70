// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The four buckets of a session.
//!
//! [`BucketSet`] routes each request to the bucket of the named mechanism.
//! Buckets share nothing: capacity, entries and counters are per mechanism.

use crate::{AllocationMechanism, Bucket, BucketSpec, BucketStats, MemoryError, PoolConfig};

/// One bucket per [`AllocationMechanism`].
#[derive(Debug)]
pub struct BucketSet {
    buckets: [Bucket; 4],
}

impl BucketSet {
    /// Creates empty buckets with the layout in `config`.
    pub fn new(config: PoolConfig) -> Result<Self, MemoryError> {
        use AllocationMechanism::*;

        let buckets = [
            Bucket::new(LargeHeap, config.spec(LargeHeap))?,
            Bucket::new(SmallHeap, config.spec(SmallHeap))?,
            Bucket::new(AnonymousMap, config.spec(AnonymousMap))?,
            Bucket::new(SharedMap, config.spec(SharedMap))?,
        ];
        tracing::debug!(
            "bucket set ready: large-heap {}, small-heap {}, anonymous-map {}, shared-map {}",
            config.large_heap,
            config.small_heap,
            config.anonymous_map,
            config.shared_map,
        );

        Ok(Self { buckets })
    }

    pub fn bucket(&self, mechanism: AllocationMechanism) -> &Bucket {
        &self.buckets[mechanism.index()]
    }

    pub fn bucket_mut(&mut self, mechanism: AllocationMechanism) -> &mut Bucket {
        &mut self.buckets[mechanism.index()]
    }

    /// Acquires one entry through `mechanism`. Returns `false` if declined.
    pub fn acquire(&mut self, mechanism: AllocationMechanism) -> bool {
        self.bucket_mut(mechanism).acquire()
    }

    /// Releases the newest entry of `mechanism`. Returns `false` if declined.
    pub fn release(&mut self, mechanism: AllocationMechanism) -> bool {
        self.bucket_mut(mechanism).release()
    }

    pub fn try_acquire(&mut self, mechanism: AllocationMechanism) -> Result<usize, MemoryError> {
        self.bucket_mut(mechanism).try_acquire()
    }

    pub fn try_release(&mut self, mechanism: AllocationMechanism) -> Result<usize, MemoryError> {
        self.bucket_mut(mechanism).try_release()
    }

    /// Empties every bucket. Returns the total number of entries released.
    pub fn reset_all(&mut self) -> usize {
        self.buckets.iter_mut().map(Bucket::reset).sum()
    }

    /// Number of live entries across all buckets.
    pub fn total_entries(&self) -> usize {
        self.buckets.iter().map(Bucket::len).sum()
    }

    /// A snapshot of entry sizes and counts, detached from the buckets.
    pub fn usage(&self) -> PoolUsage {
        PoolUsage {
            buckets: self.buckets.each_ref().map(BucketUsage::of),
        }
    }
}

/// Size, count and counters of one bucket at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BucketUsage {
    pub mechanism: AllocationMechanism,
    pub entry_size: usize,
    pub capacity: usize,
    pub entry_count: usize,
    pub stats: BucketStats,
}

impl BucketUsage {
    fn of(bucket: &Bucket) -> Self {
        Self {
            mechanism: bucket.mechanism(),
            entry_size: bucket.entry_size(),
            capacity: bucket.capacity(),
            entry_count: bucket.len(),
            stats: bucket.stats().clone(),
        }
    }

    /// Usage of a bucket holding `entry_count` entries of `spec`.
    pub fn new(mechanism: AllocationMechanism, spec: BucketSpec, entry_count: usize) -> Self {
        Self {
            mechanism,
            entry_size: spec.entry_size,
            capacity: spec.capacity,
            entry_count,
            stats: BucketStats::default(),
        }
    }
}

/// Usage of all four buckets, indexable by mechanism.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PoolUsage {
    buckets: [BucketUsage; 4],
}

impl PoolUsage {
    /// Usage of empty buckets laid out as in `config`.
    pub fn empty(config: &PoolConfig) -> Self {
        Self::with_counts(config, [0; 4])
    }

    /// Usage with explicit entry counts, in [`AllocationMechanism::ALL`] order.
    pub fn with_counts(config: &PoolConfig, counts: [usize; 4]) -> Self {
        Self {
            buckets: AllocationMechanism::ALL
                .map(|m| BucketUsage::new(m, config.spec(m), counts[m.index()])),
        }
    }

    pub fn get(&self, mechanism: AllocationMechanism) -> &BucketUsage {
        &self.buckets[mechanism.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &BucketUsage> {
        self.buckets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::os::unix::fs::MetadataExt;

    fn small_config() -> PoolConfig {
        PoolConfig {
            large_heap: BucketSpec::new(8192, 2),
            small_heap: BucketSpec::new(4096, 3),
            anonymous_map: BucketSpec::new(4096, 2),
            shared_map: BucketSpec::new(4096, 2),
        }
    }

    #[test]
    fn test_buckets_match_config() {
        let set = BucketSet::new(small_config()).unwrap();
        for m in AllocationMechanism::ALL {
            let b = set.bucket(m);
            assert_eq!(b.mechanism(), m);
            assert_eq!(b.spec(), small_config().spec(m));
            assert!(b.is_empty());
        }
    }

    #[test]
    fn test_buckets_are_independent() {
        let mut set = BucketSet::new(small_config()).unwrap();
        assert!(set.acquire(AllocationMechanism::AnonymousMap));
        assert!(set.acquire(AllocationMechanism::AnonymousMap));
        assert!(!set.acquire(AllocationMechanism::AnonymousMap));

        // A full anonymous bucket does not limit the others.
        assert!(set.acquire(AllocationMechanism::SharedMap));
        assert!(set.acquire(AllocationMechanism::SmallHeap));

        assert!(!set.release(AllocationMechanism::LargeHeap));
        assert_eq!(set.bucket(AllocationMechanism::AnonymousMap).len(), 2);
        assert_eq!(set.bucket(AllocationMechanism::SharedMap).len(), 1);
        assert_eq!(set.bucket(AllocationMechanism::SmallHeap).len(), 1);
        assert_eq!(set.bucket(AllocationMechanism::LargeHeap).len(), 0);
        assert_eq!(set.total_entries(), 4);
    }

    #[test]
    fn test_reset_all() {
        let mut set = BucketSet::new(small_config()).unwrap();
        for m in AllocationMechanism::ALL {
            set.acquire(m);
        }
        set.acquire(AllocationMechanism::SmallHeap);

        assert_eq!(set.reset_all(), 5);
        assert_eq!(set.total_entries(), 0);
        for m in AllocationMechanism::ALL {
            assert!(set.bucket(m).is_empty());
        }
        assert_eq!(set.reset_all(), 0);
    }

    /// Inodes of the memfds this process currently holds open.
    fn open_memfd_inodes() -> HashSet<u64> {
        std::fs::read_dir("/proc/self/fd")
            .unwrap()
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                std::fs::read_link(path)
                    .map(|target| target.to_string_lossy().starts_with("/memfd:"))
                    .unwrap_or(false)
            })
            .filter_map(|path| std::fs::metadata(path).ok())
            .map(|meta| meta.ino())
            .collect()
    }

    /// Inode of the file mapped at `addr`, from /proc/self/maps.
    fn mapped_inode(addr: usize) -> Option<u64> {
        let maps = std::fs::read_to_string("/proc/self/maps").ok()?;
        maps.lines().find_map(|line| {
            let mut fields = line.split_whitespace();
            let (start, end) = fields.next()?.split_once('-')?;
            let start = usize::from_str_radix(start, 16).ok()?;
            let end = usize::from_str_radix(end, 16).ok()?;
            if !(start..end).contains(&addr) {
                return None;
            }
            // perms, offset, dev, inode
            fields.nth(3)?.parse().ok()
        })
    }

    /// Addresses and backing inodes of the live shared entries.
    fn shared_entries(set: &BucketSet) -> Vec<(usize, u64)> {
        let bucket = set.bucket(AllocationMechanism::SharedMap);
        (0..bucket.len())
            .map(|i| {
                let addr = bucket.entry(i).unwrap().as_ptr() as usize;
                (addr, mapped_inode(addr).unwrap())
            })
            .collect()
    }

    // Other tests create memfds concurrently, so these track the exact
    // inodes behind our entries rather than a descriptor count.
    #[test]
    fn test_reset_all_closes_shared_handles_and_unmaps() {
        if !std::path::Path::new("/proc/self/fd").exists() {
            return;
        }
        let mut set = BucketSet::new(PoolConfig::uniform(BucketSpec::new(4096, 5))).unwrap();
        for _ in 0..5 {
            assert!(set.acquire(AllocationMechanism::SharedMap));
        }

        let entries = shared_entries(&set);
        let ours: HashSet<u64> = entries.iter().map(|&(_, ino)| ino).collect();
        assert_eq!(ours.len(), 5);
        assert!(ours.is_subset(&open_memfd_inodes()));

        assert_eq!(set.reset_all(), 5);
        assert!(ours.is_disjoint(&open_memfd_inodes()));
        for (addr, _) in entries {
            assert!(mapped_inode(addr).map_or(true, |ino| !ours.contains(&ino)));
        }
    }

    #[test]
    fn test_release_closes_newest_shared_handle() {
        if !std::path::Path::new("/proc/self/fd").exists() {
            return;
        }
        let mut set = BucketSet::new(small_config()).unwrap();
        set.acquire(AllocationMechanism::SharedMap);
        set.acquire(AllocationMechanism::SharedMap);
        let entries = shared_entries(&set);
        let (oldest, newest) = (entries[0].1, entries[1].1);

        assert!(set.release(AllocationMechanism::SharedMap));
        let open = open_memfd_inodes();
        assert!(open.contains(&oldest));
        assert!(!open.contains(&newest));

        assert!(set.release(AllocationMechanism::SharedMap));
        assert!(!open_memfd_inodes().contains(&oldest));
    }

    #[test]
    fn test_try_variants_route_errors() {
        let mut set = BucketSet::new(small_config()).unwrap();
        assert!(matches!(
            set.try_release(AllocationMechanism::SharedMap),
            Err(MemoryError::Empty {
                mechanism: AllocationMechanism::SharedMap
            })
        ));
        assert_eq!(set.try_acquire(AllocationMechanism::SharedMap).unwrap(), 0);
        assert_eq!(set.try_release(AllocationMechanism::SharedMap).unwrap(), 0);
    }

    #[test]
    fn test_usage_snapshot() {
        let mut set = BucketSet::new(small_config()).unwrap();
        set.acquire(AllocationMechanism::LargeHeap);
        set.acquire(AllocationMechanism::SmallHeap);
        set.acquire(AllocationMechanism::SmallHeap);

        let usage = set.usage();
        let large = usage.get(AllocationMechanism::LargeHeap);
        assert_eq!(large.entry_size, 8192);
        assert_eq!(large.entry_count, 1);
        assert_eq!(usage.get(AllocationMechanism::SmallHeap).entry_count, 2);
        assert_eq!(usage.get(AllocationMechanism::SharedMap).entry_count, 0);

        // The snapshot is detached from later changes.
        set.reset_all();
        assert_eq!(usage.get(AllocationMechanism::SmallHeap).entry_count, 2);
    }

    #[test]
    fn test_usage_with_counts() {
        let usage = PoolUsage::with_counts(&PoolConfig::default(), [1, 2, 3, 4]);
        let counts: Vec<_> = usage.iter().map(|u| u.entry_count).collect();
        assert_eq!(counts, vec![1, 2, 3, 4]);
        assert_eq!(PoolUsage::empty(&PoolConfig::default()).get(AllocationMechanism::LargeHeap).entry_count, 0);
    }

    #[test]
    fn test_default_config_builds_without_allocating() {
        // Only the registries are reserved; no entry memory is touched.
        let set = BucketSet::new(PoolConfig::default()).unwrap();
        assert_eq!(set.total_entries(), 0);
        assert_eq!(set.bucket(AllocationMechanism::SmallHeap).capacity(), 32);
    }

    #[test]
    fn test_usage_serializes() {
        let set = BucketSet::new(small_config()).unwrap();
        let json = serde_json::to_value(set.usage()).unwrap();
        assert_eq!(json["buckets"][1]["mechanism"], "small-heap");
        assert_eq!(json["buckets"][1]["capacity"], 3);
    }
}
