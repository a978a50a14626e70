// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Kernel memory counters parsed from `/proc/meminfo`.
//!
//! The report is one counter per line in the form `Label:   12345 kB`.
//! Values are collected in kibibytes during a single pass over the text
//! and converted to mebibytes once at the end.

use crate::{KernelStat, MonitorError};
use std::path::Path;

/// Default path to the kernel memory info file.
pub const MEMINFO_PATH: &str = "/proc/meminfo";

/// Converts a kibibyte count to mebibytes, rounding to nearest.
///
/// A non-zero input never rounds down to zero: anything below half a
/// mebibyte reports as `1`.
pub fn kib_to_mib(kib: u64) -> u64 {
    let mib = kib.saturating_add(512) / 1024;
    if mib == 0 && kib != 0 {
        1
    } else {
        mib
    }
}

/// A full set of kernel memory counters, in mebibytes.
///
/// Every [`KernelStat`] has a value; counters absent from the report are
/// zero. A table is always built from a single complete read, never merged
/// with an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelMemoryTable {
    values: [u64; KernelStat::COUNT],
}

impl KernelMemoryTable {
    /// A table with every counter at zero.
    pub fn zeroed() -> Self {
        Self {
            values: [0; KernelStat::COUNT],
        }
    }

    /// Builds a table from `(counter, mebibytes)` pairs. Unlisted counters
    /// are zero; later pairs overwrite earlier ones.
    pub fn from_mib<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (KernelStat, u64)>,
    {
        let mut table = Self::zeroed();
        for (stat, mib) in values {
            table.values[stat.index()] = mib;
        }
        table
    }

    /// Reads the current counters from `/proc/meminfo`.
    ///
    /// Never fails: an unreadable report yields [`KernelMemoryTable::zeroed()`].
    pub fn read() -> Self {
        Self::read_from(Path::new(MEMINFO_PATH))
    }

    /// Reads counters from a specific file, falling back to all zeroes.
    pub fn read_from(path: &Path) -> Self {
        Self::try_read_from(path).unwrap_or_else(|e| {
            tracing::debug!("{e}; reporting all counters as zero");
            Self::zeroed()
        })
    }

    /// Reads counters from a specific file, reporting I/O failure.
    ///
    /// Invalid UTF-8 only spoils the lines it appears on.
    pub fn try_read_from(path: &Path) -> Result<Self, MonitorError> {
        let bytes = std::fs::read(path).map_err(|e| MonitorError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Parses the content of a `/proc/meminfo`-formatted string.
    ///
    /// Lines with an unsupported label or a non-numeric value are skipped.
    /// If a label appears more than once the last occurrence wins.
    pub fn parse(content: &str) -> Self {
        let mut kib = [0u64; KernelStat::COUNT];

        for line in content.lines() {
            if let Some((stat, value)) = parse_line(line) {
                kib[stat.index()] = value;
            }
        }

        Self {
            values: kib.map(kib_to_mib),
        }
    }

    /// Returns a counter's value in mebibytes.
    pub fn get(&self, stat: KernelStat) -> u64 {
        self.values[stat.index()]
    }

    /// Iterates over every counter in report order.
    pub fn iter(&self) -> impl Iterator<Item = (KernelStat, u64)> + '_ {
        KernelStat::ALL.into_iter().map(|stat| (stat, self.get(stat)))
    }
}

impl Default for KernelMemoryTable {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl serde::Serialize for KernelMemoryTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(stat, mib)| (stat.label(), mib)))
    }
}

/// Splits `Label:  123 kB` into a supported counter and its raw kB value.
fn parse_line(line: &str) -> Option<(KernelStat, u64)> {
    let (label, rest) = line.split_once(':')?;
    let stat = KernelStat::from_label(label.trim())?;
    let value = rest.split_whitespace().next()?.parse::<u64>().ok()?;
    Some((stat, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_MEMINFO: &str = "\
MemTotal:        3884292 kB
MemFree:          218456 kB
MemAvailable:    2456780 kB
Buffers:          123456 kB
Cached:          1987654 kB
SwapCached:            0 kB
Active:          1234567 kB
Inactive:         876543 kB
Active(anon):     412340 kB
Inactive(anon):    10240 kB
Active(file):     822227 kB
Inactive(file):   866303 kB
Unevictable:          16 kB
SwapTotal:       2097148 kB
SwapFree:        2097148 kB
AnonPages:        420000 kB
Shmem:             20480 kB
Slab:             150000 kB
SReclaimable:     100000 kB
SUnreclaim:        50000 kB
KernelStack:        8192 kB
PageTables:        12288 kB
HugePages_Total:       0
Hugepagesize:       2048 kB
DirectMap4k:      184320 kB
";

    #[test]
    fn test_parse_meminfo() {
        let t = KernelMemoryTable::parse(SAMPLE_MEMINFO);
        // 3884292 kB ≈ 3793.25 MiB
        assert_eq!(t.get(KernelStat::MemTotal), 3793);
        assert_eq!(t.get(KernelStat::MemFree), 213);
        assert_eq!(t.get(KernelStat::ActiveAnon), 403);
        assert_eq!(t.get(KernelStat::InactiveFile), 846);
        assert_eq!(t.get(KernelStat::KernelStack), 8);
        assert_eq!(t.get(KernelStat::PageTables), 12);
    }

    #[test]
    fn test_absent_counters_are_zero() {
        let t = KernelMemoryTable::parse(SAMPLE_MEMINFO);
        assert_eq!(t.get(KernelStat::Zswap), 0);
        assert_eq!(t.get(KernelStat::Mlocked), 0);
        assert_eq!(t.get(KernelStat::SwapCached), 0);
    }

    #[test]
    fn test_small_values_round_up() {
        let t = KernelMemoryTable::parse(SAMPLE_MEMINFO);
        // 16 kB is well under half a MiB but must not vanish.
        assert_eq!(t.get(KernelStat::Unevictable), 1);
    }

    #[test]
    fn test_kib_to_mib() {
        assert_eq!(kib_to_mib(0), 0);
        assert_eq!(kib_to_mib(1), 1);
        assert_eq!(kib_to_mib(511), 1);
        assert_eq!(kib_to_mib(512), 1);
        assert_eq!(kib_to_mib(1024), 1);
        assert_eq!(kib_to_mib(1535), 1);
        assert_eq!(kib_to_mib(1536), 2);
        assert_eq!(kib_to_mib(2048), 2);
        assert_eq!(kib_to_mib(u64::MAX), u64::MAX / 1024);
    }

    #[test]
    fn test_duplicate_label_last_wins() {
        let t = KernelMemoryTable::parse("MemFree: 1024 kB\nMemFree: 4096 kB\n");
        assert_eq!(t.get(KernelStat::MemFree), 4);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let content = "\
garbage without colon
MemTotal: lots kB
MemFree:
Cached:   2048 kB
: 100 kB
Buffers 1024 kB
";
        let t = KernelMemoryTable::parse(content);
        assert_eq!(t.get(KernelStat::MemTotal), 0);
        assert_eq!(t.get(KernelStat::MemFree), 0);
        assert_eq!(t.get(KernelStat::Buffers), 0);
        assert_eq!(t.get(KernelStat::Cached), 2);
    }

    #[test]
    fn test_prefix_labels_do_not_collide() {
        // "SwapCached" must not feed "Cached", nor "Active(anon)" feed "Active".
        let t = KernelMemoryTable::parse("SwapCached: 2048 kB\nActive(anon): 3072 kB\n");
        assert_eq!(t.get(KernelStat::Cached), 0);
        assert_eq!(t.get(KernelStat::SwapCached), 2);
        assert_eq!(t.get(KernelStat::Active), 0);
        assert_eq!(t.get(KernelStat::ActiveAnon), 3);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(KernelMemoryTable::parse(""), KernelMemoryTable::zeroed());
    }

    #[test]
    fn test_read_from_file() {
        let dir = std::env::temp_dir().join("memload_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("meminfo_kernel_stats_test");
        std::fs::write(&path, SAMPLE_MEMINFO).unwrap();
        let t = KernelMemoryTable::read_from(&path);
        assert_eq!(t.get(KernelStat::MemTotal), 3793);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_utf8_only_skips_its_line() {
        let dir = std::env::temp_dir().join("memload_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("meminfo_invalid_utf8");
        let mut content = b"MemTotal: 2048 kB\n".to_vec();
        content.extend_from_slice(b"Bogus\xff\xfe: 12 kB\n");
        content.extend_from_slice(b"MemFree: 1024 kB\n");
        std::fs::write(&path, &content).unwrap();

        let t = KernelMemoryTable::try_read_from(&path).unwrap();
        assert_eq!(t.get(KernelStat::MemTotal), 2);
        assert_eq!(t.get(KernelStat::MemFree), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_reads_as_zero() {
        let path = Path::new("/nonexistent/memload/meminfo");
        assert!(matches!(
            KernelMemoryTable::try_read_from(path),
            Err(MonitorError::ReadError { .. })
        ));
        assert_eq!(KernelMemoryTable::read_from(path), KernelMemoryTable::zeroed());
    }

    #[test]
    fn test_from_mib() {
        let t = KernelMemoryTable::from_mib([(KernelStat::MemTotal, 1000), (KernelStat::MemFree, 400)]);
        assert_eq!(t.get(KernelStat::MemTotal), 1000);
        assert_eq!(t.get(KernelStat::MemFree), 400);
        assert_eq!(t.get(KernelStat::Cached), 0);
    }

    #[test]
    fn test_iter_covers_every_counter() {
        let t = KernelMemoryTable::parse(SAMPLE_MEMINFO);
        let stats: Vec<_> = t.iter().map(|(s, _)| s).collect();
        assert_eq!(stats, KernelStat::ALL.to_vec());
    }

    #[test]
    fn test_serialize_uses_labels() {
        let t = KernelMemoryTable::from_mib([(KernelStat::ActiveAnon, 7)]);
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(json["Active(anon)"], 7);
        assert_eq!(json["MemTotal"], 0);
    }

    #[test]
    fn test_read_real_meminfo() {
        // Runs against the host; only meaningful on Linux.
        if Path::new(MEMINFO_PATH).exists() {
            let t = KernelMemoryTable::read();
            assert!(t.get(KernelStat::MemTotal) > 0);
            assert!(t.get(KernelStat::MemFree) <= t.get(KernelStat::MemTotal));
        }
    }
}
