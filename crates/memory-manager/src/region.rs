// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII memory regions obtained from the OS.
//!
//! A [`Region`] owns exactly one bucket entry. Dropping it returns the
//! memory: the heap variant frees its `Vec`, the mapped variants `munmap`,
//! and the shared variant closes its memfd after unmapping.

use crate::mechanism::Backing;
use crate::{AllocationMechanism, MemoryError};
use rustix::fd::OwnedFd;
use rustix::fs::{FallocateFlags, MemfdFlags};
use rustix::mm::{MapFlags, ProtFlags};
use std::ptr::NonNull;

/// Name given to every memfd (visible in `/proc/<pid>/fd/`).
const MEMFD_NAME: &str = "shmem";

/// A live mapping of `len` bytes, unmapped on drop.
pub(crate) struct Mapping {
    ptr: NonNull<u8>,
    len: usize,
}

impl Mapping {
    /// Takes ownership of a region returned by `mmap`.
    ///
    /// # Safety
    /// `ptr` must come from a successful `mmap` of `len` bytes that nothing
    /// else will unmap.
    unsafe fn from_raw(
        ptr: *mut std::ffi::c_void,
        len: usize,
        mechanism: AllocationMechanism,
    ) -> Result<Self, MemoryError> {
        let ptr = NonNull::new(ptr.cast::<u8>()).ok_or(MemoryError::Os {
            mechanism,
            op: "mmap",
            source: rustix::io::Errno::NOMEM,
        })?;
        Ok(Self { ptr, len })
    }

    fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr/len describe a live mapping owned by self.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    fn fill(&mut self, byte: u8) {
        // SAFETY: the mapping is writable, len bytes long and exclusively borrowed.
        unsafe { std::ptr::write_bytes(self.ptr.as_ptr(), byte, self.len) }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: ptr/len came from mmap and no slice into the mapping outlives self.
        if let Err(e) = unsafe { rustix::mm::munmap(self.ptr.as_ptr().cast(), self.len) } {
            tracing::warn!("munmap of {} bytes failed: {e}", self.len);
        }
    }
}

/// One bucket entry: a region of exactly the bucket's entry size.
pub(crate) enum Region {
    Heap(Vec<u8>),
    Anonymous(Mapping),
    // Field order matters: the mapping is dropped before its memfd.
    Shared { mapping: Mapping, _fd: OwnedFd },
}

impl Region {
    /// Obtains `size` bytes through `mechanism` and fills them with `fill`.
    ///
    /// Any resource obtained before a failing step is released before the
    /// error is returned.
    pub(crate) fn acquire(
        mechanism: AllocationMechanism,
        size: usize,
        fill: u8,
    ) -> Result<Self, MemoryError> {
        let mut region = match mechanism.backing() {
            Backing::Heap => Self::heap(mechanism, size, fill)?,
            Backing::Anonymous => Self::Anonymous(map_anonymous(mechanism, size)?),
            Backing::Shared => Self::shared(mechanism, size)?,
        };
        if let Self::Anonymous(mapping) | Self::Shared { mapping, .. } = &mut region {
            mapping.fill(fill);
        }
        Ok(region)
    }

    fn heap(mechanism: AllocationMechanism, size: usize, fill: u8) -> Result<Self, MemoryError> {
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| MemoryError::HeapExhausted { mechanism, size })?;
        data.resize(size, fill);
        Ok(Self::Heap(data))
    }

    fn shared(mechanism: AllocationMechanism, size: usize) -> Result<Self, MemoryError> {
        let fd = rustix::fs::memfd_create(MEMFD_NAME, MemfdFlags::CLOEXEC)
            .map_err(os_error(mechanism, "memfd_create"))?;
        rustix::fs::fallocate(&fd, FallocateFlags::empty(), 0, size as u64)
            .map_err(os_error(mechanism, "fallocate"))?;

        // SAFETY: a fresh mapping of a memfd sized to `size`; ownership passes to Mapping.
        let mapping = unsafe {
            let ptr = rustix::mm::mmap(
                std::ptr::null_mut(),
                size,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                &fd,
                0,
            )
            .map_err(os_error(mechanism, "mmap"))?;
            Mapping::from_raw(ptr, size, mechanism)?
        };

        Ok(Self::Shared { mapping, _fd: fd })
    }

    /// The entry's bytes.
    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            Self::Heap(data) => data.as_slice(),
            Self::Anonymous(mapping) | Self::Shared { mapping, .. } => mapping.as_slice(),
        }
    }
}

fn map_anonymous(mechanism: AllocationMechanism, size: usize) -> Result<Mapping, MemoryError> {
    // SAFETY: a fresh private mapping not aliased by anything; ownership passes to Mapping.
    unsafe {
        let ptr = rustix::mm::mmap_anonymous(
            std::ptr::null_mut(),
            size,
            ProtFlags::READ | ProtFlags::WRITE,
            MapFlags::PRIVATE,
        )
        .map_err(os_error(mechanism, "mmap"))?;
        Mapping::from_raw(ptr, size, mechanism)
    }
}

fn os_error(
    mechanism: AllocationMechanism,
    op: &'static str,
) -> impl FnOnce(rustix::io::Errno) -> MemoryError {
    move |source| MemoryError::Os {
        mechanism,
        op,
        source,
    }
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Heap(_) => "heap",
            Self::Anonymous(_) => "anonymous",
            Self::Shared { .. } => "shared",
        };
        f.debug_struct("Region")
            .field("kind", &kind)
            .field("len", &self.as_slice().len())
            .finish()
    }
}
