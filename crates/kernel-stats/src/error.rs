// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for reading the kernel memory report.

/// Errors that can occur when reading the kernel memory report.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Failed to read the procfs file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },
}
