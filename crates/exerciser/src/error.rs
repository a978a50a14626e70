// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the exerciser session.

/// Errors that can occur while setting up or driving a session.
#[derive(Debug, thiserror::Error)]
pub enum ExerciserError {
    /// The bucket registries could not be created.
    #[error("failed to init buckets: {0}")]
    Setup(#[from] memory_manager::MemoryError),

    /// The cache-drop control file could not be opened or written.
    #[error("cannot drop caches via {path}: {source}")]
    CacheControl {
        path: String,
        source: std::io::Error,
    },
}
