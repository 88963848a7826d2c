// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for IR graph construction and persistence.

/// Errors that can occur when building or writing an IR graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Writing the graph folder failed.
    #[error("failed to write graph to '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialising the graph descriptor failed.
    #[error("failed to serialise graph: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// A node replacement referenced an index that does not exist.
    #[error("node index {index} out of range (graph has {len} nodes)")]
    NodeIndexError { index: usize, len: usize },
}
