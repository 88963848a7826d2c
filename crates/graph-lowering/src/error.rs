// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the lowering pass.
//!
//! Every error here is fatal: the pass stops at the first failure and
//! nothing downstream of it is evaluated.

/// Errors that can occur while lowering a source model to the IR graph.
#[derive(Debug, thiserror::Error)]
pub enum LowerError {
    /// A layer's kind has no lowering rule.
    #[error("operation '{kind}' in layer '{layer}' is not supported")]
    UnsupportedOperator { layer: String, kind: String },

    /// An input blob name could not be resolved against the alias tables
    /// or the running output/input maps.
    #[error("unknown dimensions for input '{input}' in layer '{layer}'")]
    UnresolvedInput { layer: String, input: String },

    /// The decoded model has no layers at all.
    #[error("model contains no layers")]
    EmptyModel,

    /// The network input or output boundary could not be determined.
    #[error("cannot determine network boundary: {0}")]
    MissingBoundary(String),

    /// The IR graph sink failed.
    #[error(transparent)]
    Graph(#[from] nnir_graph::GraphError),
}
