// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model decoding.

/// Errors that can occur while loading a source model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model manifest file could not be read.
    #[error("failed to read manifest: {0}")]
    ManifestReadError(#[from] std::io::Error),

    /// The manifest JSON is malformed.
    #[error("failed to parse manifest: {0}")]
    ManifestParseError(#[from] serde_json::Error),

    /// A blob tensor referenced by a layer was not found in the weights file.
    #[error("blob tensor '{name}' for layer '{layer}' not found in weights file")]
    BlobNotFound { layer: String, name: String },

    /// The weights file could not be opened or parsed.
    #[error("failed to load weights: {0}")]
    WeightsError(String),

    /// A blob tensor has an element type other than f32.
    #[error("blob tensor '{name}' has unsupported dtype {dtype}")]
    BlobTypeError { name: String, dtype: String },
}
