// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON model manifest parsing.
//!
//! The manifest (`model.json`) holds the decoded layer list: names,
//! kinds, blob topology, typed parameters, and — for layers with
//! payloads — the tensor names to pull from `model.safetensors`.
//!
//! # Format
//! ```json
//! {
//!   "name": "squeezenet",
//!   "input": ["data"],
//!   "layers": [
//!     {
//!       "name": "conv1",
//!       "type": "Convolution",
//!       "bottom": ["data"],
//!       "top": ["conv1"],
//!       "blobs": ["conv1.weight", "conv1.bias"],
//!       "convolution_param": { "num_output": 64, "kernel_size": [3], "pad": [1] }
//!     },
//!     ...
//!   ]
//! }
//! ```

use crate::params::{
    BatchNormParam, ConvolutionParam, InnerProductParam, LrnParam, PoolingParam, ReluParam,
};
use crate::{LayerKind, ModelError};
use std::path::Path;

/// Top-level model manifest, deserialized from `model.json`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NetManifest {
    /// Model name.
    pub name: String,
    /// Declared top-level input blob names.
    #[serde(default)]
    pub input: Vec<String>,
    /// Layer entries in source order.
    pub layers: Vec<ManifestLayer>,
}

/// A single layer entry in the manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ManifestLayer {
    /// Layer name.
    pub name: String,
    /// Operator kind (Caffe spelling).
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Input blob names.
    #[serde(default)]
    pub bottom: Vec<String>,
    /// Output blob names.
    #[serde(default)]
    pub top: Vec<String>,
    /// Payload tensor names in the weights file (weights, then biases).
    #[serde(default)]
    pub blobs: Vec<String>,
    /// Convolution/Deconvolution parameters.
    #[serde(default, rename = "convolution_param")]
    pub convolution: Option<ConvolutionParam>,
    /// Pooling parameters.
    #[serde(default, rename = "pooling_param")]
    pub pooling: Option<PoolingParam>,
    /// LRN parameters.
    #[serde(default, rename = "lrn_param")]
    pub lrn: Option<LrnParam>,
    /// BatchNorm parameters.
    #[serde(default, rename = "batch_norm_param")]
    pub batch_norm: Option<BatchNormParam>,
    /// ReLU parameters.
    #[serde(default, rename = "relu_param")]
    pub relu: Option<ReluParam>,
    /// InnerProduct parameters.
    #[serde(default, rename = "inner_product_param")]
    pub inner_product: Option<InnerProductParam>,
}

impl NetManifest {
    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }
}
