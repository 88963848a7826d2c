// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model loading from manifest + SafeTensors files.
//!
//! A model directory contains:
//! - `model.json` — the decoded layer list (see [`NetManifest`]).
//! - `model.safetensors` — raw f32 blob payloads, keyed by the tensor
//!   names each manifest layer lists under `blobs`.
//!
//! The weights file is memory-mapped and only the tensors a layer
//! actually references are copied out. A missing weights file is
//! tolerated as long as no layer lists a blob (topology-only models are
//! useful for shape debugging).

use crate::{ManifestLayer, ModelError, NetManifest, NetModel, RawLayer};
use std::collections::HashMap;
use std::path::Path;

/// Default manifest filename.
const MANIFEST_FILE: &str = "model.json";

/// Default SafeTensors filename.
const WEIGHTS_FILE: &str = "model.safetensors";

/// Loads a source model from disk into a [`NetModel`].
pub struct ModelLoader;

impl ModelLoader {
    /// Loads a model from the given directory.
    ///
    /// Steps:
    /// 1. Parse `model.json`.
    /// 2. Memory-map `model.safetensors` (if present) and extract every
    ///    blob tensor referenced by a layer.
    /// 3. Assemble [`RawLayer`]s with their payloads attached.
    pub fn load(model_dir: &Path) -> Result<NetModel, ModelError> {
        let manifest = NetManifest::from_file(&model_dir.join(MANIFEST_FILE))?;
        let blobs = Self::read_blob_data(model_dir)?;
        Self::from_manifest_and_blobs(&manifest, &blobs)
    }

    /// Assembles a model from a manifest and a pre-built blob map.
    ///
    /// Useful for testing without actual SafeTensors files.
    pub fn from_manifest_and_blobs(
        manifest: &NetManifest,
        blobs: &HashMap<String, Vec<f32>>,
    ) -> Result<NetModel, ModelError> {
        let mut layers = Vec::with_capacity(manifest.layers.len());
        for entry in &manifest.layers {
            layers.push(Self::build_layer(entry, blobs)?);
        }
        tracing::debug!(
            "decoded model '{}': {} layers, {} declared inputs",
            manifest.name,
            layers.len(),
            manifest.input.len(),
        );
        Ok(NetModel {
            name: manifest.name.clone(),
            inputs: manifest.input.clone(),
            layers,
        })
    }

    /// Reads every f32 tensor from the SafeTensors file.
    ///
    /// Returns an empty map when the file does not exist.
    fn read_blob_data(model_dir: &Path) -> Result<HashMap<String, Vec<f32>>, ModelError> {
        let weights_path = model_dir.join(WEIGHTS_FILE);
        if !weights_path.exists() {
            tracing::warn!(
                "weights file '{}' not found, loading topology only",
                weights_path.display(),
            );
            return Ok(HashMap::new());
        }

        let file = std::fs::File::open(&weights_path).map_err(|e| {
            ModelError::WeightsError(format!("cannot open '{}': {e}", weights_path.display()))
        })?;
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| ModelError::WeightsError(format!("mmap failed: {e}")))?;
        let tensors = safetensors::SafeTensors::deserialize(&mmap)
            .map_err(|e| ModelError::WeightsError(format!("SafeTensors parse error: {e}")))?;

        let mut blobs = HashMap::new();
        for (name, view) in tensors.tensors() {
            if view.dtype() != safetensors::Dtype::F32 {
                return Err(ModelError::BlobTypeError {
                    name: name.clone(),
                    dtype: format!("{:?}", view.dtype()),
                });
            }
            let data = view
                .data()
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            blobs.insert(name.clone(), data);
        }
        tracing::info!(
            "read {} blob tensors from '{}'",
            blobs.len(),
            weights_path.display(),
        );
        Ok(blobs)
    }

    /// Builds one [`RawLayer`], resolving its listed blob names.
    fn build_layer(
        entry: &ManifestLayer,
        blobs: &HashMap<String, Vec<f32>>,
    ) -> Result<RawLayer, ModelError> {
        let mut data = Vec::with_capacity(entry.blobs.len());
        for blob_name in &entry.blobs {
            let payload = blobs.get(blob_name).ok_or_else(|| ModelError::BlobNotFound {
                layer: entry.name.clone(),
                name: blob_name.clone(),
            })?;
            data.push(payload.clone());
        }

        Ok(RawLayer {
            name: entry.name.clone(),
            kind: entry.kind,
            bottoms: entry.bottom.clone(),
            tops: entry.top.clone(),
            blobs: data,
            convolution: entry.convolution.clone(),
            pooling: entry.pooling.clone(),
            lrn: entry.lrn.clone(),
            batch_norm: entry.batch_norm.clone(),
            relu: entry.relu.clone(),
            inner_product: entry.inner_product.clone(),
        })
    }
}
