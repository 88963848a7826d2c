// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Raw payload extraction.
//!
//! A layer's first blob is its weights, the second its biases. Each is
//! written to the sink as a flat little-endian f32 byte buffer under
//! `<layer>_w` / `<layer>_b`; shape metadata travels separately via the
//! registered variables.

use crate::canon::ir_name;
use caffe_model::RawLayer;
use nnir_graph::IrGraph;

/// Registers a layer's raw payloads with the graph sink.
///
/// No-op for layers without blobs.
pub fn extract_binaries(layer: &RawLayer, graph: &mut IrGraph) {
    if layer.blobs.is_empty() {
        return;
    }
    let layer_name = ir_name(&layer.name);
    tracing::debug!("extracting binaries from '{layer_name}'");

    if let Some(weights) = layer.blobs.first() {
        graph.add_binary(format!("{layer_name}_w"), pack_f32(weights));
    }
    if let Some(bias) = layer.blobs.get(1) {
        graph.add_binary(format!("{layer_name}_b"), pack_f32(bias));
    }
}

/// Packs f32 values into a flat little-endian byte buffer.
fn pack_f32(values: &[f32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(values.len() * 4);
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}
