// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Network boundary extraction.
//!
//! The input boundary is resolved before the main pass runs; the output
//! boundary afterwards, from the last emitted record.

use crate::builder::LayerRecord;
use crate::canon::ir_name;
use crate::error::LowerError;
use caffe_model::NetModel;
use indexmap::IndexMap;
use nnir_graph::{IrGraph, IrTensor};
use tensor_core::{DType, Shape};

/// Determines the single network input, declares it on the sink, and
/// returns it as the seed input map for the builder.
///
/// Resolution order:
/// 1. the model's declared top-level input, if any;
/// 2. the first layer's declared output (or its own name) when the first
///    layer is an input placeholder;
/// 3. the first layer's first declared input, else its first output.
///
/// The shape always comes from the caller-supplied `input_dims`.
pub fn extract_input(
    model: &NetModel,
    input_dims: &Shape,
    graph: &mut IrGraph,
) -> Result<IndexMap<String, Shape>, LowerError> {
    let first = model.layers.first().ok_or(LowerError::EmptyModel)?;

    let input_name = if let Some(declared) = model.inputs.first() {
        ir_name(declared)
    } else if first.kind.is_placeholder() {
        match first.tops.first() {
            Some(top) => ir_name(top),
            None => ir_name(&first.name),
        }
    } else if let Some(bottom) = first.bottoms.first() {
        ir_name(bottom)
    } else if let Some(top) = first.tops.first() {
        ir_name(top)
    } else {
        return Err(LowerError::MissingBoundary(format!(
            "first layer '{}' declares no blobs",
            first.name,
        )));
    };

    tracing::info!("network input '{input_name}' {input_dims}");
    graph.add_input(IrTensor::new(
        input_name.clone(),
        DType::F32,
        input_dims.clone(),
    ));

    let mut inputs = IndexMap::new();
    inputs.insert(input_name, input_dims.clone());
    Ok(inputs)
}

/// Declares the last emitted record's sole output as the network output.
pub fn extract_output(records: &[LayerRecord], graph: &mut IrGraph) -> Result<(), LowerError> {
    let last = records
        .last()
        .ok_or_else(|| LowerError::MissingBoundary("no nodes were emitted".into()))?;
    let (name, shape) = last.outputs.first().ok_or_else(|| {
        LowerError::MissingBoundary(format!("node '{}' has no outputs", last.name))
    })?;

    tracing::info!("network output '{name}' {shape}");
    graph.add_output(IrTensor::new(name.clone(), DType::F32, shape.clone()));
    Ok(())
}
