// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The graph builder: a single forward pass over the layer list.
//!
//! The builder owns all pass state — the emitted records, the running
//! input/output maps, and the three alias tables — and drives the sink.
//! Per layer it:
//!
//! 1. skips input placeholders (consumed by the input boundary);
//! 2. eliminates `Dropout` and `Split` layers into alias entries;
//! 3. resolves the IR operator (`Pooling` by mode; `Scale` by look-behind:
//!    fused into an immediately preceding `batch_norm`, else `mul`/`muladd`);
//! 4. extracts attributes and resolves every input name through the alias
//!    tables and running maps;
//! 5. infers output/parameter shapes, registers variables and binaries,
//!    and emits the node.
//!
//! A `batch_norm` whose next source layer is `Scale` is recorded but not
//! emitted: the fusion either folds the scale parameters into it and
//! emits the combined node once, or — when the scale arrives through an
//! eliminated layer in between — replaces the already-emitted node.

use crate::attrs::extract_attrs;
use crate::binary::extract_binaries;
use crate::canon::ir_name;
use crate::error::LowerError;
use crate::shapes::infer_dims;
use caffe_model::{LayerKind, PoolMethod, RawLayer};
use indexmap::IndexMap;
use nnir_graph::{IrAttrs, IrGraph, IrNode, IrOp, IrTensor};
use std::collections::HashMap;
use tensor_core::{DType, Shape};

/// One emitted node's bookkeeping record.
#[derive(Debug, Clone)]
pub struct LayerRecord {
    /// Canonical node identity (the layer name, or the scale layer's name
    /// after fusion).
    pub name: String,
    /// IR operator.
    pub op: IrOp,
    /// Resolved inputs with shapes, in resolution order.
    pub inputs: IndexMap<String, Shape>,
    /// The node's single output with its shape.
    pub outputs: IndexMap<String, Shape>,
    /// Extracted attributes.
    pub attrs: IrAttrs,
    /// Own weight variable, if any.
    pub weights: Option<(String, Shape)>,
    /// Own bias variable, if any.
    pub biases: Option<(String, Shape)>,
    /// Fused scale weight variable, if any.
    pub scale_weights: Option<(String, Shape)>,
    /// Fused scale bias variable, if any.
    pub scale_bias: Option<(String, Shape)>,
}

impl LayerRecord {
    /// Builds the IR node for this record.
    ///
    /// Input order: primary inputs, fused scale weight, fused scale bias,
    /// own weights, own biases.
    pub fn to_node(&self) -> IrNode {
        let mut inputs: Vec<String> = self.inputs.keys().cloned().collect();
        if let Some((name, _)) = &self.scale_weights {
            inputs.push(name.clone());
        }
        if let Some((name, _)) = &self.scale_bias {
            inputs.push(name.clone());
        }
        if let Some((name, _)) = &self.weights {
            inputs.push(name.clone());
        }
        if let Some((name, _)) = &self.biases {
            inputs.push(name.clone());
        }
        IrNode::new(
            self.op,
            inputs,
            self.outputs.keys().cloned().collect(),
            self.attrs.clone(),
        )
    }
}

/// The single-pass graph builder.
pub struct GraphBuilder<'g> {
    graph: &'g mut IrGraph,
    /// The declared network input, seeded by the input boundary.
    net_inputs: IndexMap<String, Shape>,
    /// Emitted records in emission order.
    records: Vec<LayerRecord>,
    /// Every output produced so far.
    outputs_map: IndexMap<String, Shape>,
    /// Every input consumed so far.
    inputs_map: IndexMap<String, Shape>,
    /// Eliminated dropout outputs → their source tensor.
    dropout_alias: HashMap<String, String>,
    /// Eliminated split outputs → their source tensor (many to one).
    split_alias: HashMap<String, String>,
    /// Declared output name → canonical node identity.
    output_rename: HashMap<String, String>,
    /// Sink index of the latest record's node; `None` while a
    /// `batch_norm` emission is deferred pending possible fusion.
    last_emitted: Option<usize>,
}

impl<'g> GraphBuilder<'g> {
    /// Creates a builder writing into `graph`, seeded with the network
    /// input map from the input boundary.
    pub fn new(graph: &'g mut IrGraph, net_inputs: IndexMap<String, Shape>) -> Self {
        Self {
            graph,
            net_inputs,
            records: Vec::new(),
            outputs_map: IndexMap::new(),
            inputs_map: IndexMap::new(),
            dropout_alias: HashMap::new(),
            split_alias: HashMap::new(),
            output_rename: HashMap::new(),
            last_emitted: None,
        }
    }

    /// Runs the pass over the layer list and finalizes sink bookkeeping.
    pub fn run(mut self, layers: &[RawLayer]) -> Result<Vec<LayerRecord>, LowerError> {
        for (i, layer) in layers.iter().enumerate() {
            self.process_layer(layer, layers.get(i + 1))?;
        }
        self.graph.update_locals();
        Ok(self.records)
    }

    fn process_layer(
        &mut self,
        layer: &RawLayer,
        next: Option<&RawLayer>,
    ) -> Result<(), LowerError> {
        // Placeholders were consumed by the input boundary.
        if layer.kind.is_placeholder() {
            return Ok(());
        }

        // Copy layers produce no node, only an alias.
        match layer.kind {
            LayerKind::Dropout => {
                self.alias_dropout(layer);
                return Ok(());
            }
            LayerKind::Split => {
                self.alias_split(layer);
                return Ok(());
            }
            _ => {}
        }

        let layer_name = ir_name(&layer.name);
        let mut op = match layer.kind {
            LayerKind::Convolution => IrOp::Conv,
            LayerKind::Deconvolution => IrOp::ConvTranspose,
            LayerKind::BatchNorm => IrOp::BatchNorm,
            LayerKind::InnerProduct => IrOp::Gemm,
            LayerKind::ReLU => IrOp::Relu,
            LayerKind::Lrn => IrOp::Lrn,
            LayerKind::Eltwise => IrOp::Sum,
            LayerKind::Concat => IrOp::Concat,
            LayerKind::Softmax | LayerKind::SoftmaxWithLoss => IrOp::Softmax,
            LayerKind::Pooling => match layer.pooling_param().pool {
                PoolMethod::Max => IrOp::MaxPool,
                PoolMethod::Ave => IrOp::AvgPool,
            },
            LayerKind::Scale => {
                if self.records.last().map(|r| r.op) == Some(IrOp::BatchNorm) {
                    return self.fuse_scale(layer);
                }
                // A standalone scale lowers to an elementwise operator.
                if layer.blobs.len() == 1 {
                    IrOp::Mul
                } else {
                    IrOp::MulAdd
                }
            }
            other => {
                return Err(LowerError::UnsupportedOperator {
                    layer: layer.name.clone(),
                    kind: other.as_str().to_string(),
                });
            }
        };

        let mut attrs = extract_attrs(layer);
        if layer.kind == LayerKind::ReLU && attrs.get_float("alpha").unwrap_or(0.0) != 0.0 {
            op = IrOp::LeakyRelu;
        }

        let resolved = self.resolve_inputs(layer, op)?;
        for (name, shape) in &resolved {
            self.inputs_map.insert(name.clone(), shape.clone());
        }

        let dims = infer_dims(layer, &resolved, &mut attrs)?;

        // A declared output name that differs from the layer name is an
        // alias: downstream consumers find the node under its own name.
        if let Some(top) = layer.tops.first() {
            let top_name = ir_name(top);
            if top_name != layer_name {
                self.output_rename.insert(top_name, layer_name.clone());
            }
        }

        let mut outputs = IndexMap::new();
        outputs.insert(layer_name.clone(), dims.output.clone());
        self.outputs_map
            .insert(layer_name.clone(), dims.output.clone());

        extract_binaries(layer, self.graph);
        let mut record = LayerRecord {
            name: layer_name.clone(),
            op,
            inputs: resolved,
            outputs,
            attrs,
            weights: None,
            biases: None,
            scale_weights: None,
            scale_bias: None,
        };
        if let Some(shape) = dims.weights {
            let name = format!("{layer_name}_w");
            self.graph
                .add_variable(IrTensor::new(name.clone(), DType::F32, shape.clone()));
            record.weights = Some((name, shape));
        }
        if let Some(shape) = dims.bias {
            let name = format!("{layer_name}_b");
            self.graph
                .add_variable(IrTensor::new(name.clone(), DType::F32, shape.clone()));
            record.biases = Some((name, shape));
        }

        tracing::debug!("layer '{}' ({}) lowered to {}", layer.name, layer.kind, op);

        let node = record.to_node();
        let defer =
            op == IrOp::BatchNorm && next.map(|l| l.kind) == Some(LayerKind::Scale);
        self.records.push(record);
        if defer {
            // The scale layer that follows will fuse into this record and
            // emit it.
            tracing::debug!("deferring emission of batch_norm '{layer_name}'");
            self.last_emitted = None;
        } else {
            self.last_emitted = Some(self.graph.add_node(node));
        }
        Ok(())
    }

    /// Folds a `Scale` layer into the preceding `batch_norm` record.
    ///
    /// The record takes over the scale layer's identity and gains its
    /// parameters; the combined node is emitted once (or replaces the
    /// node if the batch norm was already flushed).
    fn fuse_scale(&mut self, layer: &RawLayer) -> Result<(), LowerError> {
        let scale_name = ir_name(&layer.name);
        tracing::debug!("fusing scale '{scale_name}' into preceding batch_norm");

        extract_binaries(layer, self.graph);

        let Some(prev) = self.records.last_mut() else {
            return Ok(());
        };

        // Recompute against the batch norm's own inputs and attributes;
        // both operators preserve shape, so this is idempotent.
        let dims = infer_dims(layer, &prev.inputs, &mut prev.attrs)?;

        let mut outputs = IndexMap::new();
        outputs.insert(scale_name.clone(), dims.output.clone());
        prev.outputs = outputs;

        if let Some(shape) = dims.weights {
            let name = format!("{scale_name}_w");
            self.graph
                .add_variable(IrTensor::new(name.clone(), DType::F32, shape.clone()));
            prev.scale_weights = Some((name, shape));
        }
        if let Some(shape) = dims.bias {
            let name = format!("{scale_name}_b");
            self.graph
                .add_variable(IrTensor::new(name.clone(), DType::F32, shape.clone()));
            prev.scale_bias = Some((name, shape));
        }

        if let Some(top) = layer.tops.first() {
            let top_name = ir_name(top);
            if top_name != scale_name {
                self.output_rename.insert(top_name, scale_name.clone());
            }
        }

        prev.name = scale_name.clone();
        let node = prev.to_node();
        self.outputs_map.insert(scale_name, dims.output);

        match self.last_emitted {
            None => {
                self.last_emitted = Some(self.graph.add_node(node));
            }
            Some(index) => {
                self.graph.replace_node(index, node)?;
            }
        }
        Ok(())
    }

    /// Records the alias for an eliminated `Dropout` layer.
    fn alias_dropout(&mut self, layer: &RawLayer) {
        let Some(bottom) = layer.bottoms.first() else {
            tracing::warn!("dropout layer '{}' has no input, ignored", layer.name);
            return;
        };
        let mut source = ir_name(bottom);
        if let Some(renamed) = self.output_rename.get(&source) {
            source = renamed.clone();
        }
        if let Some(top) = layer.tops.first() {
            tracing::debug!("dropout '{}' eliminated, '{top}' -> '{source}'", layer.name);
            self.dropout_alias.insert(ir_name(top), source);
        }
    }

    /// Records the aliases for an eliminated `Split` layer.
    fn alias_split(&mut self, layer: &RawLayer) {
        let Some(bottom) = layer.bottoms.first() else {
            tracing::warn!("split layer '{}' has no input, ignored", layer.name);
            return;
        };
        let mut source = ir_name(bottom);
        if let Some(renamed) = self.output_rename.get(&source) {
            source = renamed.clone();
        }
        for top in &layer.tops {
            self.split_alias.insert(ir_name(top), source.clone());
        }
        tracing::debug!(
            "split '{}' eliminated, {} outputs -> '{source}'",
            layer.name,
            layer.tops.len(),
        );
    }

    /// Resolves every declared input of `layer` to a canonical name and
    /// shape.
    ///
    /// Precedence per name: `output_rename`, then `split_alias`, then
    /// `dropout_alias`, then membership in the previous record's outputs,
    /// the global outputs, and the global inputs. A trailing unresolved
    /// input of a softmax layer is an optional label and stops resolution;
    /// otherwise one more rename hop against the previous record's outputs
    /// is attempted before the name is reported unresolved.
    ///
    /// The first emitted layer resolves directly against the network
    /// input declared by the boundary extractor.
    fn resolve_inputs(
        &self,
        layer: &RawLayer,
        op: IrOp,
    ) -> Result<IndexMap<String, Shape>, LowerError> {
        let mut resolved = IndexMap::new();

        let Some(prev) = self.records.last() else {
            for bottom in &layer.bottoms {
                let name = ir_name(bottom);
                match self.net_inputs.get(&name) {
                    Some(shape) => {
                        resolved.insert(name, shape.clone());
                    }
                    None => {
                        return Err(LowerError::UnresolvedInput {
                            layer: layer.name.clone(),
                            input: name,
                        });
                    }
                }
            }
            return Ok(resolved);
        };

        for (k, bottom) in layer.bottoms.iter().enumerate() {
            let mut name = ir_name(bottom);
            if let Some(renamed) = self.output_rename.get(&name) {
                name = renamed.clone();
            }
            if let Some(source) = self.split_alias.get(&name) {
                name = source.clone();
            }
            if let Some(source) = self.dropout_alias.get(&name) {
                name = source.clone();
            }

            if let Some(shape) = prev.outputs.get(&name) {
                resolved.insert(name, shape.clone());
            } else if let Some(shape) = self.outputs_map.get(&name) {
                resolved.insert(name, shape.clone());
            } else if let Some(shape) = self.inputs_map.get(&name) {
                resolved.insert(name, shape.clone());
            } else if op == IrOp::Softmax && k != 0 {
                // Optional label input, ignored at inference.
                break;
            } else if let Some(renamed) = self.output_rename.get(&name) {
                match prev.outputs.get(renamed) {
                    Some(shape) => {
                        resolved.insert(renamed.clone(), shape.clone());
                    }
                    None => {
                        return Err(LowerError::UnresolvedInput {
                            layer: layer.name.clone(),
                            input: name,
                        });
                    }
                }
            } else {
                return Err(LowerError::UnresolvedInput {
                    layer: layer.name.clone(),
                    input: name,
                });
            }
        }
        Ok(resolved)
    }
}
