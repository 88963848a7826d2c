// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # graph-lowering
//!
//! The caffe2ir lowering pass: turns a decoded layer list into a
//! normalized IR graph.
//!
//! The pass is a deterministic, single-threaded fold over the layer
//! list. Per layer it canonicalizes names, extracts attributes, infers
//! output and parameter shapes, eliminates copy layers (`Dropout`,
//! `Split`), fuses `Scale` into a preceding `BatchNorm`, and emits nodes,
//! variables, and binaries into an [`nnir_graph::IrGraph`]. Every failure
//! is fatal and aborts the conversion at the point of use.
//!
//! ```no_run
//! use caffe_model::ModelLoader;
//! use tensor_core::Shape;
//!
//! let model = ModelLoader::load(std::path::Path::new("./model")).unwrap();
//! let graph = graph_lowering::lower(&model, Shape::nchw(1, 3, 224, 224)).unwrap();
//! graph.to_file(std::path::Path::new("./out")).unwrap();
//! ```

pub mod attrs;
pub mod binary;
pub mod boundary;
pub mod builder;
pub mod canon;
mod error;
pub mod shapes;

pub use builder::{GraphBuilder, LayerRecord};
pub use error::LowerError;

use caffe_model::NetModel;
use nnir_graph::IrGraph;
use tensor_core::Shape;

/// Lowers a decoded model to an IR graph.
///
/// `input_dims` supplies the network input shape; the model itself only
/// names its input. On success the returned graph is complete: nodes,
/// variables, binaries, classified locals, and the declared input and
/// output boundary tensors.
pub fn lower(model: &NetModel, input_dims: Shape) -> Result<IrGraph, LowerError> {
    if model.layers.is_empty() {
        return Err(LowerError::EmptyModel);
    }
    tracing::info!("lowering model '{}' ({} layers)", model.name, model.layers.len());

    let mut graph = IrGraph::new();
    let net_inputs = boundary::extract_input(model, &input_dims, &mut graph)?;
    let records = GraphBuilder::new(&mut graph, net_inputs).run(&model.layers)?;
    boundary::extract_output(&records, &mut graph)?;

    tracing::info!(
        "lowered '{}' to {} nodes, {} variables",
        model.name,
        graph.nodes().len(),
        graph.variables().len(),
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_model_rejected() {
        let model = NetModel {
            name: "empty".into(),
            inputs: vec![],
            layers: vec![],
        };
        let err = lower(&model, Shape::nchw(1, 3, 4, 4)).unwrap_err();
        assert!(matches!(err, LowerError::EmptyModel));
    }
}
