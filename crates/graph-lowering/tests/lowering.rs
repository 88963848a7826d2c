// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: complete model lowering.
//!
//! These exercise the full flow — boundary extraction, the builder pass,
//! local classification, and graph persistence — over small but
//! realistic layer stacks.

use caffe_model::{
    ConvolutionParam, InnerProductParam, LayerKind, NetModel, PoolMethod, PoolingParam, RawLayer,
};
use graph_lowering::{lower, LowerError};
use nnir_graph::IrOp;
use tensor_core::Shape;

// ── Helpers ────────────────────────────────────────────────────

fn model(layers: Vec<RawLayer>) -> NetModel {
    NetModel {
        name: "test".into(),
        inputs: vec![],
        layers,
    }
}

fn input_layer(top: &str) -> RawLayer {
    let mut layer = RawLayer::new("input", LayerKind::Input);
    layer.tops = vec![top.into()];
    layer
}

fn conv(name: &str, bottom: &str, num_output: u32, kernel: u32, stride: u32, pad: u32) -> RawLayer {
    let mut layer = RawLayer::new(name, LayerKind::Convolution);
    layer.bottoms = vec![bottom.into()];
    layer.tops = vec![name.into()];
    layer.convolution = Some(ConvolutionParam {
        num_output,
        kernel_size: vec![kernel],
        stride: vec![stride],
        pad: vec![pad],
        bias_term: false,
        ..Default::default()
    });
    layer.blobs = vec![vec![0.1; (num_output * 3 * kernel * kernel) as usize]];
    layer
}

fn relu(name: &str, bottom: &str) -> RawLayer {
    let mut layer = RawLayer::new(name, LayerKind::ReLU);
    layer.bottoms = vec![bottom.into()];
    layer.tops = vec![name.into()];
    layer
}

fn max_pool(name: &str, bottom: &str, kernel: u32, stride: u32) -> RawLayer {
    let mut layer = RawLayer::new(name, LayerKind::Pooling);
    layer.bottoms = vec![bottom.into()];
    layer.tops = vec![name.into()];
    layer.pooling = Some(PoolingParam {
        pool: PoolMethod::Max,
        kernel_size: kernel,
        stride,
        ..Default::default()
    });
    layer
}

// ── End-to-end properties ──────────────────────────────────────

#[test]
fn test_three_layer_model() {
    let net = model(vec![
        input_layer("data"),
        conv("conv1", "data", 64, 3, 1, 1),
        relu("relu1", "conv1"),
    ]);
    let graph = lower(&net, Shape::nchw(1, 3, 4, 4)).unwrap();

    // Exactly two nodes: the placeholder produces none.
    assert_eq!(graph.nodes().len(), 2);
    assert_eq!(graph.nodes()[0].op, IrOp::Conv);
    assert_eq!(graph.nodes()[1].op, IrOp::Relu);

    // One weight variable with the full filter shape.
    assert_eq!(graph.variables().len(), 1);
    assert_eq!(graph.variables()[0].name, "conv1_w");
    assert_eq!(graph.variables()[0].shape, Shape::new(vec![64, 3, 3, 3]));

    // Boundary tensors.
    assert_eq!(graph.inputs().len(), 1);
    assert_eq!(graph.inputs()[0].name, "data");
    assert_eq!(graph.inputs()[0].shape, Shape::nchw(1, 3, 4, 4));
    assert_eq!(graph.outputs().len(), 1);
    assert_eq!(graph.outputs()[0].name, "relu1");
    assert_eq!(graph.outputs()[0].shape, Shape::nchw(1, 64, 4, 4));
}

#[test]
fn test_dropout_produces_no_node() {
    let mut drop = RawLayer::new("drop1", LayerKind::Dropout);
    drop.bottoms = vec!["conv1".into()];
    drop.tops = vec!["drop1".into()];

    let net = model(vec![
        input_layer("data"),
        conv("conv1", "data", 8, 3, 1, 1),
        drop,
        relu("relu1", "drop1"),
    ]);
    let graph = lower(&net, Shape::nchw(1, 3, 8, 8)).unwrap();

    // Node count equals the count of real operator layers only.
    assert_eq!(graph.nodes().len(), 2);
    // The consumer resolves transparently to the producer's tensor.
    assert_eq!(graph.nodes()[1].inputs, vec!["conv1".to_string()]);
    assert_eq!(graph.outputs()[0].name, "relu1");
}

#[test]
fn test_batch_norm_scale_fusion_end_to_end() {
    let mut bn = RawLayer::new("bn1", LayerKind::BatchNorm);
    bn.bottoms = vec!["conv1".into()];
    bn.tops = vec!["conv1".into()];

    let mut scale = RawLayer::new("scale1", LayerKind::Scale);
    scale.bottoms = vec!["conv1".into()];
    scale.tops = vec!["conv1".into()];
    scale.blobs = vec![vec![1.0; 8], vec![0.0; 8]];

    let net = model(vec![
        input_layer("data"),
        conv("conv1", "data", 8, 3, 1, 1),
        bn,
        scale,
        relu("relu1", "conv1"),
    ]);
    let graph = lower(&net, Shape::nchw(1, 3, 8, 8)).unwrap();

    // conv + fused batch_norm + relu.
    assert_eq!(graph.nodes().len(), 3);
    let fused = &graph.nodes()[1];
    assert_eq!(fused.op, IrOp::BatchNorm);
    assert_eq!(
        fused.inputs,
        vec![
            "conv1".to_string(),
            "scale1_w".to_string(),
            "scale1_b".to_string()
        ]
    );
    // Two additional variables beyond the conv weight.
    assert_eq!(graph.variables().len(), 3);
    // The relu consumes the fused node through the rename table.
    assert_eq!(graph.nodes()[2].inputs, vec!["scale1".to_string()]);
}

#[test]
fn test_fused_batch_norm_keeps_own_parameters() {
    // A batch norm that carries its own blob contributes its weight
    // after the fused scale parameters in the node input order.
    let mut bn = RawLayer::new("bn1", LayerKind::BatchNorm);
    bn.bottoms = vec!["conv1".into()];
    bn.tops = vec!["conv1".into()];
    bn.blobs = vec![vec![0.5; 8]];

    let mut scale = RawLayer::new("scale1", LayerKind::Scale);
    scale.bottoms = vec!["conv1".into()];
    scale.tops = vec!["conv1".into()];
    scale.blobs = vec![vec![1.0; 8], vec![0.0; 8]];

    let net = model(vec![
        input_layer("data"),
        conv("conv1", "data", 8, 3, 1, 1),
        bn,
        scale,
    ]);
    let graph = lower(&net, Shape::nchw(1, 3, 8, 8)).unwrap();

    let fused = &graph.nodes()[1];
    assert_eq!(
        fused.inputs,
        vec![
            "conv1".to_string(),
            "scale1_w".to_string(),
            "scale1_b".to_string(),
            "bn1_w".to_string()
        ]
    );
    assert!(graph.binary("bn1_w").is_some());
}

#[test]
fn test_squeezenet_style_stack() {
    // conv -> relu -> pool -> global avg pool -> softmax, with names
    // containing separators that must canonicalize.
    let mut gap = RawLayer::new("pool/global", LayerKind::Pooling);
    gap.bottoms = vec!["pool1".into()];
    gap.tops = vec!["pool/global".into()];
    gap.pooling = Some(PoolingParam {
        pool: PoolMethod::Ave,
        global_pooling: true,
        ..Default::default()
    });

    let mut softmax = RawLayer::new("prob", LayerKind::Softmax);
    softmax.bottoms = vec!["pool/global".into()];
    softmax.tops = vec!["prob".into()];

    let net = model(vec![
        input_layer("data"),
        conv("conv-1", "data", 64, 3, 1, 1),
        relu("relu1", "conv-1"),
        max_pool("pool1", "relu1", 2, 2),
        gap,
        softmax,
    ]);
    let graph = lower(&net, Shape::nchw(1, 3, 8, 8)).unwrap();

    assert_eq!(graph.nodes().len(), 5);
    assert_eq!(graph.nodes()[0].outputs, vec!["conv_1".to_string()]);
    assert_eq!(graph.nodes()[3].op, IrOp::AvgPool);
    // 8x8 -> pool/2 -> 4x4 -> global avg -> 1x1.
    assert_eq!(graph.outputs()[0].name, "prob");
    assert_eq!(graph.outputs()[0].shape, Shape::nchw(1, 64, 1, 1));
}

#[test]
fn test_inner_product_head() {
    let mut fc = RawLayer::new("fc1", LayerKind::InnerProduct);
    fc.bottoms = vec!["conv1".into()];
    fc.tops = vec!["fc1".into()];
    fc.inner_product = Some(InnerProductParam {
        num_output: 10,
        bias_term: true,
    });
    fc.blobs = vec![vec![0.0; 10 * 8 * 8 * 8], vec![0.0; 10]];

    let net = model(vec![
        input_layer("data"),
        conv("conv1", "data", 8, 3, 1, 1),
        fc,
    ]);
    let graph = lower(&net, Shape::nchw(1, 3, 8, 8)).unwrap();

    let gemm = &graph.nodes()[1];
    assert_eq!(gemm.op, IrOp::Gemm);
    assert_eq!(
        gemm.inputs,
        vec!["conv1".to_string(), "fc1_w".to_string(), "fc1_b".to_string()]
    );
    assert_eq!(graph.outputs()[0].shape, Shape::nchw(1, 10, 1, 1));

    // Weight and bias variables carry the inferred shapes.
    let fc_w = graph.variables().iter().find(|v| v.name == "fc1_w").unwrap();
    assert_eq!(fc_w.shape, Shape::new(vec![10, 8, 8, 8]));
    let fc_b = graph.variables().iter().find(|v| v.name == "fc1_b").unwrap();
    assert_eq!(fc_b.shape, Shape::vector(10));
}

#[test]
fn test_concat_branches() {
    let mut split = RawLayer::new("split1", LayerKind::Split);
    split.bottoms = vec!["pool1".into()];
    split.tops = vec!["pool1_a".into(), "pool1_b".into()];

    let branch_a = conv("branch/a", "pool1_a", 16, 1, 1, 0);
    let branch_b = conv("branch/b", "pool1_b", 32, 1, 1, 0);

    let mut concat = RawLayer::new("concat1", LayerKind::Concat);
    concat.bottoms = vec!["branch/a".into(), "branch/b".into()];
    concat.tops = vec!["concat1".into()];

    let net = model(vec![
        input_layer("data"),
        conv("conv1", "data", 8, 3, 1, 1),
        max_pool("pool1", "conv1", 2, 2),
        split,
        branch_a,
        branch_b,
        concat,
    ]);
    let graph = lower(&net, Shape::nchw(1, 3, 8, 8)).unwrap();

    // split is eliminated; both branches and the concat are real nodes.
    assert_eq!(graph.nodes().len(), 5);
    let concat_node = graph.nodes().last().unwrap();
    assert_eq!(concat_node.op, IrOp::Concat);
    assert_eq!(
        concat_node.inputs,
        vec!["branch_a".to_string(), "branch_b".to_string()]
    );
    // Channels sum across the branches.
    assert_eq!(graph.outputs()[0].shape, Shape::nchw(1, 48, 4, 4));
}

#[test]
fn test_unsupported_layer_aborts_whole_conversion() {
    let mut crop = RawLayer::new("crop1", LayerKind::Crop);
    crop.bottoms = vec!["conv1".into()];
    crop.tops = vec!["crop1".into()];

    let net = model(vec![
        input_layer("data"),
        conv("conv1", "data", 8, 3, 1, 1),
        crop,
        relu("relu1", "crop1"),
    ]);
    let err = lower(&net, Shape::nchw(1, 3, 8, 8)).unwrap_err();
    assert!(matches!(err, LowerError::UnsupportedOperator { ref kind, .. } if kind == "Crop"));
}

#[test]
fn test_locals_classification_end_to_end() {
    let net = model(vec![
        input_layer("data"),
        conv("conv1", "data", 8, 3, 1, 1),
        relu("relu1", "conv1"),
        max_pool("pool1", "relu1", 2, 2),
    ]);
    let graph = lower(&net, Shape::nchw(1, 3, 8, 8)).unwrap();

    // conv1 and relu1 are intermediates; data is the input, pool1 the
    // output, conv1_w a variable.
    assert_eq!(graph.locals(), &["conv1".to_string(), "relu1".to_string()]);
}

#[test]
fn test_persisted_graph_folder() {
    let net = model(vec![
        input_layer("data"),
        conv("conv1", "data", 4, 3, 1, 1),
        relu("relu1", "conv1"),
    ]);
    let graph = lower(&net, Shape::nchw(1, 3, 4, 4)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("net.nnir");
    graph.to_file(&out).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("graph.json")).unwrap()).unwrap();
    assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(json["nodes"][0]["op"], "conv");
    assert_eq!(json["inputs"][0]["name"], "data");
    assert_eq!(json["outputs"][0]["name"], "relu1");
    assert_eq!(json["variables"][0]["name"], "conv1_w");

    // The raw payload was written with 4 bytes per element.
    let blob = std::fs::read(out.join("binary/conv1_w.raw")).unwrap();
    assert_eq!(blob.len(), 4 * 3 * 3 * 3 * 4);
}
