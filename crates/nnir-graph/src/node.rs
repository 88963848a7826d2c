// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! IR operator nodes.

use crate::IrAttrs;
use std::fmt;

/// The fixed IR operator vocabulary this compiler can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrOp {
    /// 2-D convolution.
    Conv,
    /// Transposed (fractionally strided) convolution.
    ConvTranspose,
    /// Batch normalization, optionally carrying fused scale parameters.
    BatchNorm,
    /// General matrix multiply (fully connected).
    Gemm,
    /// Rectified linear unit.
    Relu,
    /// ReLU with a non-zero negative slope.
    LeakyRelu,
    /// Local response normalization.
    Lrn,
    /// Elementwise sum.
    Sum,
    /// Channel concatenation.
    Concat,
    /// Softmax over channels.
    Softmax,
    /// Max pooling.
    MaxPool,
    /// Average pooling.
    AvgPool,
    /// Per-channel multiply (scale without bias).
    Mul,
    /// Per-channel multiply-add (scale with bias).
    #[serde(rename = "muladd")]
    MulAdd,
}

impl IrOp {
    /// Returns the operator name as written in the IR graph file.
    pub fn as_str(self) -> &'static str {
        match self {
            IrOp::Conv => "conv",
            IrOp::ConvTranspose => "conv_transpose",
            IrOp::BatchNorm => "batch_norm",
            IrOp::Gemm => "gemm",
            IrOp::Relu => "relu",
            IrOp::LeakyRelu => "leaky_relu",
            IrOp::Lrn => "lrn",
            IrOp::Sum => "sum",
            IrOp::Concat => "concat",
            IrOp::Softmax => "softmax",
            IrOp::MaxPool => "max_pool",
            IrOp::AvgPool => "avg_pool",
            IrOp::Mul => "mul",
            IrOp::MulAdd => "muladd",
        }
    }
}

impl fmt::Display for IrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single operator node in the IR graph.
///
/// Input and output names are already canonical; input order is
/// significant (primary inputs first, then any fused scale parameters,
/// then weights, then biases).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IrNode {
    /// Operator type.
    pub op: IrOp,
    /// Ordered input tensor names.
    pub inputs: Vec<String>,
    /// Ordered output tensor names.
    pub outputs: Vec<String>,
    /// Operator attributes.
    #[serde(default)]
    pub attrs: IrAttrs,
}

impl IrNode {
    /// Creates a new node.
    pub fn new(op: IrOp, inputs: Vec<String>, outputs: Vec<String>, attrs: IrAttrs) -> Self {
        Self {
            op,
            inputs,
            outputs,
            attrs,
        }
    }
}

impl fmt::Display for IrNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) -> ({})",
            self.op,
            self.inputs.join(", "),
            self.outputs.join(", "),
        )
    }
}
