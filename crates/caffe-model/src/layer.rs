// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Decoded source model: layer records and the network container.

use crate::params::{
    BatchNormParam, ConvolutionParam, InnerProductParam, LrnParam, PoolingParam, ReluParam,
};

/// The source layer vocabulary this compiler understands.
///
/// Serialised under the Caffe spellings (`"ReLU"`, `"InnerProduct"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LayerKind {
    /// Database-backed input placeholder.
    Data,
    /// Image-list input placeholder.
    ImageData,
    /// Plain input placeholder.
    Input,
    /// 2-D convolution.
    Convolution,
    /// Transposed convolution.
    Deconvolution,
    /// Spatial pooling.
    Pooling,
    /// Fully connected layer.
    InnerProduct,
    /// Rectified linear unit.
    #[serde(rename = "ReLU")]
    ReLU,
    /// Local response normalization.
    #[serde(rename = "LRN")]
    Lrn,
    /// Batch normalization.
    BatchNorm,
    /// Per-channel scale (and optional shift).
    Scale,
    /// Elementwise combination.
    Eltwise,
    /// Channel concatenation.
    Concat,
    /// Softmax.
    Softmax,
    /// Softmax fused with a loss (the loss part is ignored at inference).
    SoftmaxWithLoss,
    /// Dropout (identity at inference).
    Dropout,
    /// Explicit fan-out of one blob to several names.
    Split,
    /// Flatten (decodable, but this compiler has no lowering for it).
    Flatten,
    /// Reshape (decodable, but this compiler has no lowering for it).
    Reshape,
    /// Crop (decodable, but this compiler has no lowering for it).
    Crop,
    /// Sigmoid (decodable, but this compiler has no lowering for it).
    Sigmoid,
}

impl LayerKind {
    /// Returns the Caffe spelling of this layer kind.
    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::Data => "Data",
            LayerKind::ImageData => "ImageData",
            LayerKind::Input => "Input",
            LayerKind::Convolution => "Convolution",
            LayerKind::Deconvolution => "Deconvolution",
            LayerKind::Pooling => "Pooling",
            LayerKind::InnerProduct => "InnerProduct",
            LayerKind::ReLU => "ReLU",
            LayerKind::Lrn => "LRN",
            LayerKind::BatchNorm => "BatchNorm",
            LayerKind::Scale => "Scale",
            LayerKind::Eltwise => "Eltwise",
            LayerKind::Concat => "Concat",
            LayerKind::Softmax => "Softmax",
            LayerKind::SoftmaxWithLoss => "SoftmaxWithLoss",
            LayerKind::Dropout => "Dropout",
            LayerKind::Split => "Split",
            LayerKind::Flatten => "Flatten",
            LayerKind::Reshape => "Reshape",
            LayerKind::Crop => "Crop",
            LayerKind::Sigmoid => "Sigmoid",
        }
    }

    /// Returns `true` for the input-placeholder kinds.
    pub fn is_placeholder(self) -> bool {
        matches!(self, LayerKind::Data | LayerKind::ImageData | LayerKind::Input)
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded layer of the source model.
///
/// Blobs hold the raw float payloads in source order: weights first,
/// then biases. Parameter records are present only when the manifest
/// carried them; accessors return Caffe's defaults otherwise, mirroring
/// protobuf sub-message semantics.
#[derive(Debug, Clone)]
pub struct RawLayer {
    /// Layer name as written in the model.
    pub name: String,
    /// Operator kind.
    pub kind: LayerKind,
    /// Ordered input blob names.
    pub bottoms: Vec<String>,
    /// Ordered output blob names.
    pub tops: Vec<String>,
    /// Raw float payloads (weights, then biases).
    pub blobs: Vec<Vec<f32>>,
    /// Convolution/Deconvolution parameters.
    pub convolution: Option<ConvolutionParam>,
    /// Pooling parameters.
    pub pooling: Option<PoolingParam>,
    /// LRN parameters.
    pub lrn: Option<LrnParam>,
    /// BatchNorm parameters.
    pub batch_norm: Option<BatchNormParam>,
    /// ReLU parameters.
    pub relu: Option<ReluParam>,
    /// InnerProduct parameters.
    pub inner_product: Option<InnerProductParam>,
}

impl RawLayer {
    /// Creates a bare layer with no connections, blobs, or parameters.
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            bottoms: Vec::new(),
            tops: Vec::new(),
            blobs: Vec::new(),
            convolution: None,
            pooling: None,
            lrn: None,
            batch_norm: None,
            relu: None,
            inner_product: None,
        }
    }

    /// Convolution parameters, defaulted if absent.
    pub fn convolution_param(&self) -> ConvolutionParam {
        self.convolution.clone().unwrap_or_default()
    }

    /// Pooling parameters, defaulted if absent.
    pub fn pooling_param(&self) -> PoolingParam {
        self.pooling.clone().unwrap_or_default()
    }

    /// LRN parameters, defaulted if absent.
    pub fn lrn_param(&self) -> LrnParam {
        self.lrn.clone().unwrap_or_default()
    }

    /// BatchNorm parameters, defaulted if absent.
    pub fn batch_norm_param(&self) -> BatchNormParam {
        self.batch_norm.clone().unwrap_or_default()
    }

    /// ReLU parameters, defaulted if absent.
    pub fn relu_param(&self) -> ReluParam {
        self.relu.clone().unwrap_or_default()
    }

    /// InnerProduct parameters, defaulted if absent.
    pub fn inner_product_param(&self) -> InnerProductParam {
        self.inner_product.clone().unwrap_or_default()
    }
}

/// A fully decoded source model: name, declared inputs, ordered layers.
#[derive(Debug, Clone)]
pub struct NetModel {
    /// Model name.
    pub name: String,
    /// Declared top-level input blob names, if the model lists any.
    pub inputs: Vec<String>,
    /// Layers in source order.
    pub layers: Vec<RawLayer>,
}
