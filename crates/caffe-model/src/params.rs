// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Typed per-operator parameter records.
//!
//! These mirror the Caffe parameter messages the compiler reads. Scalar
//! per-axis overrides (`pad_h`, `kernel_w`, ...) are `Option<T>` so the
//! attribute extractor can distinguish "explicitly set" from "defaulted",
//! exactly like protobuf field presence. Defaults match Caffe's.

/// Parameters for `Convolution` and `Deconvolution` layers.
///
/// Padding, stride, kernel size, and dilation each come in two forms: a
/// repeated field and explicit per-axis overrides. The override wins when
/// present; otherwise the repeated field supplies the `h` axis from index
/// 0 and the `w` axis from index 1, with `w` falling back to the resolved
/// `h` value when the repeated field has fewer than two entries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConvolutionParam {
    /// Number of output channels.
    #[serde(default)]
    pub num_output: u32,
    /// Whether the layer carries a bias blob.
    #[serde(default = "default_true")]
    pub bias_term: bool,
    /// Repeated padding (pixels added to each spatial side).
    #[serde(default)]
    pub pad: Vec<u32>,
    /// Repeated stride.
    #[serde(default)]
    pub stride: Vec<u32>,
    /// Repeated kernel size.
    #[serde(default)]
    pub kernel_size: Vec<u32>,
    /// Repeated dilation.
    #[serde(default)]
    pub dilation: Vec<u32>,
    /// Explicit vertical padding.
    #[serde(default)]
    pub pad_h: Option<u32>,
    /// Explicit horizontal padding.
    #[serde(default)]
    pub pad_w: Option<u32>,
    /// Explicit vertical stride.
    #[serde(default)]
    pub stride_h: Option<u32>,
    /// Explicit horizontal stride.
    #[serde(default)]
    pub stride_w: Option<u32>,
    /// Explicit kernel height.
    #[serde(default)]
    pub kernel_h: Option<u32>,
    /// Explicit kernel width.
    #[serde(default)]
    pub kernel_w: Option<u32>,
    /// Group count for grouped convolution.
    #[serde(default)]
    pub group: Option<u32>,
}

impl Default for ConvolutionParam {
    fn default() -> Self {
        Self {
            num_output: 0,
            bias_term: true,
            pad: Vec::new(),
            stride: Vec::new(),
            kernel_size: Vec::new(),
            dilation: Vec::new(),
            pad_h: None,
            pad_w: None,
            stride_h: None,
            stride_w: None,
            kernel_h: None,
            kernel_w: None,
            group: None,
        }
    }
}

/// Pooling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PoolMethod {
    /// Max pooling.
    #[serde(rename = "MAX")]
    Max,
    /// Average pooling.
    #[serde(rename = "AVE")]
    Ave,
}

/// Parameters for `Pooling` layers.
///
/// Unlike convolution, the fallback fields here are scalars shared by
/// both axes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PoolingParam {
    /// Pooling mode.
    #[serde(default = "default_pool")]
    pub pool: PoolMethod,
    /// Scalar padding shared by both axes.
    #[serde(default)]
    pub pad: u32,
    /// Scalar stride shared by both axes.
    #[serde(default = "default_one")]
    pub stride: u32,
    /// Scalar kernel size shared by both axes.
    #[serde(default)]
    pub kernel_size: u32,
    /// Explicit vertical padding.
    #[serde(default)]
    pub pad_h: Option<u32>,
    /// Explicit horizontal padding.
    #[serde(default)]
    pub pad_w: Option<u32>,
    /// Explicit vertical stride.
    #[serde(default)]
    pub stride_h: Option<u32>,
    /// Explicit horizontal stride.
    #[serde(default)]
    pub stride_w: Option<u32>,
    /// Explicit kernel height.
    #[serde(default)]
    pub kernel_h: Option<u32>,
    /// Explicit kernel width.
    #[serde(default)]
    pub kernel_w: Option<u32>,
    /// Pool over the full spatial extent, ignoring kernel/pad/stride.
    #[serde(default)]
    pub global_pooling: bool,
}

impl Default for PoolingParam {
    fn default() -> Self {
        Self {
            pool: PoolMethod::Max,
            pad: 0,
            stride: 1,
            kernel_size: 0,
            pad_h: None,
            pad_w: None,
            stride_h: None,
            stride_w: None,
            kernel_h: None,
            kernel_w: None,
            global_pooling: false,
        }
    }
}

/// Parameters for `LRN` layers.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LrnParam {
    /// Local normalization window size.
    #[serde(default = "default_local_size")]
    pub local_size: u32,
    /// Scaling parameter.
    #[serde(default = "default_one_f32")]
    pub alpha: f32,
    /// Exponent.
    #[serde(default = "default_beta")]
    pub beta: f32,
    /// Additive constant.
    #[serde(default = "default_one_f32")]
    pub k: f32,
}

impl Default for LrnParam {
    fn default() -> Self {
        Self {
            local_size: 5,
            alpha: 1.0,
            beta: 0.75,
            k: 1.0,
        }
    }
}

/// Parameters for `BatchNorm` layers.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BatchNormParam {
    /// Numerical stability epsilon.
    #[serde(default = "default_eps")]
    pub eps: f32,
}

impl Default for BatchNormParam {
    fn default() -> Self {
        Self { eps: 1e-5 }
    }
}

/// Parameters for `ReLU` layers.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ReluParam {
    /// Slope for negative inputs; 0 for plain ReLU.
    #[serde(default)]
    pub negative_slope: f32,
}

/// Parameters for `InnerProduct` layers.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InnerProductParam {
    /// Number of output features.
    #[serde(default)]
    pub num_output: u32,
    /// Whether the layer carries a bias blob.
    #[serde(default = "default_true")]
    pub bias_term: bool,
}

impl Default for InnerProductParam {
    fn default() -> Self {
        Self {
            num_output: 0,
            bias_term: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_one() -> u32 {
    1
}

fn default_one_f32() -> f32 {
    1.0
}

fn default_pool() -> PoolMethod {
    PoolMethod::Max
}

fn default_local_size() -> u32 {
    5
}

fn default_beta() -> f32 {
    0.75
}

fn default_eps() -> f32 {
    1e-5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convolution_defaults() {
        let p: ConvolutionParam = serde_json::from_str(r#"{"num_output": 64}"#).unwrap();
        assert_eq!(p.num_output, 64);
        assert!(p.bias_term);
        assert!(p.pad.is_empty());
        assert_eq!(p.pad_h, None);
        assert_eq!(p.group, None);
    }

    #[test]
    fn test_convolution_field_presence() {
        let p: ConvolutionParam =
            serde_json::from_str(r#"{"num_output": 64, "pad_h": 3, "kernel_size": [7]}"#).unwrap();
        assert_eq!(p.pad_h, Some(3));
        assert_eq!(p.pad_w, None);
        assert_eq!(p.kernel_size, vec![7]);
    }

    #[test]
    fn test_pooling_defaults() {
        let p: PoolingParam = serde_json::from_str(r#"{"kernel_size": 3}"#).unwrap();
        assert_eq!(p.pool, PoolMethod::Max);
        assert_eq!(p.pad, 0);
        assert_eq!(p.stride, 1);
        assert!(!p.global_pooling);
    }

    #[test]
    fn test_pooling_mode_spelling() {
        let p: PoolingParam = serde_json::from_str(r#"{"pool": "AVE"}"#).unwrap();
        assert_eq!(p.pool, PoolMethod::Ave);
    }

    #[test]
    fn test_lrn_defaults() {
        let p: LrnParam = serde_json::from_str("{}").unwrap();
        assert_eq!(p.local_size, 5);
        assert_eq!(p.alpha, 1.0);
        assert_eq!(p.beta, 0.75);
        assert_eq!(p.k, 1.0);
    }

    #[test]
    fn test_batch_norm_defaults() {
        let p: BatchNormParam = serde_json::from_str("{}").unwrap();
        assert!((p.eps - 1e-5).abs() < 1e-12);
    }

    #[test]
    fn test_relu_defaults() {
        let p: ReluParam = serde_json::from_str("{}").unwrap();
        assert_eq!(p.negative_slope, 0.0);
    }
}
