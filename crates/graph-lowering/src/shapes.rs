// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-operator output and parameter shape inference.
//!
//! Shapes are computed from the resolved input shapes and the extracted
//! attributes. The formulas are evaluated verbatim — a zero or negative
//! extent propagates into the graph untouched.

use crate::canon::ir_name;
use crate::error::LowerError;
use caffe_model::{LayerKind, RawLayer};
use indexmap::IndexMap;
use nnir_graph::IrAttrs;
use tensor_core::Shape;

/// Inferred shapes for one layer: the single output, plus parameter
/// shapes for operators that carry them.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorDims {
    /// Output activation shape.
    pub output: Shape,
    /// Weight tensor shape, if the operator has weights.
    pub weights: Option<Shape>,
    /// Bias tensor shape, if the operator has a bias.
    pub bias: Option<Shape>,
}

/// Computes output/weight/bias shapes for `layer`.
///
/// `attrs` is taken mutably because global pooling overrides the
/// extracted kernel, pad, and stride attributes in place; the emitted
/// node carries the overridden values.
pub fn infer_dims(
    layer: &RawLayer,
    inputs: &IndexMap<String, Shape>,
    attrs: &mut IrAttrs,
) -> Result<TensorDims, LowerError> {
    match layer.kind {
        LayerKind::Convolution => {
            let (n, c, h, w) = first_input_nchw(layer, inputs)?;
            let (stride_w, stride_h) = axis_pair(attrs, "strides", 1);
            let (kernel_w, kernel_h) = axis_pair(attrs, "kernel_shape", 0);
            let (dilation_w, dilation_h) = axis_pair(attrs, "dilations", 1);
            let (pad_w, pad_h) = pad_pair(attrs);

            let out_w = (w + 2 * pad_w - kernel_w - (kernel_w - 1) * (dilation_w - 1))
                .div_euclid(stride_w)
                + 1;
            let out_h = (h + 2 * pad_h - kernel_h - (kernel_h - 1) * (dilation_h - 1))
                .div_euclid(stride_h)
                + 1;
            let conv = layer.convolution_param();
            let out_c = i64::from(conv.num_output);

            Ok(TensorDims {
                output: Shape::nchw(n, out_c, out_h, out_w),
                weights: Some(Shape::new(vec![out_c, c, kernel_h, kernel_w])),
                bias: conv.bias_term.then(|| Shape::vector(out_c)),
            })
        }

        LayerKind::Deconvolution => {
            let (n, c, h, w) = first_input_nchw(layer, inputs)?;
            let (stride_w, stride_h) = axis_pair(attrs, "strides", 1);
            let (kernel_w, kernel_h) = axis_pair(attrs, "kernel_shape", 0);
            let (dilation_w, dilation_h) = axis_pair(attrs, "dilations", 1);
            let (pad_w, pad_h) = pad_pair(attrs);

            let out_w = stride_w * (w - 1) + dilation_w * (kernel_w - 1) + 1 - 2 * pad_w;
            let out_h = stride_h * (h - 1) + dilation_h * (kernel_h - 1) + 1 - 2 * pad_h;
            let conv = layer.convolution_param();
            let out_c = i64::from(conv.num_output);

            Ok(TensorDims {
                output: Shape::nchw(n, out_c, out_h, out_w),
                weights: Some(Shape::new(vec![out_c, c, kernel_h, kernel_w])),
                bias: conv.bias_term.then(|| Shape::vector(out_c)),
            })
        }

        LayerKind::Pooling => {
            let (n, c, h, w) = first_input_nchw(layer, inputs)?;
            let (mut stride_w, mut stride_h) = axis_pair(attrs, "strides", 1);
            let (mut kernel_w, mut kernel_h) = axis_pair(attrs, "kernel_shape", 0);
            let (mut pad_w, mut pad_h) = pad_pair(attrs);

            if layer.pooling_param().global_pooling {
                // Pool over the full spatial extent; the attribute map is
                // rewritten so the emitted node reflects the override.
                kernel_w = w;
                kernel_h = h;
                pad_w = 0;
                pad_h = 0;
                stride_w = 1;
                stride_h = 1;
                attrs.set("kernel_shape", vec![kernel_w, kernel_h]);
                attrs.set("pads", vec![0i64, 0, 0, 0]);
                attrs.set("strides", vec![1i64, 1]);
            }

            let mut out_w = ceil_div(w + 2 * pad_w + stride_w - kernel_w, stride_w);
            let mut out_h = ceil_div(h + 2 * pad_h + stride_h - kernel_h, stride_h);
            // Drop a window that would start entirely inside the padding.
            if pad_h > 0 && (out_h - 1) * stride_h >= h + pad_h {
                out_h -= 1;
            }
            if pad_w > 0 && (out_w - 1) * stride_w >= w + pad_w {
                out_w -= 1;
            }

            Ok(TensorDims {
                output: Shape::nchw(n, c, out_h, out_w),
                weights: None,
                bias: None,
            })
        }

        LayerKind::InnerProduct => {
            let (n, c, h, w) = first_input_nchw(layer, inputs)?;
            let ip = layer.inner_product_param();
            let num_output = i64::from(ip.num_output);

            Ok(TensorDims {
                output: Shape::nchw(n, num_output, 1, 1),
                weights: Some(Shape::new(vec![num_output, c, h, w])),
                bias: ip.bias_term.then(|| Shape::vector(num_output)),
            })
        }

        LayerKind::Concat => {
            let (n, _, h, w) = first_input_nchw(layer, inputs)?;
            let mut channels = 0;
            for (name, shape) in inputs {
                let (_, c, _, _) = nchw_or_unresolved(layer, name, shape)?;
                channels += c;
            }

            Ok(TensorDims {
                output: Shape::nchw(n, channels, h, w),
                weights: None,
                bias: None,
            })
        }

        LayerKind::BatchNorm | LayerKind::Scale => {
            let (n, c, h, w) = first_input_nchw(layer, inputs)?;
            Ok(TensorDims {
                output: Shape::nchw(n, c, h, w),
                weights: (!layer.blobs.is_empty()).then(|| Shape::vector(c)),
                bias: (layer.blobs.len() > 1).then(|| Shape::vector(c)),
            })
        }

        // Everything else preserves its input shape.
        _ => {
            let (_, shape) = inputs.first().ok_or_else(|| no_inputs(layer))?;
            Ok(TensorDims {
                output: shape.clone(),
                weights: None,
                bias: None,
            })
        }
    }
}

/// Reads a `[w, h]` attribute pair, defaulting both axes.
fn axis_pair(attrs: &IrAttrs, name: &str, default: i64) -> (i64, i64) {
    match attrs.get_ints(name) {
        Some(v) => (
            v.first().copied().unwrap_or(default),
            v.get(1).copied().unwrap_or(default),
        ),
        None => (default, default),
    }
}

/// Reads `(pad_w, pad_h)` from the 4-way symmetric `pads` attribute.
fn pad_pair(attrs: &IrAttrs) -> (i64, i64) {
    match attrs.get_ints("pads") {
        Some(v) => (
            v.first().copied().unwrap_or(0),
            v.get(1).copied().unwrap_or(0),
        ),
        None => (0, 0),
    }
}

/// Ceiling division, evaluated in floating point as the source formula
/// writes it.
fn ceil_div(num: i64, den: i64) -> i64 {
    (num as f64 / den as f64).ceil() as i64
}

fn first_input_nchw(
    layer: &RawLayer,
    inputs: &IndexMap<String, Shape>,
) -> Result<(i64, i64, i64, i64), LowerError> {
    let (name, shape) = inputs.first().ok_or_else(|| no_inputs(layer))?;
    nchw_or_unresolved(layer, name, shape)
}

fn nchw_or_unresolved(
    layer: &RawLayer,
    name: &str,
    shape: &Shape,
) -> Result<(i64, i64, i64, i64), LowerError> {
    shape.as_nchw().ok_or_else(|| LowerError::UnresolvedInput {
        layer: ir_name(&layer.name),
        input: name.to_string(),
    })
}

fn no_inputs(layer: &RawLayer) -> LowerError {
    LowerError::UnresolvedInput {
        layer: ir_name(&layer.name),
        input: layer.bottoms.first().cloned().unwrap_or_default(),
    }
}
