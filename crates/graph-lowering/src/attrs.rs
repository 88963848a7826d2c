// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-operator attribute extraction.
//!
//! Derives a flat attribute map from a layer's typed parameter record.
//! List-valued attributes follow the IR's `[w, h]` axis order, and pads
//! are written 4-way symmetric as `[left, top, right, bottom]`.

use caffe_model::{LayerKind, RawLayer};
use nnir_graph::IrAttrs;

/// Extracts the attribute map for one layer.
///
/// Returns an empty map for operators that carry no attributes
/// (Eltwise, Concat, Softmax, Scale, Dropout, Split, placeholders).
pub fn extract_attrs(layer: &RawLayer) -> IrAttrs {
    let mut attrs = IrAttrs::new();

    match layer.kind {
        LayerKind::Convolution | LayerKind::Deconvolution => {
            let conv = layer.convolution_param();

            // Per-axis resolution: explicit override, else repeated field
            // (index 0 = h, index 1 = w), else the operator default; the
            // w axis falls back to the resolved h value when the repeated
            // field has fewer than two entries.
            let pad_h = resolve_axis(conv.pad_h, conv.pad.first(), 0);
            let pad_w = resolve_axis(conv.pad_w, conv.pad.get(1), pad_h);
            let stride_h = resolve_axis(conv.stride_h, conv.stride.first(), 1);
            let stride_w = resolve_axis(conv.stride_w, conv.stride.get(1), stride_h);
            let kernel_h = resolve_axis(conv.kernel_h, conv.kernel_size.first(), 0);
            let kernel_w = resolve_axis(conv.kernel_w, conv.kernel_size.get(1), kernel_h);
            let dilation_h = resolve_axis(None, conv.dilation.first(), 1);
            let dilation_w = resolve_axis(None, conv.dilation.get(1), dilation_h);
            let group = i64::from(conv.group.unwrap_or(1));

            attrs.set("strides", vec![stride_w, stride_h]);
            attrs.set("kernel_shape", vec![kernel_w, kernel_h]);
            attrs.set("group", group);
            attrs.set("pads", vec![pad_w, pad_h, pad_w, pad_h]);
            attrs.set("dilations", vec![dilation_w, dilation_h]);
        }

        LayerKind::Pooling => {
            let pooling = layer.pooling_param();

            // The scalar fallbacks here are shared across both axes.
            let pad_h = pooling.pad_h.unwrap_or(pooling.pad) as i64;
            let pad_w = pooling.pad_w.unwrap_or(pooling.pad) as i64;
            let stride_h = pooling.stride_h.unwrap_or(pooling.stride) as i64;
            let stride_w = pooling.stride_w.unwrap_or(pooling.stride) as i64;
            let kernel_h = pooling.kernel_h.unwrap_or(pooling.kernel_size) as i64;
            let kernel_w = pooling.kernel_w.unwrap_or(pooling.kernel_size) as i64;

            attrs.set("strides", vec![stride_w, stride_h]);
            attrs.set("kernel_shape", vec![kernel_w, kernel_h]);
            attrs.set("pads", vec![pad_w, pad_h, pad_w, pad_h]);
            // Pooling output extents always round up.
            attrs.set("dim_round_mode", "ceil");
        }

        LayerKind::Lrn => {
            let lrn = layer.lrn_param();
            attrs.set("alpha", lrn.alpha);
            attrs.set("beta", lrn.beta);
            attrs.set("size", i64::from(lrn.local_size));
            attrs.set("bias", lrn.k);
        }

        LayerKind::BatchNorm => {
            attrs.set("epsilon", layer.batch_norm_param().eps);
        }

        LayerKind::InnerProduct => {
            attrs.set("broadcast", 1i64);
            attrs.set("transB", 1i64);
        }

        LayerKind::ReLU => {
            attrs.set("alpha", layer.relu_param().negative_slope);
        }

        _ => {}
    }

    attrs
}

/// Resolves one axis value: explicit override > repeated-field entry >
/// fallback.
fn resolve_axis(explicit: Option<u32>, repeated: Option<&u32>, fallback: i64) -> i64 {
    match (explicit, repeated) {
        (Some(v), _) => i64::from(v),
        (None, Some(&v)) => i64::from(v),
        (None, None) => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caffe_model::{ConvolutionParam, LrnParam, PoolingParam, ReluParam};

    fn conv_layer(param: ConvolutionParam) -> RawLayer {
        let mut layer = RawLayer::new("conv1", LayerKind::Convolution);
        layer.convolution = Some(param);
        layer
    }

    #[test]
    fn test_conv_repeated_fields() {
        let layer = conv_layer(ConvolutionParam {
            num_output: 64,
            pad: vec![3],
            stride: vec![2],
            kernel_size: vec![7],
            ..Default::default()
        });
        let attrs = extract_attrs(&layer);
        assert_eq!(attrs.get_ints("strides"), Some(&[2i64, 2][..]));
        assert_eq!(attrs.get_ints("kernel_shape"), Some(&[7i64, 7][..]));
        assert_eq!(attrs.get_ints("pads"), Some(&[3i64, 3, 3, 3][..]));
        assert_eq!(attrs.get_ints("dilations"), Some(&[1i64, 1][..]));
        assert_eq!(attrs.get_int("group"), Some(1));
    }

    #[test]
    fn test_conv_explicit_overrides_win() {
        let layer = conv_layer(ConvolutionParam {
            num_output: 64,
            pad: vec![3, 3],
            pad_h: Some(1),
            pad_w: Some(2),
            kernel_size: vec![7],
            ..Default::default()
        });
        let attrs = extract_attrs(&layer);
        // pads are [left, top, right, bottom] = [pad_w, pad_h, pad_w, pad_h]
        assert_eq!(attrs.get_ints("pads"), Some(&[2i64, 1, 2, 1][..]));
    }

    #[test]
    fn test_conv_asymmetric_repeated() {
        let layer = conv_layer(ConvolutionParam {
            num_output: 64,
            kernel_size: vec![3, 5],
            stride: vec![1, 2],
            ..Default::default()
        });
        let attrs = extract_attrs(&layer);
        // kernel_shape is [w, h]; repeated index 0 is h, index 1 is w.
        assert_eq!(attrs.get_ints("kernel_shape"), Some(&[5i64, 3][..]));
        assert_eq!(attrs.get_ints("strides"), Some(&[2i64, 1][..]));
    }

    #[test]
    fn test_conv_all_defaults() {
        let layer = conv_layer(ConvolutionParam {
            num_output: 16,
            ..Default::default()
        });
        let attrs = extract_attrs(&layer);
        assert_eq!(attrs.get_ints("pads"), Some(&[0i64, 0, 0, 0][..]));
        assert_eq!(attrs.get_ints("strides"), Some(&[1i64, 1][..]));
        assert_eq!(attrs.get_ints("kernel_shape"), Some(&[0i64, 0][..]));
    }

    #[test]
    fn test_conv_group_and_dilation() {
        let layer = conv_layer(ConvolutionParam {
            num_output: 32,
            kernel_size: vec![3],
            dilation: vec![2],
            group: Some(32),
            ..Default::default()
        });
        let attrs = extract_attrs(&layer);
        assert_eq!(attrs.get_ints("dilations"), Some(&[2i64, 2][..]));
        assert_eq!(attrs.get_int("group"), Some(32));
    }

    #[test]
    fn test_pooling_scalar_fallbacks() {
        let mut layer = RawLayer::new("pool1", LayerKind::Pooling);
        layer.pooling = Some(PoolingParam {
            kernel_size: 3,
            stride: 2,
            pad: 1,
            ..Default::default()
        });
        let attrs = extract_attrs(&layer);
        assert_eq!(attrs.get_ints("kernel_shape"), Some(&[3i64, 3][..]));
        assert_eq!(attrs.get_ints("strides"), Some(&[2i64, 2][..]));
        assert_eq!(attrs.get_ints("pads"), Some(&[1i64, 1, 1, 1][..]));
        assert_eq!(
            attrs.get("dim_round_mode").unwrap().as_str(),
            Some("ceil")
        );
    }

    #[test]
    fn test_pooling_axis_overrides() {
        let mut layer = RawLayer::new("pool1", LayerKind::Pooling);
        layer.pooling = Some(PoolingParam {
            kernel_size: 2,
            kernel_h: Some(4),
            ..Default::default()
        });
        let attrs = extract_attrs(&layer);
        assert_eq!(attrs.get_ints("kernel_shape"), Some(&[2i64, 4][..]));
    }

    #[test]
    fn test_lrn_attrs() {
        let mut layer = RawLayer::new("norm1", LayerKind::Lrn);
        layer.lrn = Some(LrnParam {
            local_size: 5,
            alpha: 1e-4,
            beta: 0.75,
            k: 2.0,
        });
        let attrs = extract_attrs(&layer);
        assert_eq!(attrs.get_float("alpha"), Some(1e-4));
        assert_eq!(attrs.get_float("beta"), Some(0.75));
        assert_eq!(attrs.get_int("size"), Some(5));
        assert_eq!(attrs.get_float("bias"), Some(2.0));
    }

    #[test]
    fn test_batch_norm_epsilon() {
        let layer = RawLayer::new("bn1", LayerKind::BatchNorm);
        let attrs = extract_attrs(&layer);
        assert_eq!(attrs.get_float("epsilon"), Some(1e-5));
    }

    #[test]
    fn test_inner_product_attrs() {
        let layer = RawLayer::new("fc6", LayerKind::InnerProduct);
        let attrs = extract_attrs(&layer);
        assert_eq!(attrs.get_int("broadcast"), Some(1));
        assert_eq!(attrs.get_int("transB"), Some(1));
    }

    #[test]
    fn test_relu_alpha() {
        let mut layer = RawLayer::new("relu1", LayerKind::ReLU);
        layer.relu = Some(ReluParam {
            negative_slope: 0.1,
        });
        let attrs = extract_attrs(&layer);
        assert_eq!(attrs.get_float("alpha"), Some(0.1));

        let plain = RawLayer::new("relu2", LayerKind::ReLU);
        assert_eq!(extract_attrs(&plain).get_float("alpha"), Some(0.0));
    }

    #[test]
    fn test_attribute_free_operators() {
        for kind in [
            LayerKind::Eltwise,
            LayerKind::Concat,
            LayerKind::Softmax,
            LayerKind::Scale,
            LayerKind::Dropout,
            LayerKind::Split,
            LayerKind::Input,
        ] {
            assert!(extract_attrs(&RawLayer::new("l", kind)).is_empty());
        }
    }
}
