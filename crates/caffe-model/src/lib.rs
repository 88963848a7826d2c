// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # caffe-model
//!
//! Decoded source-model types and the model loader for the caffe2ir
//! compiler.
//!
//! This crate is the "decoder collaborator": it turns a model directory
//! (`model.json` layer manifest + `model.safetensors` payloads) into an
//! in-memory [`NetModel`] — an ordered list of [`RawLayer`]s with typed
//! parameters and raw f32 blobs. It knows nothing about the IR; the
//! lowering pass consumes what it produces.
//!
//! - [`LayerKind`] — the source operator vocabulary (Caffe spellings).
//! - Parameter records with protobuf-style field presence
//!   ([`ConvolutionParam`], [`PoolingParam`], ...).
//! - [`RawLayer`] / [`NetModel`] — the decoded model.
//! - [`NetManifest`] / [`ModelLoader`] — disk format and loading.

mod error;
mod layer;
mod loader;
mod manifest;
mod params;

pub use error::ModelError;
pub use layer::{LayerKind, NetModel, RawLayer};
pub use loader::ModelLoader;
pub use manifest::{ManifestLayer, NetManifest};
pub use params::{
    BatchNormParam, ConvolutionParam, InnerProductParam, LrnParam, PoolMethod, PoolingParam,
    ReluParam,
};
