// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `caffe2ir convert` command: model directory → IR graph folder.

use crate::config::ConvertConfig;
use anyhow::Context;
use std::path::PathBuf;
use tensor_core::Shape;

pub fn execute(
    config: Option<PathBuf>,
    model: Option<PathBuf>,
    output: Option<PathBuf>,
    input_dims: Option<String>,
) -> anyhow::Result<()> {
    // CLI arguments win over config-file values.
    let file_cfg = match config {
        Some(path) => ConvertConfig::from_file(&path)?,
        None => ConvertConfig {
            model_path: None,
            output_path: None,
            input_dims: None,
        },
    };
    let model = model
        .or(file_cfg.model_path)
        .context("no model directory given (use --model or a config file)")?;
    let output = output
        .or(file_cfg.output_path)
        .context("no output folder given (use --output or a config file)")?;
    let dims_arg = input_dims
        .or(file_cfg.input_dims)
        .context("no input dimensions given (use --input-dims or a config file)")?;
    let input_dims = parse_input_dims(&dims_arg)?;

    println!("loading model from '{}' ...", model.display());
    let net = caffe_model::ModelLoader::load(&model)
        .with_context(|| format!("failed to load model from '{}'", model.display()))?;
    println!(
        "model '{}' loaded: {} layers, input {}",
        net.name,
        net.layers.len(),
        input_dims,
    );

    let graph = graph_lowering::lower(&net, input_dims)
        .with_context(|| format!("failed to compile model '{}'", net.name))?;

    graph
        .to_file(&output)
        .with_context(|| format!("failed to write graph to '{}'", output.display()))?;
    println!(
        "graph written to '{}': {} nodes, {} variables, {} locals",
        output.display(),
        graph.nodes().len(),
        graph.variables().len(),
        graph.locals().len(),
    );
    Ok(())
}

/// Parses `"N,C,H,W"` into a rank-4 shape.
fn parse_input_dims(arg: &str) -> anyhow::Result<Shape> {
    let dims: Vec<i64> = arg
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .with_context(|| format!("invalid dimension '{part}'"))
        })
        .collect::<anyhow::Result<_>>()?;
    anyhow::ensure!(
        dims.len() == 4,
        "expected 4 comma-separated dimensions (N,C,H,W), got {}",
        dims.len(),
    );
    anyhow::ensure!(
        dims.iter().all(|&d| d > 0),
        "input dimensions must be positive, got {arg}",
    );
    Ok(Shape::new(dims))
}
