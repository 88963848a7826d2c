// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `caffe2ir inspect` command: display a model's layer structure.

use std::path::PathBuf;

pub fn execute(model: PathBuf) -> anyhow::Result<()> {
    let net = caffe_model::ModelLoader::load(&model).map_err(|e| {
        anyhow::anyhow!("failed to load model from '{}': {e}", model.display())
    })?;

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              caffe2ir · Model Inspector              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Model: {}", net.name);
    if !net.inputs.is_empty() {
        println!("  Declared inputs: {}", net.inputs.join(", "));
    }
    println!("  Layers: {}", net.layers.len());
    println!();

    println!(
        "  {:<4} {:<28} {:<16} {:<22} {:<22} {:>6}",
        "Idx", "Name", "Type", "Bottoms", "Tops", "Blobs",
    );
    println!("  {}", "-".repeat(102));

    let mut total_params = 0usize;
    for (i, layer) in net.layers.iter().enumerate() {
        total_params += layer.blobs.iter().map(Vec::len).sum::<usize>();
        println!(
            "  {:<4} {:<28} {:<16} {:<22} {:<22} {:>6}",
            i,
            truncate(&layer.name, 28),
            layer.kind.as_str(),
            truncate(&layer.bottoms.join(","), 22),
            truncate(&layer.tops.join(","), 22),
            layer.blobs.len(),
        );
    }

    println!();
    println!(
        "  Total parameters: {:.2} M ({:.2} MB as f32)",
        total_params as f64 / 1e6,
        total_params as f64 * 4.0 / (1024.0 * 1024.0),
    );
    println!();
    Ok(())
}

/// Truncates a string to `max_len` with ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
