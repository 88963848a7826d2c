// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Conversion configuration loaded from TOML files.
//!
//! # TOML Format
//! ```toml
//! model_path = "./squeezenet"
//! output_path = "./squeezenet.nnir"
//! input_dims = "1,3,224,224"
//! ```

use anyhow::Context;
use std::path::{Path, PathBuf};

/// Configuration for the `convert` command.
///
/// Every field mirrors a CLI argument; explicit CLI arguments take
/// precedence over values read from the file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConvertConfig {
    /// Path to the model directory.
    pub model_path: Option<PathBuf>,
    /// Output folder for the IR graph.
    pub output_path: Option<PathBuf>,
    /// Network input dimensions as `"N,C,H,W"`.
    pub input_dims: Option<String>,
}

impl ConvertConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config '{}'", path.display()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str).context("TOML parse error")
    }
}
