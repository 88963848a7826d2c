// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # caffe2ir
//!
//! Command-line interface for the caffe2ir model compiler.
//!
//! ## Usage
//! ```bash
//! # Convert a model directory into an IR graph folder
//! caffe2ir convert --model ./squeezenet --output ./squeezenet.nnir --input-dims 1,3,224,224
//!
//! # Inspect a model's layer structure
//! caffe2ir inspect --model ./squeezenet
//! ```

mod commands;
mod config;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "caffe2ir",
    about = "Compile a Caffe-style model into a normalized IR graph",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (CLI arguments take precedence).
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a model directory into an IR graph folder.
    Convert {
        /// Path to the model directory (model.json + model.safetensors).
        #[arg(short, long)]
        model: Option<std::path::PathBuf>,

        /// Output folder for the IR graph.
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,

        /// Network input dimensions as N,C,H,W (e.g. "1,3,224,224").
        #[arg(short, long)]
        input_dims: Option<String>,
    },

    /// Inspect a model: print its layer graph and blob summary.
    Inspect {
        /// Path to the model directory.
        #[arg(short, long)]
        model: std::path::PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert {
            model,
            output,
            input_dims,
        } => commands::convert::execute(cli.config, model, output, input_dims),
        Commands::Inspect { model } => commands::inspect::execute(model),
    }
}
