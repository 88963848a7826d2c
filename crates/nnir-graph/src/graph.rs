// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The IR graph sink.
//!
//! [`IrGraph`] accumulates everything the lowering pass emits — nodes,
//! declared inputs/outputs, parameter variables, and raw binary payloads —
//! and persists the result as a folder:
//!
//! ```text
//! <out>/
//!   graph.json      inputs, outputs, variables, locals, nodes
//!   binary/
//!     <name>.raw    one flat little-endian f32 payload per variable
//! ```
//!
//! The graph never reads anything back; it is a write-only collaborator
//! of the lowering pass.

use crate::{GraphError, IrNode, IrTensor};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::Path;

/// Filename of the graph descriptor inside the output folder.
const GRAPH_FILE: &str = "graph.json";

/// Subdirectory holding raw binary payloads.
const BINARY_DIR: &str = "binary";

/// The normalized output graph.
#[derive(Debug, Default, serde::Serialize)]
pub struct IrGraph {
    inputs: Vec<IrTensor>,
    outputs: Vec<IrTensor>,
    variables: Vec<IrTensor>,
    /// Intermediate tensor names, filled in by [`IrGraph::update_locals`].
    locals: Vec<String>,
    nodes: Vec<IrNode>,
    #[serde(skip)]
    binaries: IndexMap<String, Vec<u8>>,
}

impl IrGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a network input tensor.
    pub fn add_input(&mut self, tensor: IrTensor) {
        tracing::debug!("graph input: {tensor}");
        self.inputs.push(tensor);
    }

    /// Declares a network output tensor.
    ///
    /// Locals are classified before the output boundary is extracted, so
    /// the output name is removed from the locals list if it was already
    /// classified as an intermediate.
    pub fn add_output(&mut self, tensor: IrTensor) {
        tracing::debug!("graph output: {tensor}");
        self.locals.retain(|name| *name != tensor.name);
        self.outputs.push(tensor);
    }

    /// Declares a named parameter tensor (weight, bias, or fused scale).
    pub fn add_variable(&mut self, tensor: IrTensor) {
        tracing::debug!("graph variable: {tensor}");
        self.variables.push(tensor);
    }

    /// Registers the raw payload for a named variable.
    pub fn add_binary(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let name = name.into();
        tracing::debug!("graph binary: {} ({} bytes)", name, bytes.len());
        self.binaries.insert(name, bytes);
    }

    /// Appends an operator node and returns its index.
    pub fn add_node(&mut self, node: IrNode) -> usize {
        tracing::debug!("graph node {}: {node}", self.nodes.len());
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Replaces the node at `index`.
    ///
    /// Used by the fusion path when an already-emitted node gains fused
    /// parameters and a new identity.
    pub fn replace_node(&mut self, index: usize, node: IrNode) -> Result<(), GraphError> {
        let len = self.nodes.len();
        match self.nodes.get_mut(index) {
            Some(slot) => {
                tracing::debug!("graph node {index} replaced: {node}");
                *slot = node;
                Ok(())
            }
            None => Err(GraphError::NodeIndexError { index, len }),
        }
    }

    /// Classifies every tensor name referenced by a node that is not a
    /// declared input, output, or variable as a local intermediate.
    pub fn update_locals(&mut self) {
        let declared: HashSet<&str> = self
            .inputs
            .iter()
            .chain(self.outputs.iter())
            .chain(self.variables.iter())
            .map(|t| t.name.as_str())
            .collect();

        let mut seen = HashSet::new();
        let mut locals = Vec::new();
        for node in &self.nodes {
            for name in node.inputs.iter().chain(node.outputs.iter()) {
                if !declared.contains(name.as_str()) && seen.insert(name.as_str()) {
                    locals.push(name.clone());
                }
            }
        }
        tracing::debug!("graph locals: {}", locals.len());
        self.locals = locals;
    }

    /// Writes the graph folder to `dir`, creating it if necessary.
    pub fn to_file(&self, dir: &Path) -> Result<(), GraphError> {
        let write_err = |path: &Path, source: std::io::Error| GraphError::WriteError {
            path: path.display().to_string(),
            source,
        };

        std::fs::create_dir_all(dir).map_err(|e| write_err(dir, e))?;

        let graph_path = dir.join(GRAPH_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&graph_path, json).map_err(|e| write_err(&graph_path, e))?;

        let binary_dir = dir.join(BINARY_DIR);
        std::fs::create_dir_all(&binary_dir).map_err(|e| write_err(&binary_dir, e))?;
        for (name, bytes) in &self.binaries {
            let path = binary_dir.join(format!("{name}.raw"));
            std::fs::write(&path, bytes).map_err(|e| write_err(&path, e))?;
        }

        tracing::info!(
            "wrote graph to {}: {} nodes, {} variables, {} binaries",
            dir.display(),
            self.nodes.len(),
            self.variables.len(),
            self.binaries.len(),
        );
        Ok(())
    }

    /// Declared network inputs.
    pub fn inputs(&self) -> &[IrTensor] {
        &self.inputs
    }

    /// Declared network outputs.
    pub fn outputs(&self) -> &[IrTensor] {
        &self.outputs
    }

    /// Declared parameter variables, in registration order.
    pub fn variables(&self) -> &[IrTensor] {
        &self.variables
    }

    /// Local intermediate tensor names (valid after [`IrGraph::update_locals`]).
    pub fn locals(&self) -> &[String] {
        &self.locals
    }

    /// Emitted nodes, in emission order.
    pub fn nodes(&self) -> &[IrNode] {
        &self.nodes
    }

    /// Registered binary payloads, in registration order.
    pub fn binaries(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.binaries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Looks up a binary payload by name.
    pub fn binary(&self, name: &str) -> Option<&[u8]> {
        self.binaries.get(name).map(Vec::as_slice)
    }
}
