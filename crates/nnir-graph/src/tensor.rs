// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Named tensor descriptors for graph inputs, outputs, and variables.

use std::fmt;
use tensor_core::{DType, Shape};

/// A named tensor in the IR graph.
///
/// `IrTensor` carries no data — inputs and outputs are placeholders, and
/// variable payloads are registered separately as binaries keyed by the
/// same name.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IrTensor {
    /// Canonical tensor name.
    pub name: String,
    /// Element data type.
    pub dtype: DType,
    /// Tensor shape.
    pub shape: Shape,
}

impl IrTensor {
    /// Creates a new tensor descriptor.
    pub fn new(name: impl Into<String>, dtype: DType, shape: Shape) -> Self {
        Self {
            name: name.into(),
            dtype,
            shape,
        }
    }
}

impl fmt::Display for IrTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.dtype.ir_tag(), self.shape)
    }
}
