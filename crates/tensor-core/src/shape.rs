// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors.

use std::fmt;

/// Describes the dimensionality of a tensor in the compiler.
///
/// Activation tensors in this pipeline are always rank-4 `(N, C, H, W)`;
/// parameter tensors (weights, biases) may be rank-1 or rank-4. Dimensions
/// are signed: the convolution and pooling output formulas are evaluated
/// verbatim, and a malformed model can legally produce a zero or negative
/// extent which the compiler propagates rather than repairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Vec<i64>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![1, 3, 224, 224]);
    /// assert_eq!(s.rank(), 4);
    /// assert_eq!(s.num_elements(), 150_528);
    /// ```
    pub fn new(dims: Vec<i64>) -> Self {
        Self { dims }
    }

    /// Creates a rank-4 activation shape `(batch, channels, height, width)`.
    pub fn nchw(n: i64, c: i64, h: i64, w: i64) -> Self {
        Self {
            dims: vec![n, c, h, w],
        }
    }

    /// Creates a 1-D shape (bias vectors, per-channel parameters).
    pub fn vector(len: i64) -> Self {
        Self { dims: vec![len] }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[i64] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<i64> {
        self.dims.get(index).copied()
    }

    /// Interprets this shape as `(N, C, H, W)`.
    ///
    /// Returns `None` for any rank other than 4.
    pub fn as_nchw(&self) -> Option<(i64, i64, i64, i64)> {
        match self.dims[..] {
            [n, c, h, w] => Some((n, c, h, w)),
            _ => None,
        }
    }

    /// Returns the total number of elements.
    ///
    /// For a rank-0 shape, returns 1. Negative dimensions participate in
    /// the product unchanged.
    pub fn num_elements(&self) -> i64 {
        self.dims.iter().product()
    }

    /// Computes the memory footprint in bytes for a given [`crate::DType`].
    ///
    /// Returns 0 for shapes with non-positive element counts.
    pub fn size_bytes(&self, dtype: super::DType) -> usize {
        let elements = self.num_elements();
        if elements <= 0 {
            0
        } else {
            elements as usize * dtype.size_bytes()
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Convenience: `Shape::from(vec![1, 3, 224, 224])`.
impl From<Vec<i64>> for Shape {
    fn from(dims: Vec<i64>) -> Self {
        Self::new(dims)
    }
}

/// Convenience: `Shape::from(&[64, 3, 3, 3][..])`.
impl From<&[i64]> for Shape {
    fn from(dims: &[i64]) -> Self {
        Self::new(dims.to_vec())
    }
}
