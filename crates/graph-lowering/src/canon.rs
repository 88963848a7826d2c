// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Name canonicalization.
//!
//! Source models use `/` and `-` freely in blob and layer names; the IR
//! does not. Every name is passed through [`ir_name`] before it is
//! stored or compared anywhere in the pass.

/// Canonicalizes a source name for the IR: every `/` and `-` becomes `_`.
///
/// Total and idempotent: `ir_name(ir_name(s)) == ir_name(s)` for all `s`.
pub fn ir_name(name: &str) -> String {
    name.replace(['/', '-'], "_")
}
