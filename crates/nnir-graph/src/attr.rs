// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Node attribute values and attribute maps.
//!
//! Attribute values are restricted to five kinds: integer, float, string,
//! integer list, and float list. Lists must be homogeneous. Anything else
//! in a serialised graph is rejected at deserialisation time with an
//! "unsupported attribute" error, so every consumer downstream can match
//! exhaustively on [`AttrValue`] without runtime type inspection.

use indexmap::IndexMap;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single attribute value attached to an IR node.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A scalar integer (e.g. `group`).
    Int(i64),
    /// A scalar float (e.g. `epsilon`).
    Float(f32),
    /// A string (e.g. `dim_round_mode`).
    Str(String),
    /// A homogeneous integer list (e.g. `pads`).
    Ints(Vec<i64>),
    /// A homogeneous float list.
    Floats(Vec<f32>),
}

impl AttrValue {
    /// Returns the scalar integer, or `None` for any other kind.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the scalar float, or `None` for any other kind.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string, or `None` for any other kind.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the integer list, or `None` for any other kind.
    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            AttrValue::Ints(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the float list, or `None` for any other kind.
    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            AttrValue::Floats(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

impl From<Vec<i64>> for AttrValue {
    fn from(v: Vec<i64>) -> Self {
        AttrValue::Ints(v)
    }
}

impl From<Vec<f32>> for AttrValue {
    fn from(v: Vec<f32>) -> Self {
        AttrValue::Floats(v)
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttrValue::Int(v) => serializer.serialize_i64(*v),
            AttrValue::Float(v) => serializer.serialize_f32(*v),
            AttrValue::Str(v) => serializer.serialize_str(v),
            AttrValue::Ints(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for x in v {
                    seq.serialize_element(x)?;
                }
                seq.end()
            }
            AttrValue::Floats(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for x in v {
                    seq.serialize_element(x)?;
                }
                seq.end()
            }
        }
    }
}

/// Scalar element used while checking list homogeneity.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListElem {
    Int(i64),
    Float(f32),
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for AttrValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttrVisitor;

        impl<'de> Visitor<'de> for AttrVisitor {
            type Value = AttrValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer, float, string, or homogeneous list of integers or floats")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<AttrValue, E> {
                Ok(AttrValue::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<AttrValue, E> {
                Ok(AttrValue::Int(v as i64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<AttrValue, E> {
                Ok(AttrValue::Float(v as f32))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<AttrValue, E> {
                Ok(AttrValue::Str(v.to_string()))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<AttrValue, A::Error> {
                let mut ints = Vec::new();
                let mut floats = Vec::new();
                let mut saw_float = false;
                let mut saw_int = false;
                while let Some(elem) = seq.next_element::<ListElem>()? {
                    match elem {
                        ListElem::Int(v) => {
                            saw_int = true;
                            ints.push(v);
                        }
                        ListElem::Float(v) => {
                            saw_float = true;
                            floats.push(v);
                        }
                        ListElem::Other(v) => {
                            return Err(de::Error::custom(format!(
                                "unsupported attribute list element: {v}"
                            )));
                        }
                    }
                    if saw_int && saw_float {
                        return Err(de::Error::custom(
                            "unsupported attribute list: mixed integer and float elements",
                        ));
                    }
                }
                if saw_float {
                    Ok(AttrValue::Floats(floats))
                } else {
                    Ok(AttrValue::Ints(ints))
                }
            }
        }

        deserializer.deserialize_any(AttrVisitor)
    }
}

/// An insertion-ordered attribute map for one IR node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IrAttrs {
    entries: IndexMap<String, AttrValue>,
}

impl IrAttrs {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, replacing any previous value under the same name.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.entries.insert(name.to_string(), value.into());
    }

    /// Looks up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.get(name)
    }

    /// Looks up a scalar integer attribute.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(AttrValue::as_int)
    }

    /// Looks up a scalar float attribute.
    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(AttrValue::as_float)
    }

    /// Looks up an integer-list attribute.
    pub fn get_ints(&self, name: &str) -> Option<&[i64]> {
        self.get(name).and_then(AttrValue::as_ints)
    }

    /// Looks up a float-list attribute.
    pub fn get_floats(&self, name: &str) -> Option<&[f32]> {
        self.get(name).and_then(AttrValue::as_floats)
    }

    /// Returns `true` if no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over the attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get() {
        let mut attrs = IrAttrs::new();
        attrs.set("group", 2i64);
        attrs.set("epsilon", 1e-5f32);
        attrs.set("dim_round_mode", "ceil");
        attrs.set("pads", vec![1i64, 1, 1, 1]);

        assert_eq!(attrs.get_int("group"), Some(2));
        assert_eq!(attrs.get_float("epsilon"), Some(1e-5));
        assert_eq!(attrs.get("dim_round_mode").unwrap().as_str(), Some("ceil"));
        assert_eq!(attrs.get_ints("pads"), Some(&[1i64, 1, 1, 1][..]));
        assert_eq!(attrs.get("missing"), None);
    }

    #[test]
    fn test_insertion_order() {
        let mut attrs = IrAttrs::new();
        attrs.set("strides", vec![2i64, 2]);
        attrs.set("kernel_shape", vec![3i64, 3]);
        attrs.set("group", 1i64);
        let names: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["strides", "kernel_shape", "group"]);
    }

    #[test]
    fn test_set_replaces() {
        let mut attrs = IrAttrs::new();
        attrs.set("strides", vec![2i64, 2]);
        attrs.set("strides", vec![1i64, 1]);
        assert_eq!(attrs.get_ints("strides"), Some(&[1i64, 1][..]));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut attrs = IrAttrs::new();
        attrs.set("alpha", 0.1f32);
        attrs.set("size", 5i64);
        attrs.set("pads", vec![3i64, 3, 3, 3]);
        attrs.set("mode", "ceil");

        let json = serde_json::to_string(&attrs).unwrap();
        let back: IrAttrs = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get_float("alpha"), Some(0.1));
        assert_eq!(back.get_int("size"), Some(5));
        assert_eq!(back.get_ints("pads"), Some(&[3i64, 3, 3, 3][..]));
        assert_eq!(back.get("mode").unwrap().as_str(), Some("ceil"));
    }

    #[test]
    fn test_reject_mixed_list() {
        let err = serde_json::from_str::<AttrValue>("[1, 2.5]").unwrap_err();
        assert!(err.to_string().contains("unsupported attribute"));
    }

    #[test]
    fn test_reject_string_list() {
        let err = serde_json::from_str::<AttrValue>(r#"["a", "b"]"#).unwrap_err();
        assert!(err.to_string().contains("unsupported attribute"));
    }

    #[test]
    fn test_reject_unsupported_kind() {
        assert!(serde_json::from_str::<AttrValue>("true").is_err());
        assert!(serde_json::from_str::<AttrValue>(r#"{"a": 1}"#).is_err());
    }

    #[test]
    fn test_float_list_roundtrip() {
        let json = "[0.5, 1.5]";
        let v: AttrValue = serde_json::from_str(json).unwrap();
        assert_eq!(v, AttrValue::Floats(vec![0.5, 1.5]));
    }

    #[test]
    fn test_empty_list_is_ints() {
        let v: AttrValue = serde_json::from_str("[]").unwrap();
        assert_eq!(v, AttrValue::Ints(vec![]));
    }
}
