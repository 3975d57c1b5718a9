// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Values documents and the layered pipeline that resolves them.
//!
//! A values document is the structured set of parameters injected into an addon's
//! manifest bundle for one managed cluster. Documents are produced by
//! [`ValueResolver`]s and combined by a [`ValuePipeline`]:
//!
//! ```text
//! Defaults ──► UserAnnotation ──► AddonAnnotation ──► final Values
//!  baseline     operator intent    administrative intent
//! ```
//!
//! Later layers win for scalar keys; nested mappings (`global.imageOverrides`,
//! `global.proxyConfig`, ...) are merged key by key.
//!
//! # Example
//!
//! ```rust
//! use grc_addon::values::Values;
//! use serde_json::json;
//!
//! let mut base = Values::from_json_object(json!({"global": {"imageOverrides": {"a": "1", "b": "2"}}}));
//! base.merge(Values::from_json_object(json!({"global": {"imageOverrides": {"b": "3"}}})));
//!
//! assert_eq!(base.get_path("global.imageOverrides.a"), Some(&json!("1")));
//! assert_eq!(base.get_path("global.imageOverrides.b"), Some(&json!("3")));
//! ```

pub mod pipeline;
pub mod resolvers;

pub use pipeline::ValuePipeline;
pub use resolvers::ValueResolver;

use crate::errors::ValuesError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A values document: a JSON object keyed by chart value names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(Map<String, Value>);

impl Values {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from a JSON value, keeping it only if it is an object.
    ///
    /// Anything other than an object yields an empty document.
    #[must_use]
    pub fn from_json_object(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Decode a serialized document.
    ///
    /// An empty (or whitespace-only) input and a JSON `null` both decode to an empty
    /// document. Any other non-object input is a decode error.
    ///
    /// # Errors
    ///
    /// Returns [`ValuesError::Decode`] if `raw` is not valid JSON or is not a JSON object.
    pub fn decode(source_name: &str, raw: &str) -> Result<Self, ValuesError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_str(raw).map_err(|e| ValuesError::Decode {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(ValuesError::Decode {
                source_name: source_name.to_string(),
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    /// Merge `overrides` into this document.
    ///
    /// For every key in `overrides`: if both sides hold objects they are merged
    /// recursively, a `null` over an object leaves the object in place, otherwise
    /// the override value replaces the existing one.
    pub fn merge(&mut self, overrides: Values) {
        merge_maps(&mut self.0, overrides.0);
    }

    /// Consuming variant of [`Values::merge`].
    #[must_use]
    pub fn merged(mut self, overrides: Values) -> Self {
        self.merge(overrides);
        self
    }

    /// Top-level value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value at a dotted path such as `global.imageOverrides.config_policy_controller`.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// String value at a dotted path.
    #[must_use]
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get_path(path).and_then(Value::as_str)
    }

    /// Set a top-level key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Whether the document has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Render the document as YAML, the form chart values files use.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.0)
    }
}

impl From<Map<String, Value>> for Values {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Values> for Value {
    fn from(values: Values) -> Self {
        Value::Object(values.0)
    }
}

fn merge_maps(dst: &mut Map<String, Value>, src: Map<String, Value>) {
    for (key, value) in src {
        match value {
            Value::Object(incoming) => match dst.get_mut(&key) {
                Some(Value::Object(existing)) => merge_maps(existing, incoming),
                _ => {
                    dst.insert(key, Value::Object(incoming));
                }
            },
            Value::Null if matches!(dst.get(&key), Some(Value::Object(_))) => {}
            value => {
                dst.insert(key, value);
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
