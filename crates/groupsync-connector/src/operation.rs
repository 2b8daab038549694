//! Connector Framework operation types
//!
//! Attribute sets exchanged with the synchronization engine and the
//! modification requests it submits.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A set of attributes for a pivot entry, a fetched object, or a change request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    /// Map of attribute name to attribute value(s).
    #[serde(flatten)]
    attributes: HashMap<String, AttributeValue>,
}

impl AttributeSet {
    /// Create a new empty attribute set.
    pub fn new() -> Self {
        Self {
            attributes: HashMap::new(),
        }
    }

    /// Set an attribute value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Set an attribute using builder pattern.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Get an attribute value.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Get the first value of an attribute as a string.
    ///
    /// Multi-valued attributes yield their first string element.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|v| v.as_strings().into_iter().next())
    }

    /// Get a multi-valued string attribute.
    ///
    /// Returns `None` when the attribute is absent or null and `Some(vec![])`
    /// when it is present as an empty list; callers rely on the difference.
    pub fn get_strings(&self, name: &str) -> Option<Vec<&str>> {
        self.get(name)
            .filter(|v| !v.is_null())
            .map(AttributeValue::as_strings)
    }

    /// Check if an attribute exists.
    pub fn has(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// A value for an attribute, which may be single or multi-valued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// No value (null).
    Null,
    /// A single string value.
    String(String),
    /// Multiple values.
    Array(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Get as a string if this is a single string value.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as strings (works for both single and multi-valued).
    pub fn as_strings(&self) -> Vec<&str> {
        match self {
            AttributeValue::String(s) => vec![s.as_str()],
            AttributeValue::Array(arr) => arr.iter().filter_map(|v| v.as_string()).collect(),
            AttributeValue::Null => vec![],
        }
    }

    /// Check if this is multi-valued.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, AttributeValue::Array(_))
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(vec: Vec<T>) -> Self {
        AttributeValue::Array(vec.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttributeValue::Null, Into::into)
    }
}

/// Kind of change requested by the synchronization engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationKind {
    Create,
    Update,
    Delete,
}

/// A single change request: which object (by pivot) and which attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modifications {
    /// Kind of change.
    pub kind: ModificationKind,
    /// Pivot value identifying the target object.
    pub main_identifier: String,
    /// Attributes carried by the change. Absent attributes are left untouched.
    #[serde(default)]
    pub attributes: AttributeSet,
}

impl Modifications {
    /// Create a change request.
    pub fn new(
        kind: ModificationKind,
        main_identifier: impl Into<String>,
        attributes: AttributeSet,
    ) -> Self {
        Self {
            kind,
            main_identifier: main_identifier.into(),
            attributes,
        }
    }

    /// Create a delete request, which carries no attributes.
    pub fn delete(main_identifier: impl Into<String>) -> Self {
        Self::new(ModificationKind::Delete, main_identifier, AttributeSet::new())
    }
}
