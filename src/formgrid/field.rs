//! # Field Descriptors
//!
//! Two shapes describe a field:
//!
//! - [`RawDescriptor`]: what the host hands us. Keys may collide.
//! - [`ResolvedDescriptor`]: a live collection item. Keys are unique, the item has a
//!   stable id, and it knows whether it came from the host or was added at runtime.
//!
//! A `ResolvedDescriptor` can only be produced by [`crate::resolve::resolve`] or by the
//! collection's add path, and there is no conversion back to a `RawDescriptor`. Already
//! resolved data therefore can never be fed through resolution a second time.

use crate::compose::TokenPosition;
use crate::sequence::SequenceKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A field's current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            FieldValue::Text(_) => None,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Flag(b) => write!(f, "{}", b),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSide {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSpec {
    pub kind: SequenceKind,
    #[serde(default)]
    pub prefix: bool,
    #[serde(default)]
    pub suffix: bool,
}

impl SequenceSpec {
    pub fn position(&self) -> TokenPosition {
        TokenPosition::from_flags(self.prefix, self.suffix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSpec {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub position: LabelSide,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<SequenceSpec>,
}

/// The attributes that identify a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyAttr {
    Key,
    AltKey,
}

impl KeyAttr {
    pub const ALL: [KeyAttr; 2] = [KeyAttr::Key, KeyAttr::AltKey];
}

impl fmt::Display for KeyAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAttr::Key => write!(f, "key"),
            KeyAttr::AltKey => write!(f, "altKey"),
        }
    }
}

/// A field as declared by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDescriptor {
    #[serde(alias = "name")]
    pub key: String,
    #[serde(default, alias = "id")]
    pub alt_key: String,
    #[serde(default)]
    pub value: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelSpec>,
    /// Choices for select and radio fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl RawDescriptor {
    pub fn new(key: impl Into<String>, alt_key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            alt_key: alt_key.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: FieldValue) -> Self {
        self.value = value;
        self
    }

    pub fn with_label(mut self, label: LabelSpec) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn attr(&self, attr: KeyAttr) -> &str {
        match attr {
            KeyAttr::Key => &self.key,
            KeyAttr::AltKey => &self.alt_key,
        }
    }

    pub(crate) fn attr_mut(&mut self, attr: KeyAttr) -> &mut String {
        match attr {
            KeyAttr::Key => &mut self.key,
            KeyAttr::AltKey => &mut self.alt_key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Origin {
    FromHost,
    RuntimeAdded,
}

/// A live collection item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDescriptor {
    id: Uuid,
    key: String,
    alt_key: String,
    value: FieldValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<LabelSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<String>,
    origin: Origin,
}

impl ResolvedDescriptor {
    pub(crate) fn from_raw(raw: RawDescriptor, origin: Origin) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: raw.key,
            alt_key: raw.alt_key,
            value: raw.value,
            label: raw.label,
            options: raw.options,
            origin,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn alt_key(&self) -> &str {
        &self.alt_key
    }

    pub fn attr(&self, attr: KeyAttr) -> &str {
        match attr {
            KeyAttr::Key => &self.key,
            KeyAttr::AltKey => &self.alt_key,
        }
    }

    pub(crate) fn set_attr(&mut self, attr: KeyAttr, value: String) {
        match attr {
            KeyAttr::Key => self.key = value,
            KeyAttr::AltKey => self.alt_key = value,
        }
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub(crate) fn set_value(&mut self, value: FieldValue) {
        self.value = value;
    }

    pub fn label(&self) -> Option<&LabelSpec> {
        self.label.as_ref()
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }
}
