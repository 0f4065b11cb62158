//! # Field Variants
//!
//! Text inputs, selects, radio groups and checkbox groups share one add/delete/rename
//! lifecycle (see [`crate::collection`]). What differs is captured by [`FieldVariant`]:
//! how a value is read off a raw input event, what a freshly added item starts with,
//! and which values the field accepts.

use crate::field::{FieldValue, RawDescriptor, ResolvedDescriptor};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A raw change event as forwarded by the rendering surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
}

impl InputEvent {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            checked: false,
        }
    }

    pub fn checkbox(name: impl Into<String>, checked: bool) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            checked,
        }
    }
}

pub trait FieldVariant {
    const NAME: &'static str;

    /// Whether a group of these fields holds several values at once.
    const IS_MULTI_VALUE: bool;

    fn read_value(event: &InputEvent) -> FieldValue;

    fn default_value(template: &RawDescriptor) -> FieldValue;

    fn accepts(_item: &ResolvedDescriptor, _value: &FieldValue) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextInput;

#[derive(Debug, Clone, Copy, Default)]
pub struct SingleSelect;

#[derive(Debug, Clone, Copy, Default)]
pub struct RadioGroup;

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckboxGroup;

impl FieldVariant for TextInput {
    const NAME: &'static str = "text";
    const IS_MULTI_VALUE: bool = false;

    fn read_value(event: &InputEvent) -> FieldValue {
        FieldValue::Text(event.value.clone())
    }

    fn default_value(_template: &RawDescriptor) -> FieldValue {
        FieldValue::Text(String::new())
    }
}

impl FieldVariant for SingleSelect {
    const NAME: &'static str = "select";
    const IS_MULTI_VALUE: bool = false;

    fn read_value(event: &InputEvent) -> FieldValue {
        FieldValue::Text(event.value.clone())
    }

    fn default_value(template: &RawDescriptor) -> FieldValue {
        FieldValue::Text(template.options.first().cloned().unwrap_or_default())
    }

    fn accepts(item: &ResolvedDescriptor, value: &FieldValue) -> bool {
        match value {
            FieldValue::Text(v) => item.options().is_empty() || item.options().contains(v),
            FieldValue::Flag(_) => false,
        }
    }
}

impl FieldVariant for RadioGroup {
    const NAME: &'static str = "radio";
    const IS_MULTI_VALUE: bool = false;

    fn read_value(event: &InputEvent) -> FieldValue {
        FieldValue::Text(event.value.clone())
    }

    fn default_value(_template: &RawDescriptor) -> FieldValue {
        FieldValue::Text(String::new())
    }
}

impl FieldVariant for CheckboxGroup {
    const NAME: &'static str = "checkbox";
    const IS_MULTI_VALUE: bool = true;

    fn read_value(event: &InputEvent) -> FieldValue {
        FieldValue::Flag(event.checked)
    }

    fn default_value(_template: &RawDescriptor) -> FieldValue {
        FieldValue::Flag(false)
    }
}

/// Variant selector for callers that pick the variant at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Text,
    Select,
    Radio,
    Checkbox,
}

impl FromStr for VariantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(VariantKind::Text),
            "select" => Ok(VariantKind::Select),
            "radio" => Ok(VariantKind::Radio),
            "checkbox" => Ok(VariantKind::Checkbox),
            other => Err(format!("Unknown field variant: {}", other)),
        }
    }
}
