//! Module, method and field definitions.

use serde::Serialize;
use std::collections::BTreeMap;

use super::value_type::ValueType;

/// One generation root: the exported surface of a single interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub name: String,
    pub methods: Vec<Method>,
    pub members: Vec<Field>,
    pub documentation: String,

    /// Free-form tags passed through to templates unchanged.
    pub custom_tags: BTreeMap<String, serde_json::Value>,
}

impl Module {
    /// Every type directly reachable from the public surface of the module,
    /// in declaration order: members first, then each method's parameters
    /// followed by its return type.
    pub fn root_types(&self) -> impl Iterator<Item = &ValueType> {
        let members = self.members.iter().map(|field| &field.value_type);
        let methods = self.methods.iter().flat_map(|method| {
            method
                .parameters
                .iter()
                .map(|field| &field.value_type)
                .chain(method.return_type.iter())
        });
        members.chain(methods)
    }

    /// Insert `tags` for every key the module does not define yet.
    pub fn merge_default_tags(&mut self, tags: &BTreeMap<String, serde_json::Value>) {
        for (key, value) in tags {
            self.custom_tags
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    pub name: String,
    pub parameters: Vec<Field>,

    /// `None` when the method returns no meaningful value.
    pub return_type: Option<ValueType>,

    pub is_async: bool,
    pub documentation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub value_type: ValueType,
    pub documentation: String,

    /// Constant value rendered as a literal instead of a stored field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_value: Option<serde_json::Value>,
}

impl Field {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            documentation: String::new(),
            static_value: None,
        }
    }
}
