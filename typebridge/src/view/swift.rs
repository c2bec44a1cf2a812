//! Swift type and literal spelling.
//!
//! # Type Mappings
//!
//! | Value type | Swift |
//! |------------|-------|
//! | `string` | `String` |
//! | `number` | `Double` |
//! | `boolean` | `Bool` |
//! | integer marker | `Int` |
//! | `T[]` | `[T]` |
//! | `Record<string, T>` | `[String: T]` |
//! | `T \| null` | `T?` |
//! | named types | type name, remapped |

use convert_case::{Case, Casing};
use serde_json::Value;
use std::collections::BTreeMap;

use super::transformer::{escape_string, union_member_for, ValueTransformer};
use crate::ir::{BasicType, DictionaryKey, ValueType};

/// Swift value transformer.
#[derive(Debug, Clone, Default)]
pub struct SwiftTransformer {
    /// Named type remaps (source name -> Swift name)
    type_name_map: BTreeMap<String, String>,
}

impl SwiftTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type_name_map(type_name_map: BTreeMap<String, String>) -> Self {
        Self { type_name_map }
    }

    fn number_literal(n: &serde_json::Number) -> String {
        match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        }
    }
}

impl ValueTransformer for SwiftTransformer {
    fn convert_value_type(&self, value_type: &ValueType) -> String {
        match value_type {
            ValueType::Basic(BasicType::String) => "String".to_string(),
            ValueType::Basic(BasicType::Number) => "Double".to_string(),
            ValueType::Basic(BasicType::Boolean) => "Bool".to_string(),
            ValueType::Basic(BasicType::Int) => "Int".to_string(),
            ValueType::Array(element) => format!("[{}]", self.convert_value_type(element)),
            ValueType::Dictionary { key, value } => {
                let key = match key {
                    DictionaryKey::String => "String",
                    DictionaryKey::Number => "Double",
                };
                format!("[{}: {}]", key, self.convert_value_type(value))
            }
            ValueType::Optional(inner) => format!("{}?", self.convert_value_type(inner)),
            ValueType::Custom(_)
            | ValueType::Enum(_)
            | ValueType::Union(_)
            | ValueType::Predefined(_) => {
                self.convert_type_name(value_type.name().unwrap_or_default())
            }
        }
    }

    fn convert_type_name(&self, name: &str) -> String {
        self.type_name_map
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    fn convert_enum_key(&self, key: &str) -> String {
        key.to_case(Case::Camel)
    }

    fn convert_value(&self, value: &Value, value_type: &ValueType) -> String {
        match (value_type, value) {
            (ValueType::Optional(_), Value::Null) => "nil".to_string(),
            (ValueType::Optional(inner), value) => self.convert_value(value, inner),

            (ValueType::Enum(enum_type), value) => match enum_type.member_for_json(value) {
                Some(member) => format!(".{}", self.convert_enum_key(&member.key)),
                None => value.to_string(),
            },

            (ValueType::Array(element), Value::Array(items)) => {
                let items: Vec<_> = items
                    .iter()
                    .map(|item| self.convert_value(item, element))
                    .collect();
                format!("[{}]", items.join(", "))
            }

            (ValueType::Dictionary { value: inner, .. }, Value::Object(entries)) => {
                self.dictionary_literal(entries, inner)
            }

            (ValueType::Custom(custom), Value::Object(entries)) => {
                if let Some(inner) = custom.dictionary_value_type() {
                    return self.dictionary_literal(entries, inner);
                }
                let arguments: Vec<_> = custom
                    .members
                    .iter()
                    .filter_map(|member| {
                        let entry = entries.get(&member.name)?;
                        Some(format!(
                            "{}: {}",
                            member.name,
                            self.convert_value(entry, &member.value_type)
                        ))
                    })
                    .collect();
                format!(
                    "{}({})",
                    self.convert_type_name(&custom.name),
                    arguments.join(", ")
                )
            }

            (ValueType::Union(union), value) => match union_member_for(union, value) {
                Some(member) => format!(
                    ".{}({})",
                    self.union_case_name(member),
                    self.convert_value(value, member)
                ),
                None => value.to_string(),
            },

            (_, Value::String(s)) => escape_string(s, &[]),
            (_, Value::Number(n)) => Self::number_literal(n),
            (_, Value::Null) => "nil".to_string(),
            (_, value) => value.to_string(),
        }
    }

    /// Basic alternatives last, otherwise declaration order.
    fn order_union_members<'v>(&self, members: &'v [ValueType]) -> Vec<&'v ValueType> {
        let (basic, other): (Vec<&ValueType>, Vec<&ValueType>) =
            members.iter().partition(|member| member.is_basic());
        other.into_iter().chain(basic).collect()
    }
}

impl SwiftTransformer {
    fn dictionary_literal(
        &self,
        entries: &serde_json::Map<String, Value>,
        value_type: &ValueType,
    ) -> String {
        if entries.is_empty() {
            return "[:]".to_string();
        }
        let entries: Vec<_> = entries
            .iter()
            .map(|(key, entry)| {
                format!(
                    "{}: {}",
                    escape_string(key, &[]),
                    self.convert_value(entry, value_type)
                )
            })
            .collect();
        format!("[{}]", entries.join(", "))
    }
}
