//! Kotlin type and literal spelling.
//!
//! # Type Mappings
//!
//! | Value type | Kotlin |
//! |------------|--------|
//! | `string` | `String` |
//! | `number` | `Double` |
//! | `boolean` | `Boolean` |
//! | integer marker | `Long` |
//! | `T[]` | `List<T>` |
//! | `Record<string, T>` | `Map<String, T>` |
//! | `T \| null` | `T?` |
//! | named types | type name, remapped |

use convert_case::{Case, Casing};
use serde_json::Value;
use std::collections::BTreeMap;

use super::transformer::{case_name, escape_string, union_member_for, ValueTransformer};
use crate::ir::{BasicType, DictionaryKey, ValueType};

/// Kotlin value transformer.
#[derive(Debug, Clone, Default)]
pub struct KotlinTransformer {
    /// Named type remaps (source name -> Kotlin name)
    type_name_map: BTreeMap<String, String>,
}

impl KotlinTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type_name_map(type_name_map: BTreeMap<String, String>) -> Self {
        Self { type_name_map }
    }

    fn string_literal(s: &str) -> String {
        escape_string(s, &['$'])
    }

    /// Doubles always carry a fractional part.
    fn double_literal(n: &serde_json::Number) -> String {
        match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.is_finite() => format!("{:.1}", f),
            Some(f) => format!("{}", f),
            None => n.to_string(),
        }
    }

    /// Union cases are ranked: objects, maps, arrays, enums, basics.
    fn union_rank(member: &ValueType) -> u8 {
        match member.unwrap_optional() {
            value_type if value_type.is_map_like() => 1,
            ValueType::Array(_) => 2,
            ValueType::Enum(_) => 3,
            ValueType::Basic(_) => 4,
            _ => 0,
        }
    }

    fn map_literal(&self, entries: &serde_json::Map<String, Value>, value_type: &ValueType) -> String {
        let entries: Vec<_> = entries
            .iter()
            .map(|(key, entry)| {
                format!(
                    "{} to {}",
                    Self::string_literal(key),
                    self.convert_value(entry, value_type)
                )
            })
            .collect();
        format!("mapOf({})", entries.join(", "))
    }
}

impl ValueTransformer for KotlinTransformer {
    fn convert_value_type(&self, value_type: &ValueType) -> String {
        match value_type {
            ValueType::Basic(BasicType::String) => "String".to_string(),
            ValueType::Basic(BasicType::Number) => "Double".to_string(),
            ValueType::Basic(BasicType::Boolean) => "Boolean".to_string(),
            ValueType::Basic(BasicType::Int) => "Long".to_string(),
            ValueType::Array(element) => format!("List<{}>", self.convert_value_type(element)),
            ValueType::Dictionary { key, value } => {
                let key = match key {
                    DictionaryKey::String => "String",
                    DictionaryKey::Number => "Double",
                };
                format!("Map<{}, {}>", key, self.convert_value_type(value))
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
        key.to_case(Case::UpperSnake)
    }

    fn convert_value(&self, value: &Value, value_type: &ValueType) -> String {
        match (value_type, value) {
            (ValueType::Optional(_), Value::Null) => "null".to_string(),
            (ValueType::Optional(inner), value) => self.convert_value(value, inner),

            (ValueType::Enum(enum_type), value) => match enum_type.member_for_json(value) {
                Some(member) => format!(
                    "{}.{}",
                    self.convert_type_name(&enum_type.name),
                    self.convert_enum_key(&member.key)
                ),
                None => value.to_string(),
            },

            (ValueType::Array(element), Value::Array(items)) => {
                let items: Vec<_> = items
                    .iter()
                    .map(|item| self.convert_value(item, element))
                    .collect();
                format!("listOf({})", items.join(", "))
            }

            (ValueType::Dictionary { value: inner, .. }, Value::Object(entries)) => {
                self.map_literal(entries, inner)
            }

            (ValueType::Custom(custom), Value::Object(entries)) => {
                if let Some(inner) = custom.dictionary_value_type() {
                    return self.map_literal(entries, inner);
                }
                let arguments: Vec<_> = custom
                    .members
                    .iter()
                    .filter_map(|member| {
                        let entry = entries.get(&member.name)?;
                        Some(format!(
                            "{} = {}",
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
                    "{}.{}({})",
                    self.convert_type_name(&union.name),
                    self.union_case_name(member),
                    self.convert_value(value, member)
                ),
                None => value.to_string(),
            },

            (ValueType::Basic(BasicType::Number), Value::Number(n)) => Self::double_literal(n),
            (ValueType::Basic(BasicType::Int), Value::Number(n)) => format!("{}L", n),
            (_, Value::String(s)) => Self::string_literal(s),
            (_, Value::Null) => "null".to_string(),
            (_, value) => value.to_string(),
        }
    }

    fn order_union_members<'v>(&self, members: &'v [ValueType]) -> Vec<&'v ValueType> {
        let mut ordered: Vec<&ValueType> = members.iter().collect();
        ordered.sort_by_key(|member| Self::union_rank(member));
        ordered
    }

    /// Cases are nested classes, so PascalCase.
    fn union_case_name(&self, member: &ValueType) -> String {
        case_name(self, member).to_case(Case::Pascal)
    }
}
