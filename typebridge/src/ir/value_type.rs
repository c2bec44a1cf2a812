//! Value-type algebra.
//!
//! Every field, parameter and return type extracted from the source
//! declarations is normalized into a [`ValueType`]. The set of variants is
//! closed: code that needs to know what kind of type it holds goes through
//! the predicates and accessors defined here.

use serde::Serialize;
use std::fmt;

use super::module::Field;

/// Primitive value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BasicType {
    /// `string`
    String,
    /// `number` (floating point in every target)
    Number,
    /// `boolean`
    Boolean,
    /// The configured integer marker type
    Int,
}

/// A named record type, or an open string-keyed map when
/// `is_any_key_dictionary` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomType {
    pub name: String,

    /// Ordered members. A dictionary-shaped type has exactly one member
    /// carrying the index value type.
    pub members: Vec<Field>,

    pub documentation: String,

    pub is_any_key_dictionary: bool,
}

impl CustomType {
    /// The value type of a dictionary-shaped custom type.
    pub fn dictionary_value_type(&self) -> Option<&ValueType> {
        if self.is_any_key_dictionary {
            self.members.first().map(|member| &member.value_type)
        } else {
            None
        }
    }
}

/// Literal kind shared by every member of an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EnumSubType {
    String,
    Number,
}

/// Literal value of an enum member.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnumValue {
    String(String),
    Number(f64),
}

impl EnumValue {
    /// The literal kind of this value.
    pub fn sub_type(&self) -> EnumSubType {
        match self {
            EnumValue::String(_) => EnumSubType::String,
            EnumValue::Number(_) => EnumSubType::Number,
        }
    }

    /// Compare against a JSON value (used for `@default` lookups).
    pub fn matches_json(&self, value: &serde_json::Value) -> bool {
        match (self, value) {
            (EnumValue::String(s), serde_json::Value::String(other)) => s == other,
            (EnumValue::Number(n), serde_json::Value::Number(other)) => {
                other.as_f64().is_some_and(|other| other == *n)
            }
            _ => false,
        }
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::String(s) => write!(f, "{}", s),
            EnumValue::Number(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumMember {
    pub key: String,
    pub value: EnumValue,
    pub documentation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumType {
    pub name: String,
    pub sub_type: EnumSubType,
    pub members: Vec<EnumMember>,
    pub documentation: String,
}

impl EnumType {
    /// Find the member whose literal value equals `value`.
    pub fn member_for_json(&self, value: &serde_json::Value) -> Option<&EnumMember> {
        self.members
            .iter()
            .find(|member| member.value.matches_json(value))
    }
}

/// Key type of a [`ValueType::Dictionary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DictionaryKey {
    String,
    Number,
}

/// A union of non-overlapping alternatives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionType {
    pub name: String,
    pub members: Vec<ValueType>,
}

/// The closed set of representable field, parameter and return types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ValueType {
    Basic(BasicType),
    Custom(CustomType),
    Enum(EnumType),
    Array(Box<ValueType>),
    Dictionary {
        key: DictionaryKey,
        value: Box<ValueType>,
    },
    Optional(Box<ValueType>),
    Union(UnionType),
    /// A type assumed to exist in every target.
    Predefined(String),
}

impl ValueType {
    /// Wrap in [`ValueType::Optional`] unless already optional.
    pub fn into_optional(self) -> Self {
        if self.is_optional() {
            self
        } else {
            ValueType::Optional(Box::new(self))
        }
    }

    /// Create an array of `element`.
    pub fn array(element: ValueType) -> Self {
        ValueType::Array(Box::new(element))
    }

    /// Strip one level of optionality.
    pub fn unwrap_optional(&self) -> &ValueType {
        match self {
            ValueType::Optional(inner) => inner,
            other => other,
        }
    }

    /// Name of a named type (custom, enum, union or predefined).
    pub fn name(&self) -> Option<&str> {
        match self {
            ValueType::Custom(custom) => Some(&custom.name),
            ValueType::Enum(enum_type) => Some(&enum_type.name),
            ValueType::Union(union) => Some(&union.name),
            ValueType::Predefined(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_basic(&self) -> bool {
        matches!(self, ValueType::Basic(_))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ValueType::Custom(_))
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, ValueType::Enum(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, ValueType::Array(_))
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self, ValueType::Dictionary { .. })
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, ValueType::Optional(_))
    }

    pub fn is_union(&self) -> bool {
        matches!(self, ValueType::Union(_))
    }

    pub fn is_predefined(&self) -> bool {
        matches!(self, ValueType::Predefined(_))
    }

    /// Custom dictionaries and [`ValueType::Dictionary`] both decode from
    /// an arbitrary JSON object.
    pub fn is_map_like(&self) -> bool {
        match self {
            ValueType::Dictionary { .. } => true,
            ValueType::Custom(custom) => custom.is_any_key_dictionary,
            _ => false,
        }
    }

    pub fn as_basic(&self) -> Option<BasicType> {
        match self {
            ValueType::Basic(basic) => Some(*basic),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&CustomType> {
        match self {
            ValueType::Custom(custom) => Some(custom),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            ValueType::Enum(enum_type) => Some(enum_type),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ValueType> {
        match self {
            ValueType::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<(DictionaryKey, &ValueType)> {
        match self {
            ValueType::Dictionary { key, value } => Some((*key, value)),
            _ => None,
        }
    }

    pub fn as_optional(&self) -> Option<&ValueType> {
        match self {
            ValueType::Optional(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionType> {
        match self {
            ValueType::Union(union) => Some(union),
            _ => None,
        }
    }

    pub fn as_predefined(&self) -> Option<&str> {
        match self {
            ValueType::Predefined(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    /// TypeScript-like spelling, used in diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Basic(BasicType::String) => write!(f, "string"),
            ValueType::Basic(BasicType::Number) => write!(f, "number"),
            ValueType::Basic(BasicType::Boolean) => write!(f, "boolean"),
            ValueType::Basic(BasicType::Int) => write!(f, "int"),
            ValueType::Custom(custom) => write!(f, "{}", custom.name),
            ValueType::Enum(enum_type) => write!(f, "{}", enum_type.name),
            ValueType::Array(element) => write!(f, "{}[]", element),
            ValueType::Dictionary { key, value } => {
                let key = match key {
                    DictionaryKey::String => "string",
                    DictionaryKey::Number => "number",
                };
                write!(f, "Record<{}, {}>", key, value)
            }
            ValueType::Optional(inner) => write!(f, "{} | null", inner),
            ValueType::Union(union) => write!(f, "{}", union.name),
            ValueType::Predefined(name) => write!(f, "{}", name),
        }
    }
}
