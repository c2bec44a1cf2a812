//! Value transformer trait definition.
//!
//! This module defines the `ValueTransformer` trait that every target
//! language implements, and the closed set of [`RenderLanguage`]s. A
//! transformer knows how a target spells types, enum keys and literal
//! values; the view builder itself is language-agnostic.

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::kotlin::KotlinTransformer;
use super::swift::SwiftTransformer;
use crate::ir::{BasicType, EnumValue, UnionType, ValueType};

/// Trait for per-language type and literal spelling.
///
/// Adding a target language means adding one implementation of this trait
/// and one [`RenderLanguage`] variant.
pub trait ValueTransformer {
    /// Spelling of `value_type` in the target language.
    fn convert_value_type(&self, value_type: &ValueType) -> String;

    /// Apply the per-language remap table to a named type.
    fn convert_type_name(&self, name: &str) -> String;

    /// Casing convention for enum keys.
    fn convert_enum_key(&self, key: &str) -> String;

    /// Literal expression for a JSON value of type `value_type`.
    fn convert_value(&self, value: &serde_json::Value, value_type: &ValueType) -> String;

    /// Order in which union cases are declared and tried when decoding.
    fn order_union_members<'v>(&self, members: &'v [ValueType]) -> Vec<&'v ValueType>;

    /// Name of the union case wrapping `member`.
    fn union_case_name(&self, member: &ValueType) -> String {
        case_name(self, member)
    }
}

/// lowerCamel case name derived from the member's type.
pub(crate) fn case_name<T>(transformer: &T, member: &ValueType) -> String
where
    T: ValueTransformer + ?Sized,
{
    match member {
        ValueType::Basic(BasicType::String) => "string".to_string(),
        ValueType::Basic(BasicType::Number) => "number".to_string(),
        ValueType::Basic(BasicType::Boolean) => "boolean".to_string(),
        ValueType::Basic(BasicType::Int) => "int".to_string(),
        ValueType::Array(element) => format!("{}Array", transformer.union_case_name(element)),
        ValueType::Dictionary { value, .. } => {
            format!("{}Dictionary", transformer.union_case_name(value))
        }
        ValueType::Optional(inner) => transformer.union_case_name(inner),
        ValueType::Custom(_)
        | ValueType::Enum(_)
        | ValueType::Union(_)
        | ValueType::Predefined(_) => {
            let name = member.name().unwrap_or_default();
            transformer.convert_type_name(name).to_case(Case::Camel)
        }
    }
}

/// Supported target languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderLanguage {
    Swift,
    Kotlin,
}

impl RenderLanguage {
    pub const ALL: [RenderLanguage; 2] = [RenderLanguage::Swift, RenderLanguage::Kotlin];

    /// Lowercase identifier used in configuration.
    pub fn id(self) -> &'static str {
        match self {
            RenderLanguage::Swift => "swift",
            RenderLanguage::Kotlin => "kotlin",
        }
    }

    /// Extension of generated files.
    pub fn file_extension(self) -> &'static str {
        match self {
            RenderLanguage::Swift => "swift",
            RenderLanguage::Kotlin => "kt",
        }
    }

    /// The transformer for this language with a type-name remap table.
    pub fn transformer(
        self,
        type_name_map: BTreeMap<String, String>,
    ) -> Box<dyn ValueTransformer> {
        match self {
            RenderLanguage::Swift => Box::new(SwiftTransformer::with_type_name_map(type_name_map)),
            RenderLanguage::Kotlin => {
                Box::new(KotlinTransformer::with_type_name_map(type_name_map))
            }
        }
    }
}

impl fmt::Display for RenderLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for RenderLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "swift" => Ok(RenderLanguage::Swift),
            "kotlin" => Ok(RenderLanguage::Kotlin),
            other => Err(format!("unknown render language '{}'", other)),
        }
    }
}

/// The union member a JSON value decodes into, by JSON kind.
pub(crate) fn union_member_for<'v>(
    union: &'v UnionType,
    value: &serde_json::Value,
) -> Option<&'v ValueType> {
    use serde_json::Value;

    union.members.iter().find(|member| {
        match (member.unwrap_optional(), value) {
            (ValueType::Basic(BasicType::String), Value::String(_)) => true,
            (ValueType::Basic(BasicType::Number), Value::Number(_)) => true,
            (ValueType::Basic(BasicType::Int), Value::Number(n)) => n.is_i64() || n.is_u64(),
            (ValueType::Basic(BasicType::Boolean), Value::Bool(_)) => true,
            (ValueType::Enum(enum_type), value) => enum_type.member_for_json(value).is_some(),
            (ValueType::Array(_), Value::Array(_)) => true,
            (ValueType::Dictionary { .. } | ValueType::Custom(_), Value::Object(_)) => true,
            (ValueType::Predefined(_), _) => true,
            _ => false,
        }
    })
}

/// Escape a string for a double-quoted literal.
pub(crate) fn escape_string(s: &str, extra: &[char]) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if extra.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Literal of an enum member's raw value.
pub(crate) fn enum_raw_value(transformer: &dyn ValueTransformer, value: &EnumValue) -> String {
    match value {
        EnumValue::String(s) => transformer.convert_value(
            &serde_json::Value::String(s.clone()),
            &ValueType::Basic(BasicType::String),
        ),
        EnumValue::Number(n) => transformer.convert_value(
            &serde_json::json!(n),
            &ValueType::Basic(BasicType::Number),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_ids() {
        assert_eq!(RenderLanguage::Swift.file_extension(), "swift");
        assert_eq!(RenderLanguage::Kotlin.file_extension(), "kt");
        assert_eq!("Kotlin".parse::<RenderLanguage>(), Ok(RenderLanguage::Kotlin));
        assert!("java".parse::<RenderLanguage>().is_err());
        assert_eq!(RenderLanguage::Swift.to_string(), "swift");
    }

    #[test]
    fn test_union_case_names() {
        let transformer = RenderLanguage::Swift.transformer(BTreeMap::new());
        assert_eq!(
            transformer.union_case_name(&ValueType::array(ValueType::Basic(BasicType::Number))),
            "numberArray"
        );
        assert_eq!(
            transformer.union_case_name(&ValueType::Predefined("Point".into())),
            "point"
        );
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("a\"b\n", &[]), "\"a\\\"b\\n\"");
        assert_eq!(escape_string("$x", &['$']), "\"\\$x\"");
    }
}
