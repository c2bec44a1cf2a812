//! Rewrite passes applied to a fully extracted module list.

use super::module::{Field, Method, Module};
use super::value_type::ValueType;

/// Drop the conventional `I` interface prefix (`IHtmlApi` → `HtmlApi`)
/// from every module name and every custom and union type name.
///
/// The pass consumes the modules and returns rewritten ones; names that do
/// not carry the prefix are left untouched. `IPoint` and a separate `Point`
/// end up under one name; building a
/// [`NamedTypeRegistry`](crate::registry::NamedTypeRegistry) from the result
/// reports that as a collision.
pub fn strip_interface_prefix(modules: Vec<Module>) -> Vec<Module> {
    modules.into_iter().map(rewrite_module).collect()
}

/// `I` followed by an uppercase letter.
pub fn strip_prefix(name: &str) -> &str {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some('I'), Some(next)) if next.is_ascii_uppercase() => &name[1..],
        _ => name,
    }
}

fn rewrite_module(module: Module) -> Module {
    Module {
        name: strip_prefix(&module.name).to_string(),
        methods: module.methods.into_iter().map(rewrite_method).collect(),
        members: module.members.into_iter().map(rewrite_field).collect(),
        ..module
    }
}

fn rewrite_method(method: Method) -> Method {
    Method {
        parameters: method.parameters.into_iter().map(rewrite_field).collect(),
        return_type: method.return_type.map(rewrite_value_type),
        ..method
    }
}

fn rewrite_field(field: Field) -> Field {
    Field {
        value_type: rewrite_value_type(field.value_type),
        ..field
    }
}

fn rewrite_value_type(value_type: ValueType) -> ValueType {
    match value_type {
        ValueType::Custom(mut custom) => {
            custom.name = strip_prefix(&custom.name).to_string();
            custom.members = custom.members.into_iter().map(rewrite_field).collect();
            ValueType::Custom(custom)
        }
        ValueType::Union(mut union) => {
            union.name = strip_prefix(&union.name).to_string();
            union.members = union.members.into_iter().map(rewrite_value_type).collect();
            ValueType::Union(union)
        }
        ValueType::Array(element) => ValueType::Array(Box::new(rewrite_value_type(*element))),
        ValueType::Dictionary { key, value } => ValueType::Dictionary {
            key,
            value: Box::new(rewrite_value_type(*value)),
        },
        ValueType::Optional(inner) => ValueType::Optional(Box::new(rewrite_value_type(*inner))),
        other @ (ValueType::Basic(_) | ValueType::Enum(_) | ValueType::Predefined(_)) => other,
    }
}
