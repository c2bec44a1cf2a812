//! Rendering view adapter.
//!
//! Turns modules and registry entries into flat, serializable records that
//! templates consume. All language-specific spelling goes through a
//! [`ValueTransformer`]; the views themselves carry only strings, flags and
//! pass-through tags.

pub mod kotlin;
pub mod swift;
pub mod transformer;

use serde::Serialize;
use std::collections::BTreeMap;

pub use kotlin::KotlinTransformer;
pub use swift::SwiftTransformer;
pub use transformer::{RenderLanguage, ValueTransformer};

use crate::ir::{EnumSubType, Field, Method, Module, ValueType};
use crate::registry::{NamedType, NamedTypeRegistry};

/// View of one module, rendered into `<ModuleName>.<ext>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleView {
    pub module_name: String,
    pub documentation_lines: Vec<String>,
    pub members: Vec<MemberView>,
    pub methods: Vec<MethodView>,

    /// Named types referenced only by this module.
    pub associated_types: Vec<NamedTypeView>,

    pub custom_tags: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub documentation_lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_value: Option<String>,
    pub last: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodView {
    pub method_name: String,
    pub parameters: Vec<ParameterView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    pub is_async: bool,
    pub documentation_lines: Vec<String>,
    pub last: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterView {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub last: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumMemberView {
    pub key: String,
    /// Literal of the raw value.
    pub value: String,
    pub documentation_lines: Vec<String>,
    pub last: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionMemberView {
    pub case_name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub last: bool,
}

/// A named type ready for rendering, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NamedTypeView {
    #[serde(rename_all = "camelCase")]
    Custom {
        type_name: String,
        documentation_lines: Vec<String>,
        members: Vec<MemberView>,
        is_any_key_dictionary: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        dictionary_value_type: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Enum {
        type_name: String,
        documentation_lines: Vec<String>,
        sub_type: EnumSubType,
        members: Vec<EnumMemberView>,
    },
    #[serde(rename_all = "camelCase")]
    Union {
        type_name: String,
        members: Vec<UnionMemberView>,
    },
}

impl NamedTypeView {
    pub fn type_name(&self) -> &str {
        match self {
            NamedTypeView::Custom { type_name, .. }
            | NamedTypeView::Enum { type_name, .. }
            | NamedTypeView::Union { type_name, .. } => type_name,
        }
    }
}

/// Every shared named type, rendered once.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedTypesView {
    pub types: Vec<NamedTypeView>,
}

/// Builds views for one target language.
pub struct ViewBuilder<'a> {
    transformer: &'a dyn ValueTransformer,
    registry: &'a NamedTypeRegistry,
}

impl<'a> ViewBuilder<'a> {
    pub fn new(transformer: &'a dyn ValueTransformer, registry: &'a NamedTypeRegistry) -> Self {
        Self {
            transformer,
            registry,
        }
    }

    pub fn module_view(&self, module: &Module) -> ModuleView {
        ModuleView {
            module_name: module.name.clone(),
            documentation_lines: documentation_lines(&module.documentation),
            members: with_last(&module.members, |field, last| self.member_view(field, last)),
            methods: with_last(&module.methods, |method, last| self.method_view(method, last)),
            associated_types: self
                .registry
                .local_to(&module.name)
                .filter_map(|named| self.named_type_view(named))
                .collect(),
            custom_tags: module.custom_tags.clone(),
        }
    }

    pub fn shared_types_view(&self) -> SharedTypesView {
        SharedTypesView {
            types: self
                .registry
                .shared()
                .filter_map(|named| self.named_type_view(named))
                .collect(),
        }
    }

    /// `None` for registry entries that are not custom, enum or union types.
    pub fn named_type_view(&self, named: &NamedType) -> Option<NamedTypeView> {
        let t = self.transformer;
        match &named.value_type {
            ValueType::Custom(custom) => Some(NamedTypeView::Custom {
                type_name: t.convert_type_name(&custom.name),
                documentation_lines: documentation_lines(&custom.documentation),
                members: with_last(&custom.members, |field, last| self.member_view(field, last)),
                is_any_key_dictionary: custom.is_any_key_dictionary,
                dictionary_value_type: custom
                    .dictionary_value_type()
                    .map(|value_type| t.convert_value_type(value_type)),
            }),
            ValueType::Enum(enum_type) => Some(NamedTypeView::Enum {
                type_name: t.convert_type_name(&enum_type.name),
                documentation_lines: documentation_lines(&enum_type.documentation),
                sub_type: enum_type.sub_type,
                members: with_last(&enum_type.members, |member, last| EnumMemberView {
                    key: t.convert_enum_key(&member.key),
                    value: transformer::enum_raw_value(t, &member.value),
                    documentation_lines: documentation_lines(&member.documentation),
                    last,
                }),
            }),
            ValueType::Union(union) => {
                let ordered = t.order_union_members(&union.members);
                let count = ordered.len();
                Some(NamedTypeView::Union {
                    type_name: t.convert_type_name(&union.name),
                    members: ordered
                        .into_iter()
                        .enumerate()
                        .map(|(i, member)| UnionMemberView {
                            case_name: t.union_case_name(member),
                            type_name: t.convert_value_type(member),
                            last: i + 1 == count,
                        })
                        .collect(),
                })
            }
            _ => None,
        }
    }

    fn member_view(&self, field: &Field, last: bool) -> MemberView {
        MemberView {
            name: field.name.clone(),
            type_name: self.transformer.convert_value_type(&field.value_type),
            documentation_lines: documentation_lines(&field.documentation),
            static_value: field
                .static_value
                .as_ref()
                .map(|value| self.transformer.convert_value(value, &field.value_type)),
            last,
        }
    }

    fn method_view(&self, method: &Method, last: bool) -> MethodView {
        MethodView {
            method_name: method.name.clone(),
            parameters: with_last(&method.parameters, |field, last| ParameterView {
                name: field.name.clone(),
                type_name: self.transformer.convert_value_type(&field.value_type),
                default_value: field
                    .static_value
                    .as_ref()
                    .map(|value| self.transformer.convert_value(value, &field.value_type)),
                last,
            }),
            return_type: method
                .return_type
                .as_ref()
                .map(|value_type| self.transformer.convert_value_type(value_type)),
            is_async: method.is_async,
            documentation_lines: documentation_lines(&method.documentation),
            last,
        }
    }
}

fn documentation_lines(documentation: &str) -> Vec<String> {
    if documentation.trim().is_empty() {
        return Vec::new();
    }
    documentation.lines().map(|line| line.to_string()).collect()
}

fn with_last<T, V>(items: &[T], mut f: impl FnMut(&T, bool) -> V) -> Vec<V> {
    let count = items.len();
    items
        .iter()
        .enumerate()
        .map(|(i, item)| f(item, i + 1 == count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ModuleParser, ParseOptions};
    use crate::source::SourceIndex;
    use serde_json::json;

    const SOURCE: &str = r#"
        enum Theme { Light = 'light', Dark = 'dark' }

        interface Size { width: number; height: number; }

        /**
         * First bridge.
         * Second line.
         * @shouldExport true
         */
        interface IFirstApi {
            /** @default "dark" */
            theme: Theme;
            getSize(): Size;
            setTheme({ theme }: { theme: Theme }): void;
        }

        /** @shouldExport true */
        interface ISecondApi {
            size(): Promise<Size>;
            value(): string | number[];
        }
    "#;

    fn modules() -> Vec<Module> {
        let index = SourceIndex::parse_str(SOURCE).unwrap();
        let options = ParseOptions::default();
        ModuleParser::new(&index, &options).parse().unwrap().modules
    }

    #[test]
    fn test_module_view() {
        let modules = modules();
        let registry = NamedTypeRegistry::build(&modules).unwrap();
        let swift = SwiftTransformer::new();
        let builder = ViewBuilder::new(&swift, &registry);

        let view = builder.module_view(&modules[0]);
        assert_eq!(view.module_name, "IFirstApi");
        assert_eq!(view.documentation_lines, vec!["First bridge.", "Second line."]);
        assert_eq!(view.members[0].static_value.as_deref(), Some(".dark"));
        assert!(view.members[0].last);

        assert_eq!(view.methods.len(), 2);
        assert_eq!(view.methods[0].return_type.as_deref(), Some("Size"));
        assert!(!view.methods[0].last);
        assert_eq!(view.methods[1].return_type, None);
        assert_eq!(view.methods[1].parameters[0].type_name, "Theme");
        assert!(view.methods[1].last);

        // Size is shared with the second module; Theme is local.
        let associated: Vec<_> = view
            .associated_types
            .iter()
            .map(NamedTypeView::type_name)
            .collect();
        assert_eq!(associated, vec!["Theme"]);
    }

    #[test]
    fn test_shared_view_and_union() {
        let modules = modules();
        let registry = NamedTypeRegistry::build(&modules).unwrap();
        let kotlin = KotlinTransformer::new();
        let builder = ViewBuilder::new(&kotlin, &registry);

        let shared = builder.shared_types_view();
        let names: Vec<_> = shared.types.iter().map(NamedTypeView::type_name).collect();
        assert_eq!(names, vec!["Size"]);

        let second = builder.module_view(&modules[1]);
        assert!(second.methods[0].is_async);
        let NamedTypeView::Union { type_name, members } = &second.associated_types[0] else {
            panic!("expected union view");
        };
        assert_eq!(type_name, "ISecondApiValueReturnType");
        assert_eq!(members[0].case_name, "NumberArray");
        assert_eq!(members[0].type_name, "List<Double>");
        assert_eq!(members[1].case_name, "String");
        assert!(members[1].last);
    }

    #[test]
    fn test_named_type_view_serialization() {
        let modules = modules();
        let registry = NamedTypeRegistry::build(&modules).unwrap();
        let kotlin = KotlinTransformer::new();
        let builder = ViewBuilder::new(&kotlin, &registry);

        let theme = builder
            .named_type_view(registry.get("Theme").unwrap())
            .unwrap();
        let json = serde_json::to_value(&theme).unwrap();
        assert_eq!(json["kind"], json!("enum"));
        assert_eq!(json["typeName"], json!("Theme"));
        assert_eq!(json["subType"], json!("string"));
        assert_eq!(json["members"][0]["key"], json!("LIGHT"));
        assert_eq!(json["members"][0]["value"], json!("\"light\""));
        assert_eq!(json["members"][1]["last"], json!(true));
    }
}
