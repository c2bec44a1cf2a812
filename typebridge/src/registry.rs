//! Named-type registry for deduplicating types across modules.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::RegistryError;
use crate::ir::{Module, ValueType};

/// Where a named type is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "module", rename_all = "camelCase")]
pub enum TypeScope {
    /// Referenced by exactly one module; rendered alongside it.
    Local(String),
    /// Referenced by two or more modules; rendered once in the shared output.
    Shared,
}

/// A custom, enum or union type reachable from at least one module.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedType {
    pub name: String,

    /// The single type bound to this name.
    pub value_type: ValueType,

    /// Names of the modules referencing this type.
    pub modules: BTreeSet<String>,
}

impl NamedType {
    /// Classify by the number of owning modules.
    pub fn scope(&self) -> TypeScope {
        match (self.modules.len(), self.modules.iter().next()) {
            (1, Some(module)) => TypeScope::Local(module.clone()),
            _ => TypeScope::Shared,
        }
    }

    pub fn is_shared(&self) -> bool {
        self.scope() == TypeScope::Shared
    }
}

/// Registry of every named type in one generation run, in first-seen order.
#[derive(Debug, Default, Clone, Serialize)]
pub struct NamedTypeRegistry {
    types: IndexMap<String, NamedType>,
}

impl NamedTypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the named types of every module.
    pub fn build(modules: &[Module]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for module in modules {
            registry.add_module(module)?;
        }
        Ok(registry)
    }

    /// Visit every member, parameter and return type of `module`.
    ///
    /// A name already bound to a structurally different type is a
    /// [`RegistryError::NameCollision`].
    pub fn add_module(&mut self, module: &Module) -> Result<(), RegistryError> {
        for value_type in module.root_types() {
            self.visit(value_type, &module.name)?;
        }
        Ok(())
    }

    fn visit(&mut self, value_type: &ValueType, module: &str) -> Result<(), RegistryError> {
        match value_type {
            ValueType::Custom(custom) => {
                if self.record(&custom.name, value_type, module)? {
                    for member in &custom.members {
                        self.visit(&member.value_type, module)?;
                    }
                }
            }
            ValueType::Enum(enum_type) => {
                self.record(&enum_type.name, value_type, module)?;
            }
            ValueType::Union(union) => {
                if self.record(&union.name, value_type, module)? {
                    for member in &union.members {
                        self.visit(member, module)?;
                    }
                }
            }
            ValueType::Array(element) => self.visit(element, module)?,
            ValueType::Dictionary { value, .. } => self.visit(value, module)?,
            ValueType::Optional(inner) => self.visit(inner, module)?,
            ValueType::Basic(_) | ValueType::Predefined(_) => {}
        }
        Ok(())
    }

    /// Record a sighting. Returns `false` when `module` had already been
    /// recorded for `name`, in which case its members were visited too.
    fn record(
        &mut self,
        name: &str,
        value_type: &ValueType,
        module: &str,
    ) -> Result<bool, RegistryError> {
        match self.types.get_mut(name) {
            Some(named) if named.value_type != *value_type => {
                Err(RegistryError::NameCollision {
                    type_name: name.to_string(),
                    first_module: named.modules.iter().next().cloned().unwrap_or_default(),
                    module: module.to_string(),
                })
            }
            Some(named) => Ok(named.modules.insert(module.to_string())),
            None => {
                self.types.insert(
                    name.to_string(),
                    NamedType {
                        name: name.to_string(),
                        value_type: value_type.clone(),
                        modules: BTreeSet::from([module.to_string()]),
                    },
                );
                Ok(true)
            }
        }
    }

    /// Get a named type by name.
    pub fn get(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }

    /// All named types in first-seen order.
    pub fn types(&self) -> impl Iterator<Item = &NamedType> {
        self.types.values()
    }

    /// Types referenced only by `module`.
    pub fn local_to<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a NamedType> + 'a {
        self.types
            .values()
            .filter(move |named| named.scope() == TypeScope::Local(module.to_string()))
    }

    /// Types referenced by two or more modules.
    pub fn shared(&self) -> impl Iterator<Item = &NamedType> {
        self.types.values().filter(|named| named.is_shared())
    }

    /// Get the number of named types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BasicType, CustomType, EnumMember, EnumSubType, EnumType, EnumValue, Field, Method};
    use std::collections::BTreeMap;

    fn custom(name: &str, members: Vec<Field>) -> ValueType {
        ValueType::Custom(CustomType {
            name: name.to_string(),
            members,
            documentation: String::new(),
            is_any_key_dictionary: false,
        })
    }

    fn color() -> ValueType {
        ValueType::Enum(EnumType {
            name: "Color".into(),
            sub_type: EnumSubType::String,
            members: vec![EnumMember {
                key: "Red".into(),
                value: EnumValue::String("red".into()),
                documentation: String::new(),
            }],
            documentation: String::new(),
        })
    }

    fn module(name: &str, return_type: ValueType) -> Module {
        Module {
            name: name.to_string(),
            methods: vec![Method {
                name: "get".into(),
                parameters: Vec::new(),
                return_type: Some(return_type),
                is_async: false,
                documentation: String::new(),
            }],
            members: Vec::new(),
            documentation: String::new(),
            custom_tags: BTreeMap::new(),
        }
    }

    #[test]
    fn test_local_and_shared_classification() {
        let size = custom(
            "Size",
            vec![
                Field::new("width", ValueType::Basic(BasicType::Number)),
                Field::new("color", color().into_optional()),
            ],
        );
        let only_a = custom("OnlyA", Vec::new());

        let modules = vec![
            module("A", ValueType::array(size.clone())),
            module("B", size),
            Module {
                members: vec![Field::new("extra", only_a)],
                ..module("A2", ValueType::Basic(BasicType::String))
            },
        ];

        let registry = NamedTypeRegistry::build(&modules).unwrap();
        let names: Vec<_> = registry.types().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Size", "Color", "OnlyA"]);

        assert_eq!(registry.get("Size").unwrap().scope(), TypeScope::Shared);
        assert_eq!(registry.get("Color").unwrap().scope(), TypeScope::Shared);
        assert_eq!(
            registry.get("OnlyA").unwrap().scope(),
            TypeScope::Local("A2".into())
        );

        let local: Vec<_> = registry.local_to("A2").map(|t| t.name.as_str()).collect();
        assert_eq!(local, vec!["OnlyA"]);
        assert_eq!(registry.shared().count(), 2);
    }

    #[test]
    fn test_containers_are_not_named_types() {
        let modules = vec![module(
            "A",
            ValueType::Dictionary {
                key: crate::ir::DictionaryKey::String,
                value: Box::new(ValueType::array(ValueType::Basic(BasicType::Int))),
            },
        )];
        assert!(NamedTypeRegistry::build(&modules).unwrap().is_empty());
    }

    #[test]
    fn test_equal_sightings_share_one_entry() {
        let point = custom("Point", vec![Field::new("x", ValueType::Basic(BasicType::Number))]);
        let registry =
            NamedTypeRegistry::build(&[module("A", point.clone()), module("B", point.clone())])
                .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Point").unwrap().value_type, point);
        assert!(registry.get("Point").unwrap().is_shared());
    }

    #[test]
    fn test_name_collision_is_rejected() {
        let first = custom("Point", vec![Field::new("x", ValueType::Basic(BasicType::Number))]);
        let second = custom("Point", Vec::new());

        let err = NamedTypeRegistry::build(&[module("A", first), module("B", second)]).unwrap_err();
        match err {
            RegistryError::NameCollision {
                type_name,
                first_module,
                module,
            } => {
                assert_eq!(type_name, "Point");
                assert_eq!(first_module, "A");
                assert_eq!(module, "B");
            }
        }
    }

    #[test]
    fn test_name_collision_within_one_module() {
        let nested = custom("Inner", vec![Field::new("a", ValueType::Basic(BasicType::String))]);
        let other = custom("Inner", vec![Field::new("b", ValueType::Basic(BasicType::Number))]);
        let outer = custom(
            "Outer",
            vec![Field::new("first", nested), Field::new("second", other)],
        );

        assert!(matches!(
            NamedTypeRegistry::build(&[module("A", outer)]),
            Err(RegistryError::NameCollision { type_name, .. }) if type_name == "Inner"
        ));
    }

    #[test]
    fn test_union_members_are_visited() {
        let union = ValueType::Union(crate::ir::UnionType {
            name: "ValueType".into(),
            members: vec![ValueType::Basic(BasicType::String), color()],
        });
        let registry = NamedTypeRegistry::build(&[module("A", union)]).unwrap();
        let names: Vec<_> = registry.types().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["ValueType", "Color"]);
    }
}
