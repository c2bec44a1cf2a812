//! Type expression → [`ValueType`] conversion.

use std::collections::BTreeMap;

use super::naming::NameSeed;
use super::ParseOptions;
use crate::error::ExtractError;
use crate::ir::{
    BasicType, CustomType, DictionaryKey, EnumMember, EnumSubType, EnumType, EnumValue, Field,
    UnionType, ValueType,
};
use crate::source::{
    AliasDecl, Declaration, EnumDecl, EnumInitializer, InterfaceDecl, Keyword, Literal,
    MemberDecl, PropertyDecl, SourceLocation, TypeNode, TypeNodeKind, TypeResolver,
};

type Result<T> = std::result::Result<T, ExtractError>;

/// Members of an interface or object literal, after flattening.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Record(Vec<Field>),
    /// A single string-keyed index signature.
    Dictionary(Field),
}

/// Converts type nodes into value types, resolving references through a
/// [`TypeResolver`].
pub struct TypeExtractor<'a, R: ?Sized> {
    resolver: &'a R,
    options: &'a ParseOptions,

    /// Interfaces and aliases currently being expanded.
    visiting: Vec<String>,
}

impl<'a, R: TypeResolver + ?Sized> TypeExtractor<'a, R> {
    pub fn new(resolver: &'a R, options: &'a ParseOptions) -> Self {
        Self {
            resolver,
            options,
            visiting: Vec::new(),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<Declaration<'a>> {
        let resolver: &'a R = self.resolver;
        resolver.declaration(name)
    }

    /// Extract the type at `node`, naming anonymous types from `seed`.
    pub fn extract(&mut self, node: &TypeNode, seed: &NameSeed) -> Result<ValueType> {
        match &node.kind {
            TypeNodeKind::Union(members) => self.union(members, &node.location, seed),

            TypeNodeKind::Keyword(keyword) => keyword_type(*keyword, &node.location),

            TypeNodeKind::Literal(literal) => Ok(ValueType::Basic(match literal {
                Literal::String(_) => BasicType::String,
                Literal::Number(_) => BasicType::Number,
                Literal::Boolean(_) => BasicType::Boolean,
            })),

            TypeNodeKind::Reference { name, arguments } => {
                self.reference(name, arguments, &node.location, seed)
            }

            TypeNodeKind::Object(members) => {
                let name = seed.type_name();
                let shape = self.members_shape(members, &name, seed)?;
                Ok(custom_from_shape(name, shape, String::new()))
            }

            TypeNodeKind::Array(element) => {
                Ok(ValueType::array(self.extract(element, &seed.element())?))
            }

            TypeNodeKind::Unsupported(text) => Err(ExtractError::unsupported(
                &node.location,
                format!("`{}` is not supported", text),
            )),
        }
    }

    fn reference(
        &mut self,
        name: &str,
        arguments: &[TypeNode],
        location: &SourceLocation,
        seed: &NameSeed,
    ) -> Result<ValueType> {
        if name == self.options.integer_type {
            return Ok(ValueType::Basic(BasicType::Int));
        }

        let resolver = self.resolver;
        let declaration = resolver.declaration(name);

        if !arguments.is_empty()
            && matches!(
                declaration,
                Some(Declaration::Interface(_) | Declaration::Alias(_))
            )
        {
            return Err(ExtractError::unsupported(
                location,
                format!("generic type `{}` is not supported", name),
            ));
        }

        match declaration {
            Some(Declaration::Interface(decl)) => return self.interface_type(decl),
            Some(Declaration::Enum(decl)) => return enum_type(decl),
            _ => {}
        }

        if self.options.predefined_types.iter().any(|p| p == name) {
            return Ok(ValueType::Predefined(name.to_string()));
        }

        if let Some(Declaration::Alias(decl)) = declaration {
            return self.alias_type(decl);
        }

        match (name, arguments) {
            ("Array" | "ReadonlyArray", [element]) => {
                Ok(ValueType::array(self.extract(element, &seed.element())?))
            }
            ("Record", [key, value]) => {
                let key = match key.keyword() {
                    Some(Keyword::String) => DictionaryKey::String,
                    Some(Keyword::Number) => DictionaryKey::Number,
                    _ => {
                        return Err(ExtractError::unsupported(
                            &key.location,
                            format!("`{}` is not a supported Record key", key.describe()),
                        ))
                    }
                };
                Ok(ValueType::Dictionary {
                    key,
                    value: Box::new(self.extract(value, &seed.value())?),
                })
            }
            ("Promise", _) => Err(ExtractError::unsupported(
                location,
                "`Promise` is only supported as a method return type",
            )),
            _ => Err(ExtractError::unsupported(
                location,
                format!("unknown type `{}`", name),
            )),
        }
    }

    /// Custom type for a declared interface.
    pub fn interface_type(&mut self, decl: &InterfaceDecl) -> Result<ValueType> {
        let name = interface_type_name(decl).to_string();
        let shape = self.interface_shape(decl)?;
        Ok(custom_from_shape(name, shape, decl.doc.description.clone()))
    }

    /// Flattened members of `decl`: bases first, in clause order, then own
    /// members. A redeclared member replaces the inherited one in place.
    pub fn interface_shape(&mut self, decl: &InterfaceDecl) -> Result<Shape> {
        self.guarded(&decl.name, &decl.location, |this| {
            let name = interface_type_name(decl).to_string();
            let resolver = this.resolver;

            let mut fields: Vec<Field> = Vec::new();
            let mut dictionary: Option<Field> = None;

            for base in &decl.extends {
                if this.options.is_marker_base(base) {
                    continue;
                }

                let base_decl = match resolver.declaration(base) {
                    Some(Declaration::Interface(base_decl)) => base_decl,
                    _ => {
                        return Err(ExtractError::unsupported(
                            &decl.location,
                            format!("`{}` extends unknown interface `{}`", decl.name, base),
                        ))
                    }
                };

                match this.interface_shape(base_decl)? {
                    Shape::Dictionary(value) => {
                        if dictionary.is_some() || !fields.is_empty() {
                            return Err(mixed_dictionary(&name, &decl.location));
                        }
                        dictionary = Some(value);
                    }
                    Shape::Record(base_fields) => {
                        if dictionary.is_some() && !base_fields.is_empty() {
                            return Err(mixed_dictionary(&name, &decl.location));
                        }
                        merge_fields(&mut fields, base_fields);
                    }
                }
            }

            let own = this.members_shape(&decl.members, &name, &NameSeed::named(&name))?;

            match (own, dictionary) {
                (Shape::Dictionary(value), None) if fields.is_empty() => {
                    Ok(Shape::Dictionary(value))
                }
                (Shape::Record(own_fields), Some(value)) if own_fields.is_empty() => {
                    Ok(Shape::Dictionary(value))
                }
                (Shape::Record(own_fields), None) => {
                    merge_fields(&mut fields, own_fields);
                    Ok(Shape::Record(fields))
                }
                _ => Err(mixed_dictionary(&name, &decl.location)),
            }
        })
    }

    /// Members of an interface body or object literal.
    pub fn members_shape(
        &mut self,
        members: &[MemberDecl],
        type_name: &str,
        seed: &NameSeed,
    ) -> Result<Shape> {
        let mut fields: Vec<Field> = Vec::new();
        let mut index: Option<(Field, SourceLocation)> = None;

        for member in members {
            match member {
                MemberDecl::Property(property) => {
                    let field = self
                        .field(property, seed)
                        .map_err(|e| e.in_context(format!("{}.{}", type_name, property.name)))?;
                    merge_fields(&mut fields, vec![field]);
                }
                MemberDecl::Index(signature) => {
                    if index.is_some() {
                        return Err(mixed_dictionary(type_name, &signature.location));
                    }
                    if signature.key_type.keyword() != Some(Keyword::String) {
                        return Err(ExtractError::unsupported(
                            &signature.key_type.location,
                            format!(
                                "index signature key `{}` must be `string`",
                                signature.key_type.describe()
                            ),
                        ));
                    }
                    let value_type = self.extract(&signature.value_type, &seed.value())?;
                    index = Some((
                        Field::new(&signature.key_name, value_type),
                        signature.location.clone(),
                    ));
                }
                MemberDecl::Method(method) => {
                    return Err(ExtractError::unsupported(
                        &method.location,
                        format!(
                            "method `{}` is only supported on exported module interfaces",
                            method.name
                        ),
                    ))
                }
                MemberDecl::Unsupported { text, location } => {
                    return Err(ExtractError::unsupported(
                        location,
                        format!("member `{}` is not supported", text.trim()),
                    ))
                }
            }
        }

        match index {
            Some((field, _)) if fields.is_empty() => Ok(Shape::Dictionary(field)),
            Some((_, location)) => Err(mixed_dictionary(type_name, &location)),
            None => Ok(Shape::Record(fields)),
        }
    }

    /// A property signature as a field. `@overrideTypeName` names an inline
    /// member type; `@default` supplies the static value.
    pub fn field(&mut self, property: &PropertyDecl, seed: &NameSeed) -> Result<Field> {
        let member_seed = match property.doc.tag("overrideTypeName") {
            Some(name) if !name.is_empty() => NameSeed::named(name),
            _ => seed.member(&property.name),
        };

        let node = property.ty.as_ref().ok_or_else(|| {
            ExtractError::unsupported(&property.location, "missing type annotation")
        })?;

        let mut value_type = self.extract(node, &member_seed)?;
        if property.optional {
            value_type = value_type.into_optional();
        }

        let static_value = match property.doc.tag("default") {
            Some(raw) => Some(parse_default(raw, &value_type).map_err(|reason| {
                ExtractError::InvalidDefault {
                    member: property.name.clone(),
                    location: property.location.clone(),
                    reason,
                }
            })?),
            None => None,
        };

        Ok(Field {
            name: property.name.clone(),
            value_type,
            documentation: property.doc.description.clone(),
            static_value,
        })
    }

    /// The aliased type, named after the alias.
    pub fn alias_type(&mut self, decl: &AliasDecl) -> Result<ValueType> {
        self.guarded(&decl.name, &decl.location, |this| {
            this.extract(&decl.value, &NameSeed::named(&decl.name))
        })
    }

    fn union(
        &mut self,
        members: &[TypeNode],
        location: &SourceLocation,
        seed: &NameSeed,
    ) -> Result<ValueType> {
        let mut nullable = members.iter().any(TypeNode::is_nullish);
        let rest: Vec<&TypeNode> = members.iter().filter(|m| !m.is_nullish()).collect();

        if rest.is_empty() {
            return Err(ExtractError::unsupported(
                location,
                "a union of only `null` and `undefined` is not supported",
            ));
        }

        let mut extracted: Vec<ValueType> = Vec::new();
        for (index, member) in rest.iter().enumerate() {
            let member_seed = if rest.len() == 1 {
                seed.clone()
            } else {
                seed.union_member(index)
            };

            let value_type = match self.extract(member, &member_seed)? {
                ValueType::Optional(inner) => {
                    nullable = true;
                    *inner
                }
                other => other,
            };

            match value_type {
                ValueType::Union(nested) => {
                    for nested_member in nested.members {
                        push_unique(&mut extracted, nested_member);
                    }
                }
                other => push_unique(&mut extracted, other),
            }
        }

        let result = if extracted.len() == 1 {
            extracted.remove(0)
        } else {
            let name = seed.type_name();
            check_overlap(&name, &extracted, location)?;
            ValueType::Union(UnionType {
                name,
                members: extracted,
            })
        };

        Ok(if nullable {
            result.into_optional()
        } else {
            result
        })
    }

    fn guarded<T>(
        &mut self,
        name: &str,
        location: &SourceLocation,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.visiting.iter().any(|visiting| visiting == name) {
            return Err(ExtractError::RecursiveType {
                type_name: name.to_string(),
                location: location.clone(),
            });
        }

        self.visiting.push(name.to_string());
        let result = f(self);
        self.visiting.pop();
        result
    }
}

fn keyword_type(keyword: Keyword, location: &SourceLocation) -> Result<ValueType> {
    match keyword {
        Keyword::String => Ok(ValueType::Basic(BasicType::String)),
        Keyword::Number => Ok(ValueType::Basic(BasicType::Number)),
        Keyword::Boolean => Ok(ValueType::Basic(BasicType::Boolean)),
        Keyword::Null | Keyword::Undefined => Err(ExtractError::unsupported(
            location,
            "`null` and `undefined` are only supported inside a union",
        )),
        Keyword::Void => Err(ExtractError::unsupported(
            location,
            "`void` is only supported as a method return type",
        )),
        other => {
            let name = format!("{:?}", other).to_lowercase();
            Err(ExtractError::unsupported(
                location,
                format!("`{}` is not supported", name),
            ))
        }
    }
}

fn enum_type(decl: &EnumDecl) -> Result<ValueType> {
    let mut members = Vec::with_capacity(decl.members.len());
    let mut sub_type: Option<EnumSubType> = None;

    for member in &decl.members {
        let value = match &member.initializer {
            None => EnumValue::String(member.name.clone()),
            Some(EnumInitializer::Literal(Literal::String(s))) => EnumValue::String(s.clone()),
            Some(EnumInitializer::Literal(Literal::Number(n))) => EnumValue::Number(*n),
            Some(EnumInitializer::Literal(Literal::Boolean(b))) => {
                return Err(ExtractError::unsupported(
                    &member.location,
                    format!("enum initializer `{}` is not a string or number", b),
                ))
            }
            Some(EnumInitializer::Expression(text)) => {
                return Err(ExtractError::unsupported(
                    &member.location,
                    format!("enum initializer `{}` is not a literal", text),
                ))
            }
        };

        match sub_type {
            None => sub_type = Some(value.sub_type()),
            Some(kind) if kind != value.sub_type() => {
                return Err(ExtractError::MixedEnumLiterals {
                    enum_name: decl.name.clone(),
                    location: member.location.clone(),
                })
            }
            Some(_) => {}
        }

        members.push(EnumMember {
            key: member.name.clone(),
            value,
            documentation: member.doc.description.clone(),
        });
    }

    Ok(ValueType::Enum(EnumType {
        name: decl.name.clone(),
        sub_type: sub_type.unwrap_or(EnumSubType::String),
        members,
        documentation: decl.doc.description.clone(),
    }))
}

fn interface_type_name(decl: &InterfaceDecl) -> &str {
    match decl.doc.tag("overrideTypeName") {
        Some(name) if !name.is_empty() => name,
        _ => &decl.name,
    }
}

fn custom_from_shape(name: String, shape: Shape, documentation: String) -> ValueType {
    let (members, is_any_key_dictionary) = match shape {
        Shape::Record(fields) => (fields, false),
        Shape::Dictionary(value) => (vec![value], true),
    };
    ValueType::Custom(CustomType {
        name,
        members,
        documentation,
        is_any_key_dictionary,
    })
}

fn merge_fields(fields: &mut Vec<Field>, incoming: Vec<Field>) {
    for field in incoming {
        match fields.iter_mut().find(|existing| existing.name == field.name) {
            Some(existing) => *existing = field,
            None => fields.push(field),
        }
    }
}

fn push_unique(members: &mut Vec<ValueType>, value_type: ValueType) {
    if !members.contains(&value_type) {
        members.push(value_type);
    }
}

fn mixed_dictionary(type_name: &str, location: &SourceLocation) -> ExtractError {
    ExtractError::MixedDictionary {
        type_name: type_name.to_string(),
        location: location.clone(),
    }
}

/// Decode category of a union member. Two members of one category cannot
/// be told apart when decoding.
fn union_category(value_type: &ValueType) -> Option<&'static str> {
    match value_type {
        ValueType::Basic(BasicType::String) => Some("string"),
        ValueType::Enum(e) if e.sub_type == EnumSubType::String => Some("string"),
        ValueType::Basic(BasicType::Number | BasicType::Int) | ValueType::Enum(_) => {
            Some("number")
        }
        ValueType::Basic(BasicType::Boolean) => Some("boolean"),
        ValueType::Array(_) => Some("array"),
        ValueType::Dictionary { .. } => Some("map"),
        ValueType::Custom(custom) if custom.is_any_key_dictionary => Some("map"),
        _ => None,
    }
}

fn check_overlap(name: &str, members: &[ValueType], location: &SourceLocation) -> Result<()> {
    let mut seen: BTreeMap<&'static str, &ValueType> = BTreeMap::new();
    for member in members {
        let Some(category) = union_category(member) else {
            continue;
        };
        if let Some(previous) = seen.insert(category, member) {
            return Err(ExtractError::AmbiguousUnion {
                union_name: name.to_string(),
                location: location.clone(),
                reason: format!(
                    "`{}` and `{}` both decode from a {} value",
                    previous, member, category
                ),
            });
        }
    }
    Ok(())
}

/// Parse a `@default` value and check it against the field type.
fn parse_default(raw: &str, value_type: &ValueType) -> std::result::Result<serde_json::Value, String> {
    let value: serde_json::Value =
        serde_json::from_str(raw.trim()).map_err(|e| format!("not valid JSON: {}", e))?;
    check_default(value_type, &value)?;
    Ok(value)
}

fn check_default(value_type: &ValueType, value: &serde_json::Value) -> std::result::Result<(), String> {
    use serde_json::Value;

    match (value_type, value) {
        (ValueType::Optional(_), Value::Null) => Ok(()),
        (ValueType::Optional(inner), value) => check_default(inner, value),
        (ValueType::Basic(BasicType::String), Value::String(_)) => Ok(()),
        (ValueType::Basic(BasicType::Number), Value::Number(_)) => Ok(()),
        (ValueType::Basic(BasicType::Int), Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(()),
        (ValueType::Basic(BasicType::Boolean), Value::Bool(_)) => Ok(()),
        (ValueType::Enum(enum_type), value) => match enum_type.member_for_json(value) {
            Some(_) => Ok(()),
            None => Err(format!("{} is not a value of enum `{}`", value, enum_type.name)),
        },
        (ValueType::Array(element), Value::Array(items)) => {
            items.iter().try_for_each(|item| check_default(element, item))
        }
        (ValueType::Dictionary { value: inner, .. }, Value::Object(entries)) => entries
            .values()
            .try_for_each(|entry| check_default(inner, entry)),
        (ValueType::Custom(custom), Value::Object(entries)) => {
            if let Some(inner) = custom.dictionary_value_type() {
                return entries
                    .values()
                    .try_for_each(|entry| check_default(inner, entry));
            }
            for (key, entry) in entries {
                let member = custom
                    .members
                    .iter()
                    .find(|member| &member.name == key)
                    .ok_or_else(|| format!("`{}` has no member `{}`", custom.name, key))?;
                check_default(&member.value_type, entry)?;
            }
            match custom
                .members
                .iter()
                .find(|member| !member.value_type.is_optional() && !entries.contains_key(&member.name))
            {
                Some(missing) => Err(format!("missing member `{}`", missing.name)),
                None => Ok(()),
            }
        }
        (ValueType::Union(union), value) => {
            if union
                .members
                .iter()
                .any(|member| check_default(member, value).is_ok())
            {
                Ok(())
            } else {
                Err(format!("{} matches no member of `{}`", value, union.name))
            }
        }
        (ValueType::Predefined(name), _) => Err(format!(
            "default values are not supported for predefined type `{}`",
            name
        )),
        (expected, value) => Err(format!("expected {}, found {}", expected, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceIndex;
    use serde_json::json;

    fn extract_alias(source: &str, alias: &str) -> Result<ValueType> {
        extract_alias_with(source, alias, &ParseOptions::default())
    }

    fn extract_alias_with(source: &str, alias: &str, options: &ParseOptions) -> Result<ValueType> {
        let index = SourceIndex::parse_str(source).unwrap();
        let decl = index.alias(alias).unwrap();
        let mut extractor = TypeExtractor::new(&index, options);
        extractor.alias_type(decl)
    }

    fn custom(value_type: &ValueType) -> &CustomType {
        value_type.as_custom().expect("expected custom type")
    }

    fn member_names(custom: &CustomType) -> Vec<&str> {
        custom.members.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_basic_keywords_and_literals() {
        let ty = extract_alias("type T = { a: string; b: number; c: boolean; d: 'x'; e: 2 };", "T")
            .unwrap();
        let kinds: Vec<_> = custom(&ty)
            .members
            .iter()
            .map(|m| m.value_type.as_basic().unwrap())
            .collect();
        assert_eq!(
            kinds,
            vec![
                BasicType::String,
                BasicType::Number,
                BasicType::Boolean,
                BasicType::String,
                BasicType::Number
            ]
        );
    }

    #[test]
    fn test_integer_marker() {
        let ty = extract_alias("type T = { count: CodeGen_Int };", "T").unwrap();
        assert_eq!(
            custom(&ty).members[0].value_type,
            ValueType::Basic(BasicType::Int)
        );
    }

    #[test]
    fn test_alias_names_its_object() {
        let ty = extract_alias("type Options = { inner: { a: string } };", "Options").unwrap();
        let options = custom(&ty);
        assert_eq!(options.name, "Options");
        assert_eq!(
            options.members[0].value_type.name(),
            Some("OptionsInnerType")
        );
    }

    #[test]
    fn test_extends_flattening_with_override() {
        let source = r#"
            interface Base { width: number; height: number; }
            interface Extra { scale: number; }
            interface Full extends Base, Extra { height: string; }
            type T = Full;
        "#;
        let ty = extract_alias(source, "T").unwrap();
        let full = custom(&ty);
        assert_eq!(full.name, "Full");
        assert_eq!(member_names(full), vec!["width", "height", "scale"]);
        assert_eq!(
            full.members[1].value_type,
            ValueType::Basic(BasicType::String)
        );
    }

    #[test]
    fn test_override_type_name_on_interface() {
        let source = r#"
            /** @overrideTypeName Size */
            interface SizeInterface { width: number; }
            type T = SizeInterface;
        "#;
        assert_eq!(extract_alias(source, "T").unwrap().name(), Some("Size"));
    }

    #[test]
    fn test_index_signature_dictionary() {
        let source = r#"
            interface StringMap { [key: string]: string; }
            interface Derived extends StringMap {}
            type A = StringMap;
            type B = Derived;
        "#;
        let a = extract_alias(source, "A").unwrap();
        assert!(custom(&a).is_any_key_dictionary);
        assert_eq!(
            custom(&a).dictionary_value_type(),
            Some(&ValueType::Basic(BasicType::String))
        );

        let b = extract_alias(source, "B").unwrap();
        assert!(custom(&b).is_any_key_dictionary);
        assert_eq!(custom(&b).name, "Derived");
    }

    #[test]
    fn test_mixed_dictionary_is_rejected() {
        let source = r#"
            interface StringMap { [key: string]: string; }
            interface Mixed extends StringMap { width: number; }
            interface Inline { [key: string]: string; other: number; }
            type A = Mixed;
            type B = Inline;
        "#;
        assert!(matches!(
            extract_alias(source, "A").unwrap_err().root_cause(),
            ExtractError::MixedDictionary { .. }
        ));
        assert!(matches!(
            extract_alias(source, "B").unwrap_err().root_cause(),
            ExtractError::MixedDictionary { .. }
        ));
    }

    #[test]
    fn test_numeric_index_key_is_unsupported() {
        let err = extract_alias("type T = { [key: number]: string };", "T").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedType { .. }));
    }

    #[test]
    fn test_enum_literal_kinds() {
        let source = r#"
            enum Keys { Up, Down }
            enum Numbers { One = 1, Two = 2 }
            enum Mixed { A = 'a', B = 2 }
            type A = Keys;
            type B = Numbers;
            type C = Mixed;
        "#;
        let keys = extract_alias(source, "A").unwrap();
        let keys = keys.as_enum().unwrap();
        assert_eq!(keys.sub_type, EnumSubType::String);
        assert_eq!(keys.members[1].value, EnumValue::String("Down".into()));

        let numbers = extract_alias(source, "B").unwrap();
        assert_eq!(numbers.as_enum().unwrap().sub_type, EnumSubType::Number);

        assert!(matches!(
            extract_alias(source, "C").unwrap_err(),
            ExtractError::MixedEnumLiterals { .. }
        ));
    }

    #[test]
    fn test_literal_union_collapses_to_optional_string() {
        let ty = extract_alias("type T = 'A1' | 'B1' | null;", "T").unwrap();
        assert_eq!(
            ty,
            ValueType::Optional(Box::new(ValueType::Basic(BasicType::String)))
        );
    }

    #[test]
    fn test_nullability_composition() {
        let ty = extract_alias("type T = { a: number[] | null; b: (number | null)[] };", "T")
            .unwrap();
        let members = &custom(&ty).members;
        assert_eq!(
            members[0].value_type,
            ValueType::array(ValueType::Basic(BasicType::Number)).into_optional()
        );
        assert_eq!(
            members[1].value_type,
            ValueType::array(ValueType::Basic(BasicType::Number).into_optional())
        );
    }

    #[test]
    fn test_union_of_distinct_shapes() {
        let source = r#"
            type Value = string | number | { id: string } | undefined;
        "#;
        let ty = extract_alias(source, "Value").unwrap();
        let union = ty.as_optional().and_then(ValueType::as_union).unwrap();
        assert_eq!(union.name, "Value");
        assert_eq!(union.members.len(), 3);
        assert_eq!(union.members[2].name(), Some("ValueMembers2Type"));
    }

    #[test]
    fn test_nested_union_splices() {
        let source = r#"
            type Inner = string | boolean;
            type Outer = Inner | number;
        "#;
        let ty = extract_alias(source, "Outer").unwrap();
        assert_eq!(ty.as_union().unwrap().members.len(), 3);
    }

    #[test]
    fn test_ambiguous_union() {
        let source = r#"
            enum Color { Red = 'red' }
            type T = Color | string;
        "#;
        assert!(matches!(
            extract_alias(source, "T").unwrap_err(),
            ExtractError::AmbiguousUnion { .. }
        ));
        assert!(matches!(
            extract_alias("type T = string[] | number[];", "T").unwrap_err(),
            ExtractError::AmbiguousUnion { .. }
        ));
    }

    #[test]
    fn test_record_and_array_generics() {
        let ty = extract_alias(
            "type T = { a: Record<string, number>; b: Array<string>; c: ReadonlyArray<boolean> };",
            "T",
        )
        .unwrap();
        let members = &custom(&ty).members;
        assert_eq!(
            members[0].value_type.as_dictionary(),
            Some((DictionaryKey::String, &ValueType::Basic(BasicType::Number)))
        );
        assert!(members[1].value_type.is_array());
        assert!(members[2].value_type.is_array());
    }

    #[test]
    fn test_predefined_types() {
        let options = ParseOptions {
            predefined_types: vec!["CGFloat".into()],
            ..ParseOptions::default()
        };
        let ty = extract_alias_with("type T = { scale: CGFloat };", "T", &options).unwrap();
        assert_eq!(
            custom(&ty).members[0].value_type,
            ValueType::Predefined("CGFloat".into())
        );
    }

    #[test]
    fn test_unsupported_types_carry_location() {
        let err = extract_alias("type T = {\n  a: any;\n};", "T").unwrap_err();
        match err.root_cause() {
            ExtractError::UnsupportedType { location, reason } => {
                assert_eq!(location.line, 2);
                assert!(reason.contains("any"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().starts_with("T.a: "));
    }

    #[test]
    fn test_recursive_interface() {
        let source = r#"
            interface Node { children: Node[]; }
            type T = Node;
        "#;
        assert!(matches!(
            extract_alias(source, "T").unwrap_err().root_cause(),
            ExtractError::RecursiveType { .. }
        ));
    }

    #[test]
    fn test_default_values() {
        let source = r#"
            enum Mode { Light = 'light', Dark = 'dark' }
            type T = {
                /** @default "dark" */
                mode: Mode;
                /** @default [1, 2] */
                sizes: number[];
                /** @default null */
                label?: string;
            };
            type Bad = {
                /** @default "sepia" */
                mode: Mode;
            };
        "#;
        let ty = extract_alias(source, "T").unwrap();
        let members = &custom(&ty).members;
        assert_eq!(members[0].static_value, Some(json!("dark")));
        assert_eq!(members[1].static_value, Some(json!([1, 2])));
        assert_eq!(members[2].static_value, Some(json!(null)));

        let err = extract_alias(source, "Bad").unwrap_err();
        assert!(matches!(err.root_cause(), ExtractError::InvalidDefault { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_check_default_rules() {
        let int = ValueType::Basic(BasicType::Int);
        assert!(check_default(&int, &json!(3)).is_ok());
        assert!(check_default(&int, &json!(3.5)).is_err());

        let dict = ValueType::Dictionary {
            key: DictionaryKey::String,
            value: Box::new(ValueType::Basic(BasicType::Boolean)),
        };
        assert!(check_default(&dict, &json!({"a": true})).is_ok());
        assert!(check_default(&dict, &json!({"a": 1})).is_err());
    }
}
