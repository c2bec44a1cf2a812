//! End-to-end tests for extraction, named-type resolution and views.

use std::collections::BTreeMap;

use typebridge::ir::rewrite::strip_interface_prefix;
use typebridge::ir::{BasicType, EnumSubType, EnumValue};
use typebridge::{
    ExtractError, Module, ModuleParser, NamedTypeRegistry, NamedTypeView, ParseOptions,
    ParseOutput, RegistryError, RenderLanguage, SourceIndex, TemplateRenderer, TypeScope,
    ValueType, ViewBuilder,
};

const SIZES: &str = r#"
    interface BaseSize { width: number; height: number; }
    interface CustomSize { scale: number; }
    interface FullSize extends BaseSize, CustomSize {}
"#;

const HTML_API: &str = r#"
    /** @shouldExport true */
    interface IHtmlApi {
        getSize(): FullSize;
        getMode(): 'A1' | 'B1' | null;
        configure({ options }: { options: { dense: boolean; tags: string[] | null } }): void;
    }
"#;

const OTHER_API: &str = r#"
    /** @shouldExport true */
    interface IOtherApi {
        size(): Promise<FullSize>;
        lookup(): Record<string, { id: string }>;
    }
"#;

fn parse(sources: &[(&str, &str)]) -> ParseOutput {
    parse_with(sources, &ParseOptions::default()).unwrap()
}

fn parse_with(
    sources: &[(&str, &str)],
    options: &ParseOptions,
) -> Result<ParseOutput, ExtractError> {
    let index = SourceIndex::from_sources(sources.iter().copied()).unwrap();
    ModuleParser::new(&index, options).parse()
}

fn method_return<'a>(modules: &'a [Module], module: &str, method: &str) -> &'a ValueType {
    modules
        .iter()
        .find(|m| m.name == module)
        .and_then(|m| m.methods.iter().find(|x| x.name == method))
        .and_then(|m| m.return_type.as_ref())
        .expect("method with return type")
}

/// Every (name, type) pair reachable from the modules.
fn collect_named(modules: &[Module]) -> Vec<(String, ValueType)> {
    fn visit(value_type: &ValueType, out: &mut Vec<(String, ValueType)>) {
        match value_type {
            ValueType::Custom(custom) => {
                out.push((custom.name.clone(), value_type.clone()));
                for member in &custom.members {
                    visit(&member.value_type, out);
                }
            }
            ValueType::Enum(e) => out.push((e.name.clone(), value_type.clone())),
            ValueType::Union(union) => {
                out.push((union.name.clone(), value_type.clone()));
                for member in &union.members {
                    visit(member, out);
                }
            }
            ValueType::Array(inner) | ValueType::Optional(inner) => visit(inner, out),
            ValueType::Dictionary { value, .. } => visit(value, out),
            ValueType::Basic(_) | ValueType::Predefined(_) => {}
        }
    }

    let mut out = Vec::new();
    for module in modules {
        for root in module.root_types() {
            visit(root, &mut out);
        }
    }
    out
}

#[test]
fn test_round_trip_scenario() {
    let output = parse(&[("sizes.ts", SIZES), ("html.ts", HTML_API)]);
    let full = method_return(&output.modules, "IHtmlApi", "getSize")
        .as_custom()
        .unwrap();

    assert_eq!(full.name, "FullSize");
    let members: Vec<_> = full.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(members, vec!["width", "height", "scale"]);
    assert!(full
        .members
        .iter()
        .all(|m| m.value_type == ValueType::Basic(BasicType::Number)));

    let registry = NamedTypeRegistry::build(&output.modules).unwrap();
    assert_eq!(
        registry.get("FullSize").unwrap().scope(),
        TypeScope::Local("IHtmlApi".into())
    );

    let output = parse(&[("sizes.ts", SIZES), ("html.ts", HTML_API), ("other.ts", OTHER_API)]);
    let registry = NamedTypeRegistry::build(&output.modules).unwrap();
    assert_eq!(registry.get("FullSize").unwrap().scope(), TypeScope::Shared);
}

#[test]
fn test_union_scenario() {
    let output = parse(&[("sizes.ts", SIZES), ("html.ts", HTML_API)]);
    assert_eq!(
        method_return(&output.modules, "IHtmlApi", "getMode"),
        &ValueType::Basic(BasicType::String).into_optional()
    );
}

#[test]
fn test_determinism() {
    let sources = [("sizes.ts", SIZES), ("html.ts", HTML_API), ("other.ts", OTHER_API)];
    let first = parse(&sources);
    let second = parse(&sources);
    assert_eq!(first.modules, second.modules);

    let scopes = |output: &ParseOutput| -> Vec<(String, TypeScope)> {
        NamedTypeRegistry::build(&output.modules)
            .unwrap()
            .types()
            .map(|t| (t.name.clone(), t.scope()))
            .collect()
    };
    assert_eq!(scopes(&first), scopes(&second));
}

#[test]
fn test_name_uniqueness() {
    let source = r#"
        /** @shouldExport true */
        interface IApi {
            a(): { inner: { x: string } };
            b(): { inner: { x: number } };
            c(): { list: { y: boolean }[] };
            d(): string | { z: string } | { z: number };
        }
    "#;
    let output = parse(&[("api.ts", source)]);
    let named = collect_named(&output.modules);

    let mut by_name: BTreeMap<&str, &ValueType> = BTreeMap::new();
    for (name, value_type) in &named {
        if let Some(previous) = by_name.insert(name, value_type) {
            assert_eq!(previous, value_type, "two different types named {}", name);
        }
    }
    assert!(by_name.contains_key("IApiAReturnInnerType"));
    assert!(by_name.contains_key("IApiBReturnInnerType"));
    assert!(by_name.contains_key("IApiCReturnListElementType"));
    assert!(by_name.contains_key("IApiDReturnMembers1Type"));
    assert!(by_name.contains_key("IApiDReturnMembers2Type"));
}

#[test]
fn test_joined_path_collision_is_an_error() {
    // `items` element and `itemsElement` both name `IApiItemsElementType`.
    let source = r#"
        /** @shouldExport true */
        interface IApi {
            items: { b: number }[];
            itemsElement: { a: string };
        }
    "#;
    let err = parse_with(&[("api.ts", source)], &ParseOptions::default()).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        ExtractError::Registry(RegistryError::NameCollision { type_name, .. })
            if type_name == "IApiItemsElementType"
    ));

    // Same shape under both names is one type, not a collision.
    let same = source.replace("a: string", "b: number");
    let output = parse(&[("api.ts", same.as_str())]);
    let registry = NamedTypeRegistry::build(&output.modules).unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_dedup_across_modules() {
    let output = parse(&[("sizes.ts", SIZES), ("html.ts", HTML_API), ("other.ts", OTHER_API)]);
    let registry = NamedTypeRegistry::build(&output.modules).unwrap();
    let transformer = RenderLanguage::Swift.transformer(BTreeMap::new());
    let builder = ViewBuilder::new(transformer.as_ref(), &registry);

    let shared: Vec<String> = builder
        .shared_types_view()
        .types
        .iter()
        .map(|t| t.type_name().to_string())
        .collect();
    assert_eq!(shared, vec!["FullSize"]);

    let mut emitted = shared.clone();
    for module in &output.modules {
        for associated in builder.module_view(module).associated_types {
            emitted.push(associated.type_name().to_string());
        }
    }

    // Every named type is emitted exactly once.
    let mut unique = emitted.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), emitted.len());
    assert_eq!(emitted.len(), registry.len());
}

#[test]
fn test_nullability_composition() {
    let output = parse(&[("sizes.ts", SIZES), ("html.ts", HTML_API)]);
    let configure = &output.modules[0].methods[2];
    let options = configure.parameters[0].value_type.as_custom().unwrap();
    assert_eq!(options.name, "IHtmlApiConfigureOptionsType");
    assert_eq!(
        options.members[1].value_type,
        ValueType::array(ValueType::Basic(BasicType::String)).into_optional()
    );
}

#[test]
fn test_enum_literal_kinds() {
    let source = r#"
        enum Direction { Up, Down }
        enum Level { Low = 1, High = 10 }
        /** @shouldExport true */
        interface IApi {
            direction(): Direction;
            level(): Level;
        }
    "#;
    let output = parse(&[("api.ts", source)]);

    let direction = method_return(&output.modules, "IApi", "direction")
        .as_enum()
        .unwrap();
    assert_eq!(direction.sub_type, EnumSubType::String);
    assert_eq!(direction.members[0].value, EnumValue::String("Up".into()));

    let level = method_return(&output.modules, "IApi", "level").as_enum().unwrap();
    assert_eq!(level.sub_type, EnumSubType::Number);
    assert_eq!(level.members[1].value, EnumValue::Number(10.0));

    let mixed = r#"
        enum Mixed { A = 'a', B = 1 }
        /** @shouldExport true */
        interface IApi { mixed(): Mixed; }
    "#;
    let err = parse_with(&[("api.ts", mixed)], &ParseOptions::default()).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        ExtractError::MixedEnumLiterals { .. }
    ));
}

#[test]
fn test_index_signatures() {
    let source = r#"
        interface Headers { [name: string]: string; }
        /** @shouldExport true */
        interface IApi { headers(): Headers; }
    "#;
    let output = parse(&[("api.ts", source)]);
    let registry = NamedTypeRegistry::build(&output.modules).unwrap();
    let transformer = RenderLanguage::Kotlin.transformer(BTreeMap::new());
    let builder = ViewBuilder::new(transformer.as_ref(), &registry);

    let view = builder.module_view(&output.modules[0]);
    match &view.associated_types[0] {
        NamedTypeView::Custom {
            type_name,
            is_any_key_dictionary,
            dictionary_value_type,
            ..
        } => {
            assert_eq!(type_name, "Headers");
            assert!(is_any_key_dictionary);
            assert_eq!(dictionary_value_type.as_deref(), Some("String"));
        }
        other => panic!("expected custom view, got {:?}", other),
    }
}

#[test]
fn test_skip_flag() {
    let source = r#"
        /** @shouldExport true */
        interface IApi {
            ok(): boolean;
            broken(): unknown;
        }
    "#;

    let err = parse_with(&[("api.ts", source)], &ParseOptions::default()).unwrap_err();
    assert!(err.is_recoverable());

    let options = ParseOptions {
        skip_invalid_methods: true,
        ..ParseOptions::default()
    };
    let output = parse_with(&[("api.ts", source)], &options).unwrap();
    assert_eq!(output.modules[0].methods.len(), 1);
    assert_eq!(output.skipped.len(), 1);
    assert_eq!(output.skipped[0].method, "broken");
}

#[test]
fn test_prefix_strip() {
    let output = parse(&[("sizes.ts", SIZES), ("html.ts", HTML_API)]);
    let modules = strip_interface_prefix(output.modules);
    assert_eq!(modules[0].name, "HtmlApi");

    let registry = NamedTypeRegistry::build(&modules).unwrap();
    assert!(registry.get("HtmlApiConfigureOptionsType").is_some());
    assert!(registry.get("FullSize").is_some());
}

#[test]
fn test_prefix_strip_collision_is_reported() {
    let source = r#"
        interface IPoint { x: number; }
        interface Point { label: string; }

        /** @shouldExport true */
        interface IApi {
            first(): IPoint;
            second(): Point;
        }
    "#;
    let output = parse(&[("api.ts", source)]);
    assert!(NamedTypeRegistry::build(&output.modules).is_ok());

    let modules = strip_interface_prefix(output.modules);
    match NamedTypeRegistry::build(&modules) {
        Err(RegistryError::NameCollision { type_name, module, .. }) => {
            assert_eq!(type_name, "Point");
            assert_eq!(module, "Api");
        }
        other => panic!("expected name collision, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_rendered_swift_signature() {
    let dir = tempfile::TempDir::new().unwrap();
    let template = dir.path().join("bridge.tera");
    std::fs::write(
        &template,
        "{% for m in methods %}func {{ m.methodName }}({% for p in m.parameters %}{{ p.name }}: {{ p.type }}{% if not p.last %}, {% endif %}{% endfor %}){% if m.isAsync %} async{% endif %}{% if m.returnType %} -> {{ m.returnType }}{% endif %}{% if not m.last %}; {% endif %}{% endfor %}",
    )
    .unwrap();

    let output = parse(&[("sizes.ts", SIZES), ("other.ts", OTHER_API)]);
    let registry = NamedTypeRegistry::build(&output.modules).unwrap();
    let transformer = RenderLanguage::Swift.transformer(BTreeMap::new());
    let builder = ViewBuilder::new(transformer.as_ref(), &registry);

    let renderer = TemplateRenderer::from_path(&template).unwrap();
    let rendered = renderer
        .render(&builder.module_view(&output.modules[0]))
        .unwrap();

    insta::assert_snapshot!(rendered, @"func size() async -> FullSize; func lookup() -> [String: IOtherApiLookupReturnValueType]");
}
