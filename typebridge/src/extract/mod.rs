//! Type extraction engine.
//!
//! [`ModuleParser`] finds the interfaces that are generation roots and turns
//! each into a [`Module`]. Field, parameter and return types go through
//! [`TypeExtractor`], which normalizes them into the value-type algebra and
//! names anonymous types with a [`NameSeed`].

pub mod naming;
pub mod value;

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub use naming::NameSeed;
pub use value::{Shape, TypeExtractor};

use crate::error::ExtractError;
use crate::ir::{Field, Method, Module};
use crate::registry::NamedTypeRegistry;
use crate::source::{
    Declaration, InterfaceDecl, Keyword, MemberDecl, MethodDecl, TypeNode, TypeNodeKind,
    TypeResolver,
};

/// Integer marker type used when none is configured.
pub const DEFAULT_INTEGER_TYPE: &str = "CodeGen_Int";

/// JSDoc tags interpreted by the parser. Every other tag on a module
/// interface is passed to templates as a custom tag.
const RECOGNIZED_TAGS: &[&str] = &[
    "shouldExport",
    "overrideModuleName",
    "overrideTypeName",
    "default",
];

/// Options for one parse target.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// When non-empty, only interfaces extending one of these are modules.
    pub exported_interface_bases: Vec<String>,

    /// Type names assumed to exist in every target language.
    pub predefined_types: Vec<String>,

    /// Name of the integer marker type.
    pub integer_type: String,

    /// Drop methods with recoverable errors instead of failing.
    pub skip_invalid_methods: bool,

    /// Tags merged into every module that does not define them.
    pub default_custom_tags: BTreeMap<String, serde_json::Value>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            exported_interface_bases: Vec::new(),
            predefined_types: Vec::new(),
            integer_type: DEFAULT_INTEGER_TYPE.to_string(),
            skip_invalid_methods: false,
            default_custom_tags: BTreeMap::new(),
        }
    }
}

impl ParseOptions {
    /// Marker bases select modules and contribute no members.
    pub fn is_marker_base(&self, name: &str) -> bool {
        self.exported_interface_bases.iter().any(|base| base == name)
    }
}

/// A method dropped because of a recoverable error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedMethod {
    pub module: String,
    pub method: String,
    pub reason: String,
}

/// Result of parsing one target.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOutput {
    pub modules: Vec<Module>,
    pub skipped: Vec<SkippedMethod>,
}

/// Discovers generation roots and extracts a [`Module`] from each.
pub struct ModuleParser<'a, R: ?Sized> {
    resolver: &'a R,
    options: &'a ParseOptions,
}

impl<'a, R: TypeResolver + ?Sized> ModuleParser<'a, R> {
    pub fn new(resolver: &'a R, options: &'a ParseOptions) -> Self {
        Self { resolver, options }
    }

    pub fn parse(&self) -> Result<ParseOutput, ExtractError> {
        let mut output = ParseOutput::default();
        let resolver: &'a R = self.resolver;

        for decl in resolver.interfaces() {
            if !self.is_module_root(decl) {
                continue;
            }
            let module = self.module(decl, &mut output.skipped)?;
            debug!(
                module = %module.name,
                methods = module.methods.len(),
                members = module.members.len(),
                "Extracted module."
            );
            output.modules.push(module);
        }

        // Synthetic names join path segments, so distinct positions can
        // still meet (`items[]` and `itemsElement`).
        NamedTypeRegistry::build(&output.modules)?;

        Ok(output)
    }

    fn is_module_root(&self, decl: &InterfaceDecl) -> bool {
        if self.options.exported_interface_bases.is_empty() {
            decl.doc
                .tag("shouldExport")
                .is_some_and(|value| value.trim() == "true")
        } else {
            decl.extends
                .iter()
                .any(|base| self.options.is_marker_base(base))
        }
    }

    fn module(
        &self,
        decl: &'a InterfaceDecl,
        skipped: &mut Vec<SkippedMethod>,
    ) -> Result<Module, ExtractError> {
        let name = match decl.doc.tag("overrideModuleName") {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => decl.name.clone(),
        };

        let mut extractor = TypeExtractor::new(self.resolver, self.options);
        let seed = NameSeed::new(&name);

        let mut members: Vec<Field> = Vec::new();
        let mut methods: Vec<Method> = Vec::new();

        for member in self.surface(decl)? {
            match member {
                MemberDecl::Property(property) => {
                    let field = extractor
                        .field(property, &seed)
                        .map_err(|e| e.in_context(format!("{}.{}", name, property.name)))?;
                    members.push(field);
                }
                MemberDecl::Method(method_decl) => {
                    match method(&mut extractor, &name, method_decl) {
                        Ok(method) => methods.push(method),
                        Err(e) => {
                            let e = e.in_context(format!("{}.{}", name, method_decl.name));
                            if !(self.options.skip_invalid_methods && e.is_recoverable()) {
                                return Err(e);
                            }
                            warn!(
                                module = %name,
                                method = %method_decl.name,
                                "Skipping method: {}",
                                e
                            );
                            skipped.push(SkippedMethod {
                                module: name.clone(),
                                method: method_decl.name.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                }
                MemberDecl::Index(signature) => {
                    return Err(ExtractError::unsupported(
                        &signature.location,
                        "index signatures are not supported on module interfaces",
                    )
                    .in_context(&name))
                }
                MemberDecl::Unsupported { text, location } => {
                    return Err(ExtractError::unsupported(
                        location,
                        format!("member `{}` is not supported", text.trim()),
                    )
                    .in_context(&name))
                }
            }
        }

        let mut module = Module {
            name,
            methods,
            members,
            documentation: decl.doc.description.clone(),
            custom_tags: custom_tags(decl),
        };
        module.merge_default_tags(&self.options.default_custom_tags);
        Ok(module)
    }

    /// Members of a module interface including those of non-marker bases.
    /// A redeclared member replaces the inherited one in place.
    fn surface(&self, decl: &'a InterfaceDecl) -> Result<Vec<&'a MemberDecl>, ExtractError> {
        let mut visiting = Vec::new();
        self.collect_surface(decl, &mut visiting)
    }

    fn collect_surface(
        &self,
        decl: &'a InterfaceDecl,
        visiting: &mut Vec<&'a str>,
    ) -> Result<Vec<&'a MemberDecl>, ExtractError> {
        if visiting.contains(&decl.name.as_str()) {
            return Err(ExtractError::RecursiveType {
                type_name: decl.name.clone(),
                location: decl.location.clone(),
            });
        }
        visiting.push(&decl.name);

        let resolver: &'a R = self.resolver;
        let mut members: Vec<&'a MemberDecl> = Vec::new();
        for base in &decl.extends {
            if self.options.is_marker_base(base) {
                continue;
            }
            match resolver.declaration(base) {
                Some(Declaration::Interface(base_decl)) => {
                    let inherited = self.collect_surface(base_decl, visiting)?;
                    merge_members(&mut members, inherited);
                }
                _ => {
                    return Err(ExtractError::unsupported(
                        &decl.location,
                        format!("`{}` extends unknown interface `{}`", decl.name, base),
                    ))
                }
            }
        }
        merge_members(&mut members, decl.members.iter().collect());

        visiting.pop();
        Ok(members)
    }
}

fn method<R: TypeResolver + ?Sized>(
    extractor: &mut TypeExtractor<'_, R>,
    module: &str,
    decl: &MethodDecl,
) -> Result<Method, ExtractError> {
    if decl.parameters.len() > 1 {
        return Err(ExtractError::MultipleParameters {
            method: decl.name.clone(),
            location: decl.location.clone(),
        });
    }

    let parameters = match decl.parameters.first() {
        Some(parameter) => {
            let node = parameter.ty.as_ref().ok_or_else(|| {
                ExtractError::unsupported(&parameter.location, "missing parameter type")
            })?;
            let seed = NameSeed::method_parameters(module, &decl.name);
            let fields = parameter_fields(extractor, node, &seed)?;
            if parameter.optional {
                fields
                    .into_iter()
                    .map(|field| Field {
                        value_type: field.value_type.into_optional(),
                        ..field
                    })
                    .collect()
            } else {
                fields
            }
        }
        None => Vec::new(),
    };

    let (return_type, is_async) = match &decl.return_type {
        None => (None, false),
        Some(node) => {
            let (node, is_async) = match &node.kind {
                TypeNodeKind::Reference { name, arguments } if name == "Promise" => {
                    match arguments.as_slice() {
                        [inner] => (inner, true),
                        _ => {
                            return Err(ExtractError::unsupported(
                                &node.location,
                                "`Promise` takes exactly one type argument",
                            ))
                        }
                    }
                }
                _ => (node, false),
            };

            if matches!(node.keyword(), Some(Keyword::Void | Keyword::Undefined)) {
                (None, is_async)
            } else {
                let seed = NameSeed::method_return(module, &decl.name);
                (Some(extractor.extract(node, &seed)?), is_async)
            }
        }
    };

    Ok(Method {
        name: decl.name.clone(),
        parameters,
        return_type,
        is_async,
        documentation: decl.doc.description.clone(),
    })
}

/// Fields of the single options-object parameter.
fn parameter_fields<R: TypeResolver + ?Sized>(
    extractor: &mut TypeExtractor<'_, R>,
    node: &TypeNode,
    seed: &NameSeed,
) -> Result<Vec<Field>, ExtractError> {
    let shape = match &node.kind {
        TypeNodeKind::Object(members) => {
            extractor.members_shape(members, &seed.type_name(), seed)?
        }
        TypeNodeKind::Reference { name, arguments } if arguments.is_empty() => {
            match extractor.resolve(name) {
                Some(Declaration::Interface(decl)) => extractor.interface_shape(decl)?,
                Some(Declaration::Alias(decl)) => {
                    return parameter_fields(extractor, &decl.value, &NameSeed::named(&decl.name))
                }
                _ => return Err(unsupported_parameter(node)),
            }
        }
        _ => return Err(unsupported_parameter(node)),
    };

    match shape {
        Shape::Record(fields) => Ok(fields),
        Shape::Dictionary(_) => Err(unsupported_parameter(node)),
    }
}

fn unsupported_parameter(node: &TypeNode) -> ExtractError {
    ExtractError::unsupported(
        &node.location,
        format!(
            "parameter type `{}` must be an object literal or interface",
            node.describe()
        ),
    )
}

fn merge_members<'a>(members: &mut Vec<&'a MemberDecl>, incoming: Vec<&'a MemberDecl>) {
    for member in incoming {
        let existing = member
            .name()
            .and_then(|name| members.iter().position(|m| m.name() == Some(name)));
        match existing {
            Some(position) => members[position] = member,
            None => members.push(member),
        }
    }
}

/// Unrecognized JSDoc tags. Values parse as JSON when they can; a bare tag
/// is `true`.
fn custom_tags(decl: &InterfaceDecl) -> BTreeMap<String, serde_json::Value> {
    decl.doc
        .tags
        .iter()
        .filter(|tag| !RECOGNIZED_TAGS.contains(&tag.name.as_str()))
        .map(|tag| {
            let value = if tag.value.is_empty() {
                serde_json::Value::Bool(true)
            } else {
                serde_json::from_str(&tag.value)
                    .unwrap_or_else(|_| serde_json::Value::String(tag.value.clone()))
            };
            (tag.name.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::ir::{BasicType, ValueType};
    use crate::source::SourceIndex;
    use serde_json::json;

    fn parse(source: &str, options: &ParseOptions) -> Result<ParseOutput, ExtractError> {
        let index = SourceIndex::parse_str(source).unwrap();
        ModuleParser::new(&index, options).parse()
    }

    const HTML_API: &str = r#"
        /**
         * Web view bridge.
         * @shouldExport true
         * @injectable
         * @platforms ["ios", "android"]
         */
        interface IHtmlApi {
            /** SDK version. */
            version: string;

            /** Resize the content. */
            setSize({ width, height }: { width: number; height: number }): void;

            getSize(): { width: number; height: number; options: { dense: boolean } };

            load(options: LoadOptions): Promise<boolean>;
        }

        interface LoadOptions { url: string; timeout?: CodeGen_Int; }

        interface NotExported { a: string; }
    "#;

    #[test]
    fn test_discovers_tagged_modules() {
        let output = parse(HTML_API, &ParseOptions::default()).unwrap();
        assert_eq!(output.modules.len(), 1);

        let module = &output.modules[0];
        assert_eq!(module.name, "IHtmlApi");
        assert_eq!(module.documentation, "Web view bridge.");
        assert_eq!(module.members[0].name, "version");
        assert_eq!(module.members[0].documentation, "SDK version.");
        assert_eq!(module.custom_tags["injectable"], json!(true));
        assert_eq!(module.custom_tags["platforms"], json!(["ios", "android"]));
        assert!(!module.custom_tags.contains_key("shouldExport"));
    }

    #[test]
    fn test_methods() {
        let output = parse(HTML_API, &ParseOptions::default()).unwrap();
        let methods = &output.modules[0].methods;

        let set_size = &methods[0];
        assert_eq!(set_size.documentation, "Resize the content.");
        assert_eq!(set_size.return_type, None);
        let params: Vec<_> = set_size.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(params, vec!["width", "height"]);

        let get_size = &methods[1];
        let ret = get_size.return_type.as_ref().unwrap().as_custom().unwrap();
        assert_eq!(ret.name, "IHtmlApiGetSizeReturnType");
        assert_eq!(
            ret.members[2].value_type.name(),
            Some("IHtmlApiGetSizeReturnOptionsType")
        );

        let load = &methods[2];
        assert!(load.is_async);
        assert_eq!(load.return_type, Some(ValueType::Basic(BasicType::Boolean)));
        assert_eq!(
            load.parameters[1].value_type,
            ValueType::Basic(BasicType::Int).into_optional()
        );
    }

    #[test]
    fn test_exported_interface_bases() {
        let source = r#"
            interface IExportedApi {}
            interface Shared { ping(): void; }
            interface IFirstApi extends IExportedApi, Shared { first(): string; }
            /** @overrideModuleName Second */
            interface ISecondApi extends IExportedApi { second(): number; }
            /** @shouldExport true */
            interface Ignored { a(): void; }
        "#;
        let options = ParseOptions {
            exported_interface_bases: vec!["IExportedApi".into()],
            ..ParseOptions::default()
        };
        let output = parse(source, &options).unwrap();

        let names: Vec<_> = output.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["IFirstApi", "Second"]);

        let methods: Vec<_> = output.modules[0]
            .methods
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(methods, vec!["ping", "first"]);
    }

    #[test]
    fn test_multiple_parameters() {
        let source = r#"
            /** @shouldExport true */
            interface IApi { move(x: number, y: number): void; }
        "#;
        let err = parse(source, &ParseOptions::default()).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            ExtractError::MultipleParameters { method, .. } if method == "move"
        ));
        assert!(err.to_string().starts_with("IApi.move: "));
    }

    #[test]
    fn test_skip_invalid_methods() {
        let source = r#"
            /** @shouldExport true */
            interface IApi {
                good(): string;
                bad(): any;
                worse(a: string, b: string): void;
            }
        "#;
        let options = ParseOptions {
            skip_invalid_methods: true,
            ..ParseOptions::default()
        };
        let output = parse(source, &options).unwrap();

        let methods: Vec<_> = output.modules[0]
            .methods
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(methods, vec!["good"]);

        let skipped: Vec<_> = output.skipped.iter().map(|s| s.method.as_str()).collect();
        assert_eq!(skipped, vec!["bad", "worse"]);
        assert!(output.skipped[0].reason.contains("any"));
    }

    #[test]
    fn test_skip_does_not_hide_structural_errors() {
        let source = r#"
            enum Mixed { A = 'a', B = 1 }
            /** @shouldExport true */
            interface IApi { mode(): Mixed; }
        "#;
        let options = ParseOptions {
            skip_invalid_methods: true,
            ..ParseOptions::default()
        };
        let err = parse(source, &options).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            ExtractError::MixedEnumLiterals { .. }
        ));
    }

    #[test]
    fn test_colliding_synthetic_names_are_rejected() {
        let source = r#"
            /** @shouldExport true */
            interface IApi {
                items: { b: number }[];
                itemsElement: { a: string };
            }
        "#;
        let err = parse(source, &ParseOptions::default()).unwrap_err();
        assert!(!err.is_recoverable());
        match err.root_cause() {
            ExtractError::Registry(RegistryError::NameCollision { type_name, .. }) => {
                assert_eq!(type_name, "IApiItemsElementType")
            }
            other => panic!("expected name collision, got {:?}", other),
        }
    }

    #[test]
    fn test_default_custom_tags() {
        let source = r#"
            /**
             * @shouldExport true
             * @injectable false
             */
            interface IApi {}
        "#;
        let options = ParseOptions {
            default_custom_tags: BTreeMap::from([
                ("injectable".to_string(), json!(true)),
                ("scope".to_string(), json!("app")),
            ]),
            ..ParseOptions::default()
        };
        let output = parse(source, &options).unwrap();
        let tags = &output.modules[0].custom_tags;
        assert_eq!(tags["injectable"], json!(false));
        assert_eq!(tags["scope"], json!("app"));
    }

    #[test]
    fn test_void_promise_is_async_without_return() {
        let source = r#"
            /** @shouldExport true */
            interface IApi { flush(): Promise<void>; }
        "#;
        let output = parse(source, &ParseOptions::default()).unwrap();
        let flush = &output.modules[0].methods[0];
        assert!(flush.is_async);
        assert_eq!(flush.return_type, None);
    }
}
