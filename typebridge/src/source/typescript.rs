//! tree-sitter backed TypeScript declaration index.
//!
//! Parses source files with the TypeScript grammar and indexes the
//! interfaces, enums and type aliases they declare.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use tree_sitter::{Node, Parser};

use super::{
    AliasDecl, Declaration, DocComment, EnumDecl, EnumInitializer, EnumMemberDecl, IndexDecl,
    InterfaceDecl, Keyword, Literal, MemberDecl, MethodDecl, ParameterDecl, PropertyDecl,
    SourceLocation, TypeNode, TypeNodeKind, TypeResolver,
};
use crate::error::SourceError;

/// Declarations collected from a set of TypeScript files.
#[derive(Debug, Default)]
pub struct SourceIndex {
    interfaces: IndexMap<String, InterfaceDecl>,
    enums: IndexMap<String, EnumDecl>,
    aliases: IndexMap<String, AliasDecl>,
}

impl SourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single in-memory source.
    pub fn parse_str(content: &str) -> Result<Self, SourceError> {
        let mut index = Self::new();
        index.add_source("input.ts", content)?;
        Ok(index)
    }

    /// Parse every `(path, content)` pair into one index.
    pub fn from_sources<'a, I, P>(sources: I) -> Result<Self, SourceError>
    where
        I: IntoIterator<Item = (P, &'a str)>,
        P: Into<PathBuf>,
    {
        let mut index = Self::new();
        for (path, content) in sources {
            index.add_source(path, content)?;
        }
        Ok(index)
    }

    /// Parse one file and add its declarations.
    pub fn add_source(
        &mut self,
        path: impl Into<PathBuf>,
        content: &str,
    ) -> Result<(), SourceError> {
        let path = path.into();
        let mut parser = Parser::new();
        parser
            .set_language(&arborium_typescript::language().into())
            .map_err(|e| SourceError::Init(e.to_string()))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| SourceError::Init(format!("failed to parse {}", path.display())))?;

        let ctx = ExtractContext {
            source: content,
            file: &path,
        };

        let root = tree.root_node();
        if root.has_error() {
            if let Some(node) = first_error(root) {
                let message = if node.is_missing() {
                    format!("missing `{}`", node.kind())
                } else {
                    format!("unexpected `{}`", ctx.node_text(node).trim())
                };
                return Err(SourceError::Syntax {
                    location: ctx.location(node),
                    message,
                });
            }
        }

        let before = self.len();
        ctx.collect_program(root, self);
        debug!(
            file = %path.display(),
            declarations = self.len() - before,
            "Indexed TypeScript source."
        );

        Ok(())
    }

    /// Number of indexed declarations.
    pub fn len(&self) -> usize {
        self.interfaces.len() + self.enums.len() + self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceDecl> {
        self.interfaces.get(name)
    }

    pub fn enum_decl(&self, name: &str) -> Option<&EnumDecl> {
        self.enums.get(name)
    }

    pub fn alias(&self, name: &str) -> Option<&AliasDecl> {
        self.aliases.get(name)
    }

    /// Same-name interfaces merge, as TypeScript declaration merging does.
    fn insert_interface(&mut self, decl: InterfaceDecl) {
        match self.interfaces.get_mut(&decl.name) {
            Some(existing) => {
                existing.exported |= decl.exported;
                for base in decl.extends {
                    if !existing.extends.contains(&base) {
                        existing.extends.push(base);
                    }
                }
                existing.members.extend(decl.members);
                if existing.doc.is_empty() {
                    existing.doc = decl.doc;
                }
            }
            None => {
                self.interfaces.insert(decl.name.clone(), decl);
            }
        }
    }
}

impl TypeResolver for SourceIndex {
    fn declaration(&self, name: &str) -> Option<Declaration<'_>> {
        if let Some(decl) = self.interfaces.get(name) {
            return Some(Declaration::Interface(decl));
        }
        if let Some(decl) = self.enums.get(name) {
            return Some(Declaration::Enum(decl));
        }
        self.aliases.get(name).map(Declaration::Alias)
    }

    fn interfaces(&self) -> Vec<&InterfaceDecl> {
        self.interfaces.values().collect()
    }
}

struct ExtractContext<'a> {
    source: &'a str,
    file: &'a Path,
}

impl<'a> ExtractContext<'a> {
    fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn location(&self, node: Node) -> SourceLocation {
        let position = node.start_position();
        SourceLocation::new(self.file, position.row + 1, position.column + 1)
    }

    fn collect_program(&self, root: Node, index: &mut SourceIndex) {
        let mut pending_doc: Option<DocComment> = None;

        for child in named_children(root) {
            match child.kind() {
                "comment" => {
                    pending_doc = DocComment::parse(self.node_text(child));
                }
                "export_statement" => {
                    if let Some(decl) = child.child_by_field_name("declaration") {
                        self.collect_declaration(decl, true, pending_doc.take(), index);
                    }
                    pending_doc = None;
                }
                "interface_declaration"
                | "enum_declaration"
                | "type_alias_declaration"
                | "ambient_declaration" => {
                    self.collect_declaration(child, false, pending_doc.take(), index);
                }
                _ => {
                    pending_doc = None;
                }
            }
        }
    }

    fn collect_declaration(
        &self,
        node: Node,
        exported: bool,
        doc: Option<DocComment>,
        index: &mut SourceIndex,
    ) {
        let doc = doc.unwrap_or_default();
        match node.kind() {
            "interface_declaration" => {
                if let Some(decl) = self.interface(node, exported, doc) {
                    index.insert_interface(decl);
                }
            }
            "enum_declaration" => {
                if let Some(decl) = self.enum_decl(node, doc) {
                    index.enums.insert(decl.name.clone(), decl);
                }
            }
            "type_alias_declaration" => {
                if let Some(decl) = self.alias(node, doc) {
                    index.aliases.insert(decl.name.clone(), decl);
                }
            }
            "ambient_declaration" => {
                // declare interface / declare enum
                for child in named_children(node) {
                    self.collect_declaration(child, exported, Some(doc.clone()), index);
                }
            }
            _ => {}
        }
    }

    fn interface(&self, node: Node, exported: bool, doc: DocComment) -> Option<InterfaceDecl> {
        let name = self.node_text(node.child_by_field_name("name")?).to_string();

        let mut extends = Vec::new();
        for child in named_children(node) {
            if child.kind() == "extends_type_clause" {
                for base in named_children(child) {
                    let base_name = match base.kind() {
                        "generic_type" => base
                            .child_by_field_name("name")
                            .map(|n| self.node_text(n))
                            .unwrap_or(""),
                        _ => self.node_text(base),
                    };
                    if !base_name.is_empty() {
                        extends.push(base_name.to_string());
                    }
                }
            }
        }

        let members = node
            .child_by_field_name("body")
            .map(|body| self.members(body))
            .unwrap_or_default();

        Some(InterfaceDecl {
            name,
            exported,
            extends,
            members,
            doc,
            location: self.location(node),
        })
    }

    /// Members of an `interface_body` or `object_type`.
    fn members(&self, body: Node) -> Vec<MemberDecl> {
        let mut members = Vec::new();
        let mut pending_doc: Option<DocComment> = None;

        for child in named_children(body) {
            let member = match child.kind() {
                "comment" => {
                    pending_doc = DocComment::parse(self.node_text(child));
                    continue;
                }
                "property_signature" => self.property(child, pending_doc.take()),
                "method_signature" => self.method(child, pending_doc.take()),
                "index_signature" => self.index_signature(child),
                _ => Some(MemberDecl::Unsupported {
                    text: self.node_text(child).to_string(),
                    location: self.location(child),
                }),
            };
            pending_doc = None;
            if let Some(member) = member {
                members.push(member);
            }
        }

        members
    }

    fn property(&self, node: Node, doc: Option<DocComment>) -> Option<MemberDecl> {
        let name = self.property_name(node.child_by_field_name("name")?);
        let ty = node
            .child_by_field_name("type")
            .and_then(|annotation| self.annotation_type(annotation));

        Some(MemberDecl::Property(PropertyDecl {
            name,
            optional: has_question_mark(node),
            ty,
            doc: doc.unwrap_or_default(),
            location: self.location(node),
        }))
    }

    fn method(&self, node: Node, doc: Option<DocComment>) -> Option<MemberDecl> {
        let name = self.property_name(node.child_by_field_name("name")?);

        let parameters = node
            .child_by_field_name("parameters")
            .map(|params| {
                named_children(params)
                    .into_iter()
                    .filter(|param| {
                        matches!(param.kind(), "required_parameter" | "optional_parameter")
                    })
                    .map(|param| ParameterDecl {
                        pattern: param
                            .child_by_field_name("pattern")
                            .map(|p| self.node_text(p).to_string())
                            .unwrap_or_default(),
                        optional: param.kind() == "optional_parameter",
                        ty: param
                            .child_by_field_name("type")
                            .and_then(|annotation| self.annotation_type(annotation)),
                        location: self.location(param),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let return_type = node
            .child_by_field_name("return_type")
            .and_then(|annotation| match annotation.kind() {
                "type_annotation" => self.annotation_type(annotation),
                _ => Some(self.unsupported(annotation)),
            });

        Some(MemberDecl::Method(MethodDecl {
            name,
            parameters,
            return_type,
            doc: doc.unwrap_or_default(),
            location: self.location(node),
        }))
    }

    fn index_signature(&self, node: Node) -> Option<MemberDecl> {
        let (Some(key), Some(key_type), Some(value)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("index_type"),
            node.child_by_field_name("type"),
        ) else {
            // Mapped type clause
            return Some(MemberDecl::Unsupported {
                text: self.node_text(node).to_string(),
                location: self.location(node),
            });
        };

        Some(MemberDecl::Index(IndexDecl {
            key_name: self.node_text(key).to_string(),
            key_type: self.type_node(key_type),
            value_type: self
                .annotation_type(value)
                .unwrap_or_else(|| self.unsupported(value)),
            location: self.location(node),
        }))
    }

    fn enum_decl(&self, node: Node, doc: DocComment) -> Option<EnumDecl> {
        let name = self.node_text(node.child_by_field_name("name")?).to_string();
        let mut members = Vec::new();

        if let Some(body) = node.child_by_field_name("body") {
            let mut pending_doc: Option<DocComment> = None;
            for child in named_children(body) {
                let (name_node, initializer) = match child.kind() {
                    "comment" => {
                        pending_doc = DocComment::parse(self.node_text(child));
                        continue;
                    }
                    "enum_assignment" => {
                        let Some(name_node) = child.child_by_field_name("name") else {
                            continue;
                        };
                        let initializer = child
                            .child_by_field_name("value")
                            .map(|value| self.enum_initializer(value));
                        (name_node, initializer)
                    }
                    "property_identifier" | "string" | "number" => (child, None),
                    _ => continue,
                };

                members.push(EnumMemberDecl {
                    name: self.property_name(name_node),
                    initializer,
                    doc: pending_doc.take().unwrap_or_default(),
                    location: self.location(child),
                });
            }
        }

        Some(EnumDecl {
            name,
            members,
            doc,
            location: self.location(node),
        })
    }

    fn enum_initializer(&self, node: Node) -> EnumInitializer {
        let text = self.node_text(node);
        match node.kind() {
            "string" => EnumInitializer::Literal(Literal::String(unquote(text))),
            "number" | "unary_expression" => match parse_number(text) {
                Some(n) => EnumInitializer::Literal(Literal::Number(n)),
                None => EnumInitializer::Expression(text.to_string()),
            },
            _ => EnumInitializer::Expression(text.to_string()),
        }
    }

    fn alias(&self, node: Node, doc: DocComment) -> Option<AliasDecl> {
        let name = self.node_text(node.child_by_field_name("name")?).to_string();
        let value = self.type_node(node.child_by_field_name("value")?);
        Some(AliasDecl {
            name,
            value,
            doc,
            location: self.location(node),
        })
    }

    /// The type inside a `type_annotation` (`: T`).
    fn annotation_type(&self, annotation: Node) -> Option<TypeNode> {
        named_children(annotation)
            .into_iter()
            .find(|child| child.kind() != "comment")
            .map(|child| self.type_node(child))
    }

    fn type_node(&self, node: Node) -> TypeNode {
        let location = self.location(node);
        let kind = match node.kind() {
            "predefined_type" => match Keyword::from_text(self.node_text(node).trim()) {
                Some(keyword) => TypeNodeKind::Keyword(keyword),
                None => TypeNodeKind::Unsupported(self.node_text(node).to_string()),
            },

            "type_identifier" | "nested_type_identifier" | "identifier" => {
                TypeNodeKind::Reference {
                    name: self.node_text(node).to_string(),
                    arguments: Vec::new(),
                }
            }

            "generic_type" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.node_text(n).to_string())
                    .unwrap_or_default();
                let arguments = node
                    .child_by_field_name("type_arguments")
                    .map(|args| {
                        named_children(args)
                            .into_iter()
                            .filter(|arg| arg.kind() != "comment")
                            .map(|arg| self.type_node(arg))
                            .collect()
                    })
                    .unwrap_or_default();
                TypeNodeKind::Reference { name, arguments }
            }

            "literal_type" => return self.literal_type(node),

            "union_type" => {
                let mut members = Vec::new();
                self.flatten_union(node, &mut members);
                TypeNodeKind::Union(members)
            }

            "array_type" => match named_children(node).into_iter().next() {
                Some(element) => TypeNodeKind::Array(Box::new(self.type_node(element))),
                None => TypeNodeKind::Unsupported(self.node_text(node).to_string()),
            },

            "parenthesized_type" | "readonly_type" => {
                match named_children(node).into_iter().next() {
                    Some(inner) => return self.type_node(inner),
                    None => TypeNodeKind::Unsupported(self.node_text(node).to_string()),
                }
            }

            "object_type" => TypeNodeKind::Object(self.members(node)),

            _ => TypeNodeKind::Unsupported(self.node_text(node).to_string()),
        };

        TypeNode { kind, location }
    }

    fn literal_type(&self, node: Node) -> TypeNode {
        let location = self.location(node);
        let text = self.node_text(node).trim();

        let kind = match named_children(node).into_iter().next() {
            Some(child) => match child.kind() {
                "string" => TypeNodeKind::Literal(Literal::String(unquote(self.node_text(child)))),
                "number" | "unary_expression" => match parse_number(self.node_text(child)) {
                    Some(n) => TypeNodeKind::Literal(Literal::Number(n)),
                    None => TypeNodeKind::Unsupported(text.to_string()),
                },
                "true" => TypeNodeKind::Literal(Literal::Boolean(true)),
                "false" => TypeNodeKind::Literal(Literal::Boolean(false)),
                "null" => TypeNodeKind::Keyword(Keyword::Null),
                "undefined" => TypeNodeKind::Keyword(Keyword::Undefined),
                _ => TypeNodeKind::Unsupported(text.to_string()),
            },
            None => match text {
                "null" => TypeNodeKind::Keyword(Keyword::Null),
                "undefined" => TypeNodeKind::Keyword(Keyword::Undefined),
                "true" => TypeNodeKind::Literal(Literal::Boolean(true)),
                "false" => TypeNodeKind::Literal(Literal::Boolean(false)),
                _ => TypeNodeKind::Unsupported(text.to_string()),
            },
        };

        TypeNode { kind, location }
    }

    fn flatten_union(&self, node: Node, out: &mut Vec<TypeNode>) {
        for child in named_children(node) {
            match child.kind() {
                "union_type" => self.flatten_union(child, out),
                "comment" => {}
                _ => out.push(self.type_node(child)),
            }
        }
    }

    fn property_name(&self, node: Node) -> String {
        let text = self.node_text(node);
        match node.kind() {
            "string" => unquote(text),
            _ => text.to_string(),
        }
    }

    fn unsupported(&self, node: Node) -> TypeNode {
        TypeNode {
            kind: TypeNodeKind::Unsupported(self.node_text(node).to_string()),
            location: self.location(node),
        }
    }
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn has_question_mark(node: Node) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == "?");
    found
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Strip the quotes of a string literal and resolve simple escapes.
fn unquote(text: &str) -> String {
    let inner = if text.len() >= 2
        && (text.starts_with('"') || text.starts_with('\''))
        && text.ends_with(&text[..1])
    {
        &text[1..text.len() - 1]
    } else {
        text
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim().replace('_', "");
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim()),
        None => (false, text.as_str()),
    };

    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()? as f64
    } else {
        digits.parse::<f64>().ok()?
    };

    Some(if negative { -value } else { value })
}
