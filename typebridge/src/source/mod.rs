//! TypeScript front-end.
//!
//! The extraction engine never looks at syntax trees directly. It works on
//! the declaration model defined here and asks a [`TypeResolver`] for
//! whatever a reference points to. [`SourceIndex`] is the tree-sitter
//! backed implementation.

pub mod doc;
pub mod typescript;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub use doc::{DocComment, DocTag};
pub use typescript::SourceIndex;

/// Position of a syntax node, 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Built-in keyword types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Void,
    Any,
    Unknown,
    Never,
    Object,
    Symbol,
    BigInt,
}

impl Keyword {
    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text {
            "string" => Keyword::String,
            "number" => Keyword::Number,
            "boolean" => Keyword::Boolean,
            "null" => Keyword::Null,
            "undefined" => Keyword::Undefined,
            "void" => Keyword::Void,
            "any" => Keyword::Any,
            "unknown" => Keyword::Unknown,
            "never" => Keyword::Never,
            "object" => Keyword::Object,
            "symbol" => Keyword::Symbol,
            "bigint" => Keyword::BigInt,
            _ => return None,
        })
    }

    /// `null` and `undefined` both mark a value as nullable.
    pub fn is_nullish(self) -> bool {
        matches!(self, Keyword::Null | Keyword::Undefined)
    }
}

/// A literal type or enum initializer.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
}

/// A type expression as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub kind: TypeNodeKind,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeNodeKind {
    Keyword(Keyword),
    Literal(Literal),
    Reference {
        name: String,
        arguments: Vec<TypeNode>,
    },
    Union(Vec<TypeNode>),
    Array(Box<TypeNode>),
    Object(Vec<MemberDecl>),
    /// Any other type syntax, kept as text for diagnostics.
    Unsupported(String),
}

impl TypeNode {
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TypeNodeKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    /// `null` or `undefined`, written either as keyword or literal type.
    pub fn is_nullish(&self) -> bool {
        self.keyword().is_some_and(Keyword::is_nullish)
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            TypeNodeKind::Keyword(keyword) => format!("{:?}", keyword).to_lowercase(),
            TypeNodeKind::Literal(Literal::String(s)) => format!("'{}'", s),
            TypeNodeKind::Literal(Literal::Number(n)) => n.to_string(),
            TypeNodeKind::Literal(Literal::Boolean(b)) => b.to_string(),
            TypeNodeKind::Reference { name, arguments } if arguments.is_empty() => name.clone(),
            TypeNodeKind::Reference { name, .. } => format!("{}<...>", name),
            TypeNodeKind::Union(_) => "union".to_string(),
            TypeNodeKind::Array(element) => format!("{}[]", element.describe()),
            TypeNodeKind::Object(_) => "object literal".to_string(),
            TypeNodeKind::Unsupported(text) => text.clone(),
        }
    }
}

/// Member of an interface body or object literal type.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberDecl {
    Property(PropertyDecl),
    Method(MethodDecl),
    Index(IndexDecl),
    /// Call, construct or other signatures.
    Unsupported {
        text: String,
        location: SourceLocation,
    },
}

impl MemberDecl {
    pub fn name(&self) -> Option<&str> {
        match self {
            MemberDecl::Property(property) => Some(&property.name),
            MemberDecl::Method(method) => Some(&method.name),
            MemberDecl::Index(_) | MemberDecl::Unsupported { .. } => None,
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            MemberDecl::Property(property) => &property.location,
            MemberDecl::Method(method) => &method.location,
            MemberDecl::Index(index) => &index.location,
            MemberDecl::Unsupported { location, .. } => location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub name: String,
    pub optional: bool,
    pub ty: Option<TypeNode>,
    pub doc: DocComment,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub parameters: Vec<ParameterDecl>,
    pub return_type: Option<TypeNode>,
    pub doc: DocComment,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDecl {
    /// Binding pattern as written (`options`, `{ width, height }`).
    pub pattern: String,
    pub optional: bool,
    pub ty: Option<TypeNode>,
    pub location: SourceLocation,
}

/// `[key: K]: V`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDecl {
    pub key_name: String,
    pub key_type: TypeNode,
    pub value_type: TypeNode,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: String,
    pub exported: bool,
    pub extends: Vec<String>,
    pub members: Vec<MemberDecl>,
    pub doc: DocComment,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub members: Vec<EnumMemberDecl>,
    pub doc: DocComment,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMemberDecl {
    pub name: String,
    pub initializer: Option<EnumInitializer>,
    pub doc: DocComment,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumInitializer {
    Literal(Literal),
    /// A computed initializer, kept as text.
    Expression(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AliasDecl {
    pub name: String,
    pub value: TypeNode,
    pub doc: DocComment,
    pub location: SourceLocation,
}

/// What a type reference resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    Interface(&'a InterfaceDecl),
    Enum(&'a EnumDecl),
    Alias(&'a AliasDecl),
}

impl Declaration<'_> {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Declaration::Interface(decl) => &decl.location,
            Declaration::Enum(decl) => &decl.location,
            Declaration::Alias(decl) => &decl.location,
        }
    }
}

/// Symbol resolution used by the extraction engine.
pub trait TypeResolver {
    /// The declaration a type reference named `name` points to.
    fn declaration(&self, name: &str) -> Option<Declaration<'_>>;

    /// Every interface, in declaration order.
    fn interfaces(&self) -> Vec<&InterfaceDecl>;
}
