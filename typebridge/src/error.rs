//! Error types for the library crate.
//!
//! This module defines the errors raised while reading sources, extracting
//! the type model, collecting named types and rendering templates.

use std::path::PathBuf;
use thiserror::Error;

use crate::source::SourceLocation;

/// Error while reading TypeScript sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The TypeScript grammar could not be loaded.
    #[error("Failed to initialize TypeScript parser: {0}")]
    Init(String),

    /// Syntax error in a source file.
    #[error("Syntax error at {location}: {message}")]
    Syntax {
        location: SourceLocation,
        message: String,
    },
}

/// Error raised by the type extraction engine.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A type does not match any extraction rule.
    #[error("Unsupported type at {location}: {reason}")]
    UnsupportedType {
        location: SourceLocation,
        reason: String,
    },

    /// A method declares more than one parameter.
    #[error("Multiple parameters are not supported on method '{method}' at {location}")]
    MultipleParameters {
        method: String,
        location: SourceLocation,
    },

    /// An enum mixes string and numeric initializers.
    #[error("Enum '{enum_name}' mixes string and numeric literal values at {location}")]
    MixedEnumLiterals {
        enum_name: String,
        location: SourceLocation,
    },

    /// A union contains alternatives that cannot be told apart.
    #[error("Ambiguous union '{union_name}' at {location}: {reason}")]
    AmbiguousUnion {
        union_name: String,
        location: SourceLocation,
        reason: String,
    },

    /// A dictionary-shaped type is mixed with record members.
    #[error("Type '{type_name}' mixes an index signature with record members at {location}")]
    MixedDictionary {
        type_name: String,
        location: SourceLocation,
    },

    /// A type refers to itself.
    #[error("Recursive type '{type_name}' at {location} cannot be represented")]
    RecursiveType {
        type_name: String,
        location: SourceLocation,
    },

    /// A `@default` value is not valid for the field type.
    #[error("Invalid default value for '{member}' at {location}: {reason}")]
    InvalidDefault {
        member: String,
        location: SourceLocation,
        reason: String,
    },

    /// Two different types ended up under one name.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An error annotated with the declaration path it occurred in.
    #[error("{path}: {source}")]
    Context {
        path: String,
        #[source]
        source: Box<ExtractError>,
    },
}

impl ExtractError {
    /// Create an unsupported type error.
    pub fn unsupported(location: &SourceLocation, reason: impl Into<String>) -> Self {
        Self::UnsupportedType {
            location: location.clone(),
            reason: reason.into(),
        }
    }

    /// Annotate with a declaration path such as `IHtmlApi.getSize`.
    pub fn in_context(self, path: impl Into<String>) -> Self {
        Self::Context {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, without context wrappers.
    pub fn root_cause(&self) -> &ExtractError {
        match self {
            Self::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether a method raising this error may be skipped.
    ///
    /// Structural ambiguities describe a schema that cannot be represented
    /// and are never recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::UnsupportedType { .. }
                | Self::MultipleParameters { .. }
                | Self::InvalidDefault { .. }
        )
    }
}

/// Error while collecting named types across modules.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A name is bound to two structurally different types.
    #[error(
        "Type name '{type_name}' is used by two different types (first in '{first_module}', again in '{module}')"
    )]
    NameCollision {
        type_name: String,
        first_module: String,
        module: String,
    },
}

/// Error while loading or rendering a template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template file or its directory could not be loaded.
    #[error("Failed to load template {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// Rendering the template failed.
    #[error("Failed to render template {path}: {message}")]
    Render { path: PathBuf, message: String },
}
