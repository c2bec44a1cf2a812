//! # typebridge
//!
//! Extract TypeScript interface declarations into a closed value-type model
//! and render Swift and Kotlin bindings from it.
//!
//! ## Pipeline
//!
//! ```rust,ignore
//! use typebridge::{
//!     ModuleParser, NamedTypeRegistry, ParseOptions, RenderLanguage, SourceIndex,
//!     TemplateRenderer, ViewBuilder,
//! };
//!
//! let index = SourceIndex::parse_str(source)?;
//! let options = ParseOptions::default();
//! let output = ModuleParser::new(&index, &options).parse()?;
//!
//! let registry = NamedTypeRegistry::build(&output.modules)?;
//! let transformer = RenderLanguage::Swift.transformer(Default::default());
//! let views = ViewBuilder::new(transformer.as_ref(), &registry);
//!
//! let renderer = TemplateRenderer::from_path("templates/swift-bridge.tera")?;
//! for module in &output.modules {
//!     let code = renderer.render(&views.module_view(module))?;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`ir`] - Value-type algebra and the module/method/field model
//! - [`source`] - tree-sitter TypeScript front-end and JSDoc parsing
//! - [`extract`] - Type extraction engine and synthetic naming
//! - [`registry`] - Named-type deduplication and local/shared classification
//! - [`view`] - Template views and per-language value transformers
//! - [`render`] - Template loading and rendering
//! - [`error`] - Error types

pub mod error;
pub mod extract;
pub mod ir;
pub mod registry;
pub mod render;
pub mod source;
pub mod view;

pub use error::{ExtractError, RegistryError, RenderError, SourceError};
pub use extract::{ModuleParser, NameSeed, ParseOptions, ParseOutput, SkippedMethod};
pub use ir::{Field, Method, Module, ValueType};
pub use registry::{NamedType, NamedTypeRegistry, TypeScope};
pub use render::TemplateRenderer;
pub use source::{SourceIndex, TypeResolver};
pub use view::{
    ModuleView, NamedTypeView, RenderLanguage, SharedTypesView, ValueTransformer, ViewBuilder,
};
