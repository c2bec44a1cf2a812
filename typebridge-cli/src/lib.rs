//! # typebridge-cli
//!
//! CLI library for generating Swift and Kotlin bindings from TypeScript
//! interface declarations.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`scanner`] - Source file discovery and filtering
//! - [`generator`] - Extraction and rendering pipeline
//! - [`writer`] - File output and dry-run support
//! - [`watcher`] - File system watching for development mode
//! - [`error`] - Error types and handling

pub mod config;
pub mod error;
pub mod generator;
pub mod scanner;
pub mod watcher;
pub mod writer;

pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult};
pub use generator::{BindingGenerator, GeneratedOutput, InspectReport};
pub use scanner::{SourceFile, SourceScanner};
pub use watcher::SourceWatcher;
pub use writer::{FileWriter, GeneratedFile, WriteStatus};
