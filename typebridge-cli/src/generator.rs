//! Binding generator.
//!
//! Runs the whole pipeline for a configuration: every parse target is
//! scanned and extracted, the named-type registry is built across all of
//! them, and every configured render is produced in memory. Nothing is
//! written here; callers hand the result to the [`FileWriter`] only after
//! every render succeeded.
//!
//! [`FileWriter`]: crate::writer::FileWriter

use crate::config::{Config, LanguageConfig, TargetConfig};
use crate::error::{CliError, CliResult, ConfigError};
use crate::scanner::SourceScanner;
use crate::writer::GeneratedFile;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;
use typebridge::ir::rewrite::strip_interface_prefix;
use typebridge::{
    Module, ModuleParser, NamedTypeRegistry, RenderLanguage, SkippedMethod, SourceIndex,
    TemplateRenderer, TypeScope, ViewBuilder,
};

/// Modules extracted from one parse target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTarget {
    pub name: String,
    pub modules: Vec<Module>,
    pub skipped: Vec<SkippedMethod>,
}

/// Every parse target plus the registry built across all of them.
#[derive(Debug, Clone)]
pub struct ParsedProject {
    pub targets: Vec<ParsedTarget>,
    pub registry: NamedTypeRegistry,
}

impl ParsedProject {
    /// Look up a target by name.
    pub fn target(&self, name: &str) -> Option<&ParsedTarget> {
        self.targets.iter().find(|target| target.name == name)
    }

    /// Number of modules across all targets.
    pub fn module_count(&self) -> usize {
        self.targets.iter().map(|target| target.modules.len()).sum()
    }

    /// Skipped methods across all targets.
    pub fn skipped(&self) -> impl Iterator<Item = &SkippedMethod> {
        self.targets.iter().flat_map(|target| target.skipped.iter())
    }
}

/// Rendered files ready to be written.
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    pub files: Vec<GeneratedFile>,
    pub module_count: usize,
    pub skipped: Vec<SkippedMethod>,
}

/// JSON dump of the extracted model, printed by `typebridge inspect`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectReport<'a> {
    pub targets: Vec<&'a ParsedTarget>,
    pub named_types: Vec<NamedTypeSummary<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedTypeSummary<'a> {
    pub name: &'a str,
    pub scope: TypeScope,
    pub modules: &'a BTreeSet<String>,
}

impl<'a> InspectReport<'a> {
    /// Report for every target, or only `target` when given.
    ///
    /// Named types are filtered to those referenced by the reported modules.
    pub fn new(project: &'a ParsedProject, target: Option<&str>) -> CliResult<Self> {
        let targets: Vec<&ParsedTarget> = match target {
            Some(name) => vec![project
                .target(name)
                .ok_or_else(|| CliError::Validation(format!("unknown target '{}'", name)))?],
            None => project.targets.iter().collect(),
        };

        let module_names: BTreeSet<&str> = targets
            .iter()
            .flat_map(|target| target.modules.iter().map(|module| module.name.as_str()))
            .collect();

        let named_types = project
            .registry
            .types()
            .filter(|named| {
                named
                    .modules
                    .iter()
                    .any(|module| module_names.contains(module.as_str()))
            })
            .map(|named| NamedTypeSummary {
                name: &named.name,
                scope: named.scope(),
                modules: &named.modules,
            })
            .collect();

        Ok(Self {
            targets,
            named_types,
        })
    }
}

/// Runs extraction and rendering for one configuration.
pub struct BindingGenerator {
    config: Config,
}

impl BindingGenerator {
    /// Create a new generator with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scan and extract one parse target.
    pub fn parse_target(&self, name: &str, target: &TargetConfig) -> CliResult<ParsedTarget> {
        let files = SourceScanner::new(&self.config.base_dir)
            .with_patterns(target.source.as_slice())?
            .scan()?;

        let mut index = SourceIndex::new();
        for file in &files {
            index.add_source(file.path.clone(), &file.content)?;
        }

        let options = self.config.parse_options(target);
        let output = ModuleParser::new(&index, &options)
            .parse()
            .map_err(|e| CliError::extract(name, e))?;

        let modules = if self.config.parsing.drop_interface_i_prefix {
            strip_interface_prefix(output.modules)
        } else {
            output.modules
        };

        debug!(
            parse_target = name,
            files = files.len(),
            modules = modules.len(),
            "Parsed target."
        );

        Ok(ParsedTarget {
            name: name.to_string(),
            modules,
            skipped: output.skipped,
        })
    }

    /// Parse every target and build the registry across all of them.
    pub fn parse(&self) -> CliResult<ParsedProject> {
        let mut targets = Vec::with_capacity(self.config.parsing.targets.len());
        for (name, target) in &self.config.parsing.targets {
            targets.push(self.parse_target(name, target)?);
        }

        let mut registry = NamedTypeRegistry::new();
        for module in targets.iter().flat_map(|target| target.modules.iter()) {
            registry.add_module(module)?;
        }

        Ok(ParsedProject { targets, registry })
    }

    /// Run the full pipeline in memory.
    pub fn generate(&self) -> CliResult<GeneratedOutput> {
        self.config.validate()?;
        let project = self.parse()?;

        let mut files = Vec::new();
        for (language, language_config) in self.config.rendering.languages() {
            self.render_language(language, language_config, &project, &mut files)?;
        }

        Ok(GeneratedOutput {
            files,
            module_count: project.module_count(),
            skipped: project.skipped().cloned().collect(),
        })
    }

    fn render_language(
        &self,
        language: RenderLanguage,
        language_config: &LanguageConfig,
        project: &ParsedProject,
        files: &mut Vec<GeneratedFile>,
    ) -> CliResult<()> {
        let transformer = language.transformer(language_config.type_name_map.clone());
        let views = ViewBuilder::new(transformer.as_ref(), &project.registry);

        for render in &language_config.renders {
            let target = project
                .target(&render.target)
                .ok_or_else(|| ConfigError::UnknownTarget {
                    language: language.to_string(),
                    target: render.target.clone(),
                })?;

            let renderer = TemplateRenderer::from_path(self.config.resolve(&render.template))?;
            let output_dir = self.config.resolve(&render.output);

            for module in &target.modules {
                let content = renderer.render(&views.module_view(module))?;
                let file_name = format!("{}.{}", module.name, language.file_extension());
                files.push(GeneratedFile {
                    path: output_dir.join(file_name),
                    content,
                });
            }
        }

        if let (Some(template), Some(output)) = (
            &language_config.named_types_template,
            &language_config.named_types_output,
        ) {
            let renderer = TemplateRenderer::from_path(self.config.resolve(template))?;
            files.push(GeneratedFile {
                path: self.config.resolve(output),
                content: renderer.render(&views.shared_types_view())?,
            });
        }

        debug!(language = %language, files = files.len(), "Rendered language.");
        Ok(())
    }
}
