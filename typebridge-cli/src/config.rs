//! Configuration management for the CLI.
//!
//! Configuration is read from `typebridge.toml`. Relative paths in the file
//! resolve against the directory the file lives in, so the tool behaves the
//! same regardless of the working directory it is started from.

use crate::error::{CliResult, ConfigError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use typebridge::{ParseOptions, RenderLanguage};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "typebridge.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extraction settings and parse targets.
    pub parsing: ParsingConfig,

    /// Per-language rendering.
    pub rendering: RenderingConfig,

    /// Directory relative paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Extraction settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Type names assumed to exist in every target language.
    pub predefined_types: Vec<String>,

    /// Name of the integer marker type.
    pub integer_type: String,

    /// Strip the `I` prefix from module and type names.
    pub drop_interface_i_prefix: bool,

    /// Skip methods with recoverable errors instead of failing.
    pub skip_invalid_methods: bool,

    /// Tags merged into every module that does not define them.
    pub default_custom_tags: BTreeMap<String, serde_json::Value>,

    /// Parse targets by name.
    pub targets: BTreeMap<String, TargetConfig>,
}

/// A named set of source files parsed together.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Glob patterns relative to the configuration directory.
    pub source: Vec<String>,

    /// Marker base interfaces selecting the modules of this target.
    pub exported_interface_bases: Vec<String>,
}

/// Rendering configuration for every supported language.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    pub swift: Option<LanguageConfig>,
    pub kotlin: Option<LanguageConfig>,
}

/// Rendering configuration for one language.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Template for the types shared between modules.
    pub named_types_template: Option<PathBuf>,

    /// Output file for the shared types.
    pub named_types_output: Option<PathBuf>,

    /// Type name remaps (source name -> target name).
    pub type_name_map: BTreeMap<String, String>,

    /// Module renders, one per parse target.
    pub renders: Vec<RenderConfig>,
}

/// Renders every module of one target through one template.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub target: String,
    pub template: PathBuf,

    /// Output directory; each module is written to `<ModuleName>.<ext>`.
    pub output: PathBuf,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        let options = ParseOptions::default();
        Self {
            predefined_types: options.predefined_types,
            integer_type: options.integer_type,
            drop_interface_i_prefix: false,
            skip_invalid_methods: options.skip_invalid_methods,
            default_custom_tags: options.default_custom_tags,
            targets: BTreeMap::new(),
        }
    }
}

impl RenderingConfig {
    /// Configured languages in a fixed order.
    pub fn languages(&self) -> impl Iterator<Item = (RenderLanguage, &LanguageConfig)> {
        [
            (RenderLanguage::Swift, self.swift.as_ref()),
            (RenderLanguage::Kotlin, self.kotlin.as_ref()),
        ]
        .into_iter()
        .filter_map(|(language, config)| config.map(|config| (language, config)))
    }
}

impl Config {
    /// Resolve a configured path against the configuration directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Extraction options for one target.
    pub fn parse_options(&self, target: &TargetConfig) -> ParseOptions {
        ParseOptions {
            exported_interface_bases: target.exported_interface_bases.clone(),
            predefined_types: self.parsing.predefined_types.clone(),
            integer_type: self.parsing.integer_type.clone(),
            skip_invalid_methods: self.parsing.skip_invalid_methods,
            default_custom_tags: self.parsing.default_custom_tags.clone(),
        }
    }

    /// Check cross references before anything is parsed or written.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parsing.integer_type.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "parsing.integer_type",
                "must not be empty",
            ));
        }

        for (name, target) in &self.parsing.targets {
            if target.source.is_empty() {
                return Err(ConfigError::invalid_value(
                    format!("parsing.targets.{}.source", name),
                    "at least one source pattern is required",
                ));
            }
        }

        for (language, config) in self.rendering.languages() {
            for render in &config.renders {
                if !self.parsing.targets.contains_key(&render.target) {
                    return Err(ConfigError::UnknownTarget {
                        language: language.to_string(),
                        target: render.target.clone(),
                    });
                }
            }

            match (&config.named_types_template, &config.named_types_output) {
                (Some(_), None) => {
                    return Err(ConfigError::invalid_value(
                        format!("rendering.{}.named_types_output", language),
                        "required when named_types_template is set",
                    ))
                }
                (None, Some(_)) => {
                    return Err(ConfigError::invalid_value(
                        format!("rendering.{}.named_types_template", language),
                        "required when named_types_output is set",
                    ))
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// Without an explicit path, `typebridge.toml` in the working directory
    /// is used and a missing file yields the default configuration. An
    /// explicit path must exist.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::not_found(path.to_path_buf()).into())
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(CONFIG_FILENAME),
        };

        let base_dir = config_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        if !config_path.exists() {
            return Ok(Config {
                base_dir,
                ..Config::default()
            });
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let mut config = Self::parse(&content, &config_path)?;
        config.base_dir = base_dir;
        Ok(config)
    }

    /// Parse configuration text; `path` is only used for error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Config, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::invalid_toml(path.to_path_buf(), e.to_string()))
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(skip) = args.skip_invalid_methods {
            config.parsing.skip_invalid_methods = skip;
        }

        if let Some(drop_prefix) = args.drop_prefix {
            config.parsing.drop_interface_i_prefix = drop_prefix;
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# typebridge configuration file

[parsing]
# Types assumed to exist in every target language
predefined_types = []

# Marker type rendered as an explicit integer (`type CodeGen_Int = number`)
integer_type = "CodeGen_Int"

# Strip the leading `I` from interface names (IHtmlApi -> HtmlApi)
drop_interface_i_prefix = true

# Drop methods with unsupported types instead of failing
skip_invalid_methods = false

# Tags added to every module that does not declare them
default_custom_tags = {}

[parsing.targets.api]
# Glob patterns relative to this file
source = ["src/**/*.ts"]

# Uncomment to select modules by base interface instead of `@shouldExport true`
# exported_interface_bases = ["IExportedApi"]

[rendering.swift]
named_types_template = "templates/swift-named-types.tera"
named_types_output = "generated/swift/SharedTypes.swift"

[[rendering.swift.renders]]
target = "api"
template = "templates/swift-bridge.tera"
output = "generated/swift"

[rendering.kotlin]
named_types_template = "templates/kotlin-named-types.tera"
named_types_output = "generated/kotlin/SharedTypes.kt"

[[rendering.kotlin.renders]]
target = "api"
template = "templates/kotlin-bridge.tera"
output = "generated/kotlin"
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Skip invalid methods override.
    pub skip_invalid_methods: Option<bool>,

    /// Drop interface prefix override.
    pub drop_prefix: Option<bool>,
}
