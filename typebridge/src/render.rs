//! Template rendering.
//!
//! A template is loaded together with every template sharing its extension
//! under its directory, so `{% include "partial.tera" %}` and
//! `{% import "macros.tera" as macros %}` resolve relative to the template
//! itself. Other files in that directory (sources, generated output) are
//! never read.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use tracing::debug;

use crate::error::RenderError;

/// A loaded template and its sibling partials.
#[derive(Debug)]
pub struct TemplateRenderer {
    tera: Tera,
    name: String,
    path: PathBuf,
}

impl TemplateRenderer {
    /// Load `template` and every `*.<ext>` file below its directory.
    pub fn from_path(template: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = template.as_ref().to_path_buf();
        let load_error = |message: String| RenderError::Load {
            path: path.clone(),
            message,
        };

        if !path.is_file() {
            return Err(load_error("template file not found".to_string()));
        }

        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| load_error("not a file".to_string()))?;

        let tera = match path.extension() {
            Some(ext) => {
                let glob = format!("{}/**/*.{}", dir.display(), ext.to_string_lossy());
                Tera::new(&glob).map_err(|e| load_error(error_chain(&e)))?
            }
            None => {
                let mut tera = Tera::default();
                tera.add_template_file(&path, Some(&name))
                    .map_err(|e| load_error(error_chain(&e)))?;
                tera
            }
        };
        if !tera.get_template_names().any(|loaded| loaded == name) {
            return Err(load_error("template was not loaded".to_string()));
        }

        debug!(
            template = %path.display(),
            templates = tera.get_template_names().count(),
            "Loaded template."
        );

        Ok(Self { tera, name, path })
    }

    /// Render with `view` as the template context.
    pub fn render<T: Serialize>(&self, view: &T) -> Result<String, RenderError> {
        let render_error = |message: String| RenderError::Render {
            path: self.path.clone(),
            message,
        };

        let context = Context::from_serialize(view).map_err(|e| render_error(error_chain(&e)))?;
        self.tera
            .render(&self.name, &context)
            .map_err(|e| render_error(error_chain(&e)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// tera reports the useful part of an error in its source chain.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
