//! Source file scanner for discovering TypeScript files.
//!
//! Walks the configuration directory with gitignore support and keeps the
//! `.ts`/`.tsx` files matching a target's glob patterns.

use crate::error::{CliResult, ScanError};
use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A discovered source file with its content.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path to the file.
    pub path: PathBuf,

    /// Path relative to the scan root.
    pub relative_path: PathBuf,

    /// File content.
    pub content: String,
}

/// Scanner for discovering TypeScript source files.
#[derive(Debug)]
pub struct SourceScanner {
    /// Root directory to scan.
    root: PathBuf,

    /// Whether to respect .gitignore files.
    respect_gitignore: bool,

    /// Relative paths must match at least one pattern; empty keeps all.
    patterns: Vec<Pattern>,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl SourceScanner {
    /// Create a new scanner for the given root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            respect_gitignore: true,
            patterns: Vec::new(),
        }
    }

    /// Set whether to respect .gitignore files.
    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Add glob patterns matched against paths relative to the root.
    pub fn with_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, ScanError> {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let compiled = Pattern::new(pattern)
                .map_err(|e| ScanError::invalid_pattern(pattern, e.to_string()))?;
            self.patterns.push(compiled);
        }
        Ok(self)
    }

    /// Scan the directory and return the matching files sorted by path.
    ///
    /// Finding no file is an error; a target whose patterns match nothing
    /// is almost always a configuration mistake.
    pub fn scan(&self) -> CliResult<Vec<SourceFile>> {
        let files = self.scan_allow_empty()?;
        if files.is_empty() {
            return Err(ScanError::NoSourceFiles {
                path: self.root.clone(),
                patterns: self.patterns.iter().map(|p| p.as_str().to_string()).collect(),
            }
            .into());
        }
        Ok(files)
    }

    /// Scan without failing on empty results.
    pub fn scan_allow_empty(&self) -> CliResult<Vec<SourceFile>> {
        if !self.root.is_dir() {
            return Err(ScanError::not_found(self.root.clone()).into());
        }

        let mut files = Vec::new();

        let walker = WalkBuilder::new(&self.root)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .hidden(false)
            .filter_entry(|entry| entry.file_name() != "node_modules")
            .build();

        for entry in walker {
            let entry = entry.map_err(ScanError::Walk)?;
            let path = entry.path();

            if !path.is_file() || !is_typescript(path) {
                continue;
            }

            let relative = self.relative_path(path);
            if !self.matches(&relative) {
                continue;
            }

            let content = std::fs::read_to_string(path).map_err(|e| ScanError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

            files.push(SourceFile {
                path: path.to_path_buf(),
                relative_path: relative,
                content,
            });
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        debug!(root = %self.root.display(), count = files.len(), "Scanned sources.");

        Ok(files)
    }

    /// Whether a root-relative path passes the pattern filter.
    pub fn matches(&self, relative: &Path) -> bool {
        self.patterns.is_empty()
            || self
                .patterns
                .iter()
                .any(|pattern| pattern.matches_path_with(relative, MATCH_OPTIONS))
    }

    /// Get the relative path from root.
    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// `.ts` and `.tsx` files.
pub fn is_typescript(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "ts" || ext == "tsx")
}
