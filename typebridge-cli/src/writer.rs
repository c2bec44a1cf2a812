//! Output stage: flushes rendered bindings to disk.
//!
//! Files whose content already matches are left untouched so that build
//! systems watching the generated directories do not rebuild for nothing.

use crate::error::{CliResult, WriteError};
use std::fs;
use std::path::{Path, PathBuf};

/// A rendered file held in memory until every render succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

impl GeneratedFile {
    /// Whether the file on disk already holds exactly this content.
    pub fn is_current(&self) -> bool {
        fs::read_to_string(&self.path).is_ok_and(|existing| existing == self.content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    /// Content on disk already matched.
    Unchanged,
    /// Dry run; nothing touched.
    Previewed,
}

/// Outcome for one generated file.
#[derive(Debug, Clone, Copy)]
pub struct WriteReport<'a> {
    pub file: &'a GeneratedFile,
    pub status: WriteStatus,
}

impl WriteReport<'_> {
    pub fn was_written(&self) -> bool {
        self.status == WriteStatus::Written
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileWriter {
    dry_run: bool,
}

impl FileWriter {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Write one file, creating missing parent directories.
    pub fn write_file(&self, file: &GeneratedFile) -> CliResult<WriteStatus> {
        if self.dry_run {
            return Ok(WriteStatus::Previewed);
        }
        if file.is_current() {
            return Ok(WriteStatus::Unchanged);
        }

        if let Some(dir) = file.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| WriteError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        fs::write(&file.path, &file.content).map_err(|source| WriteError::WriteFile {
            path: file.path.clone(),
            source,
        })?;
        Ok(WriteStatus::Written)
    }

    /// Write files in order, stopping at the first failure.
    pub fn write_all<'a>(&self, files: &'a [GeneratedFile]) -> CliResult<Vec<WriteReport<'a>>> {
        files
            .iter()
            .map(|file| {
                self.write_file(file)
                    .map(|status| WriteReport { file, status })
            })
            .collect()
    }
}

/// Paths in `files` whose disk content differs; missing files count.
pub fn outdated_files(files: &[GeneratedFile]) -> Vec<&Path> {
    files
        .iter()
        .filter(|file| !file.is_current())
        .map(|file| file.path.as_path())
        .collect()
}
