//! Host adapter: puts compile results on disk.
//!
//! The compiler core never touches the file system. This module writes each
//! artifact under its destination group's directory, skipping files whose
//! content is already current so unchanged documents do not trigger
//! rebuilds, and maintains the `mod.rs` indexes that mount them.

use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::dsl::compile::CompileResult;
use crate::dsl::names::module_name;
use crate::emit::{ArtifactKind, DestinationGroup};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: invalid config: {message}", path.display())]
    Config { path: PathBuf, message: String },
    #[error("cannot derive a document name from {}", path.display())]
    InvalidDocumentName { path: PathBuf },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> HostError + '_ {
    move |source| HostError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Where each destination group is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub runtime_dir: PathBuf,
    pub editor_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(runtime_dir: impl Into<PathBuf>, editor_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime_dir: runtime_dir.into(),
            editor_dir: editor_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.out_dir, &config.editor_out_dir)
    }

    pub fn dir(&self, group: DestinationGroup) -> &Path {
        match group {
            DestinationGroup::Runtime => &self.runtime_dir,
            DestinationGroup::Editor => &self.editor_dir,
        }
    }
}

/// What a write pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    /// Files of kinds the document no longer produces.
    pub removed: Vec<PathBuf>,
}

impl WriteReport {
    pub fn merge(&mut self, other: WriteReport) {
        self.written.extend(other.written);
        self.unchanged.extend(other.unchanged);
        self.removed.extend(other.removed);
    }
}

/// Document name for a source file: its file stem.
pub fn document_name(path: &Path) -> Result<String, HostError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !module_name(s).is_empty())
        .map(str::to_string)
        .ok_or_else(|| HostError::InvalidDocumentName {
            path: path.to_path_buf(),
        })
}

/// Write `content` to `path` unless the file already holds exactly that.
/// Returns true when the file was written.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool, HostError> {
    match std::fs::read_to_string(path) {
        Ok(existing) if existing == content => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(path)(e)),
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    std::fs::write(path, content).map_err(io_err(path))?;
    Ok(true)
}

/// Write one document's artifacts and drop files it no longer produces.
pub fn write_artifacts(
    result: &CompileResult,
    layout: &OutputLayout,
) -> Result<WriteReport, HostError> {
    let mut report = WriteReport::default();
    if result.module.is_empty() {
        return Ok(report);
    }

    for artifact in &result.artifacts {
        let path = layout.dir(artifact.group).join(artifact.relative_path());
        if write_if_changed(&path, &artifact.content)? {
            tracing::info!(path = %path.display(), "wrote");
            report.written.push(path);
        } else {
            report.unchanged.push(path);
        }
    }

    for kind in ArtifactKind::ALL {
        if result.artifact(kind).is_some() {
            continue;
        }
        let path = layout
            .dir(kind.group())
            .join(kind.module())
            .join(format!("{}.rs", result.module));
        if path.is_file() {
            std::fs::remove_file(&path).map_err(io_err(&path))?;
            tracing::info!(path = %path.display(), "removed stale");
            report.removed.push(path);
        }
    }

    Ok(report)
}

fn index_content(modules: &[String]) -> String {
    let mut out = String::from("// @generated by actiondef. Do not edit by hand.\n\n");
    for module in modules {
        out.push_str("pub mod ");
        out.push_str(module);
        out.push_str(";\n");
    }
    out
}

/// Document modules present in a kind directory, sorted.
fn list_modules(dir: &Path) -> Result<Vec<String>, HostError> {
    let mut modules = Vec::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(modules),
        Err(e) => return Err(io_err(dir)(e)),
    };
    for entry in entries {
        let path = entry.map_err(io_err(dir))?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("rs") {
            continue;
        }
        match path.file_stem().and_then(|s| s.to_str()) {
            Some("mod") | None => {}
            Some(stem) => modules.push(stem.to_string()),
        }
    }
    modules.sort();
    Ok(modules)
}

/// Rebuild the `mod.rs` indexes of both destination groups.
///
/// Indexes reflect every document module on disk, not just the ones
/// compiled in this run, so documents can be compiled one at a time.
pub fn write_indexes(layout: &OutputLayout) -> Result<WriteReport, HostError> {
    let mut report = WriteReport::default();

    for group in [DestinationGroup::Runtime, DestinationGroup::Editor] {
        let root = layout.dir(group);
        let mut kinds = Vec::new();

        for kind in ArtifactKind::ALL.iter().filter(|k| k.group() == group) {
            let dir = root.join(kind.module());
            let index = dir.join("mod.rs");
            let modules = list_modules(&dir)?;
            if modules.is_empty() {
                if index.is_file() {
                    std::fs::remove_file(&index).map_err(io_err(&index))?;
                    report.removed.push(index);
                }
                continue;
            }
            kinds.push(kind.module().to_string());
            if write_if_changed(&index, &index_content(&modules))? {
                report.written.push(index);
            } else {
                report.unchanged.push(index);
            }
        }

        if kinds.is_empty() {
            continue;
        }
        kinds.sort();
        let index = root.join("mod.rs");
        if write_if_changed(&index, &index_content(&kinds))? {
            tracing::info!(path = %index.display(), "wrote index");
            report.written.push(index);
        } else {
            report.unchanged.push(index);
        }
    }

    Ok(report)
}
