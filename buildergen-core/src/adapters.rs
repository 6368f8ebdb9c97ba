//! Default port implementations: file-backed and in-memory stores, stock selectors.

use crate::ports::{DocumentStore, FieldSelector, Selection, WritePort};
use anyhow::Context;
use buildergen_edit::{EditResult, PolicyBlockError};
use buildergen_types::decl::{CompilationUnit, FieldDecl};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// JSON compilation unit on disk.
///
/// Commits go through a sibling temp file and a rename so readers never see a half-written
/// unit.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    path: Utf8PathBuf,
    read_only: bool,
    backup_suffix: Option<String>,
}

impl FsDocumentStore {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_only: false,
            backup_suffix: None,
        }
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Copy the previous unit to `<path><suffix>` before each commit.
    pub fn with_backup(mut self, suffix: impl Into<String>) -> Self {
        self.backup_suffix = Some(suffix.into());
        self
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn backup_path(&self) -> Option<Utf8PathBuf> {
        self.backup_suffix
            .as_ref()
            .map(|suffix| Utf8PathBuf::from(format!("{}{}", self.path, suffix)))
    }
}

impl DocumentStore for FsDocumentStore {
    fn load(&self) -> anyhow::Result<CompilationUnit> {
        let text = fs::read_to_string(&self.path).with_context(|| format!("read {}", self.path))?;
        let unit: CompilationUnit =
            serde_json::from_str(&text).with_context(|| format!("parse {}", self.path))?;
        debug!(path = %self.path, types = unit.types.len(), "loaded unit");
        Ok(unit)
    }

    fn commit(&self, unit: &CompilationUnit) -> EditResult<()> {
        if self.read_only {
            return Err(PolicyBlockError::ReadOnly {
                message: format!("{} is read-only", self.path),
            }
            .into());
        }

        if let Some(backup) = self.backup_path()
            && self.path.exists()
        {
            fs::copy(&self.path, &backup).with_context(|| format!("backup to {}", backup))?;
            debug!(backup = %backup, "wrote backup");
        }

        let json = serde_json::to_string_pretty(unit).context("serialize unit")?;
        let tmp = Utf8PathBuf::from(format!("{}.tmp", self.path));
        fs::write(&tmp, format!("{json}\n")).with_context(|| format!("write {}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("rename {} -> {}", tmp, self.path))?;

        info!(path = %self.path, "committed unit");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.to_string()
    }
}

/// Mutex-held unit for embedding and tests.
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    name: String,
    unit: Mutex<CompilationUnit>,
    read_only: bool,
}

impl InMemoryDocumentStore {
    pub fn new(name: impl Into<String>, unit: CompilationUnit) -> Self {
        Self {
            name: name.into(),
            unit: Mutex::new(unit),
            read_only: false,
        }
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn snapshot(&self) -> CompilationUnit {
        self.unit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn load(&self) -> anyhow::Result<CompilationUnit> {
        Ok(self.snapshot())
    }

    fn commit(&self, unit: &CompilationUnit) -> EditResult<()> {
        if self.read_only {
            return Err(PolicyBlockError::ReadOnly {
                message: format!("{} is read-only", self.name),
            }
            .into());
        }
        *self.unit.lock().unwrap_or_else(PoisonError::into_inner) = unit.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }
}

/// Picks every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllFieldsSelector;

impl FieldSelector for AllFieldsSelector {
    fn select(&self, candidates: &[FieldDecl]) -> Selection {
        Selection::Chosen(candidates.to_vec())
    }
}

/// Picks candidates by name, in candidate order. Names that are not candidates are ignored.
#[derive(Debug, Clone, Default)]
pub struct NamedFieldsSelector {
    names: Vec<String>,
}

impl NamedFieldsSelector {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl FieldSelector for NamedFieldsSelector {
    fn select(&self, candidates: &[FieldDecl]) -> Selection {
        for name in &self.names {
            if !candidates.iter().any(|f| &f.name == name) {
                warn!(field = name.as_str(), "not an eligible field; ignoring");
            }
        }
        Selection::Chosen(
            candidates
                .iter()
                .filter(|f| self.names.contains(&f.name))
                .cloned()
                .collect(),
        )
    }
}

/// Always cancels, as a dismissed selection dialog would.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelledSelector;

impl FieldSelector for CancelledSelector {
    fn select(&self, _candidates: &[FieldDecl]) -> Selection {
        Selection::Cancelled
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
