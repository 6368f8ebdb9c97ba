//! Port traits abstracting all I/O away from the pipeline.

use buildergen_edit::EditResult;
use buildergen_types::decl::{CompilationUnit, FieldDecl};
use camino::Utf8Path;

/// Owner of a declaration tree.
///
/// `commit` replaces the whole tree in one step. A store that cannot take the write (for
/// example a read-only source) must leave the previous tree in place and return a
/// policy-block error.
pub trait DocumentStore {
    fn load(&self) -> anyhow::Result<CompilationUnit>;
    fn commit(&self, unit: &CompilationUnit) -> EditResult<()>;

    /// Stable identity used in logs, plan targets and lock keys.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Chosen(Vec<FieldDecl>),
    Cancelled,
}

/// Narrows the eligible fields to the ones the user wants.
pub trait FieldSelector {
    fn select(&self, candidates: &[FieldDecl]) -> Selection;
}

/// File-system write operations for plan/apply artifacts.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
